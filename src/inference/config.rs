//! Configuration for type inference

use serde::{Deserialize, Serialize};

/// Configuration for type inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Maximum number of sampled rows to inspect per file (0 = all)
    pub sample_size: usize,

    /// Enable format detection (uuid, email, url, dates, json)
    pub detect_formats: bool,

    /// Treat every column as nullable regardless of the samples
    pub assume_nullable: bool,

    /// Multiplier applied to the longest sample when sizing VARCHAR columns
    pub varchar_growth: f64,

    /// Smallest VARCHAR length produced
    pub min_varchar_length: u32,

    /// Longest VARCHAR length produced; longer samples become TEXT
    pub max_varchar_length: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 0,
            detect_formats: true,
            assume_nullable: false,
            varchar_growth: 1.2,
            min_varchar_length: 50,
            max_varchar_length: 255,
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the sample size (0 = all rows)
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    pub fn detect_formats(mut self, detect: bool) -> Self {
        self.config.detect_formats = detect;
        self
    }

    pub fn assume_nullable(mut self, nullable: bool) -> Self {
        self.config.assume_nullable = nullable;
        self
    }

    /// Set the VARCHAR growth factor; values below 1.0 are raised to 1.0
    pub fn varchar_growth(mut self, factor: f64) -> Self {
        self.config.varchar_growth = factor.max(1.0);
        self
    }

    /// Set the VARCHAR length bounds; `max` is raised to `min` if smaller
    pub fn varchar_bounds(mut self, min: u32, max: u32) -> Self {
        self.config.min_varchar_length = min.max(1);
        self.config.max_varchar_length = max.max(self.config.min_varchar_length);
        self
    }

    pub fn build(self) -> InferenceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.sample_size, 0);
        assert!(config.detect_formats);
        assert_eq!(config.min_varchar_length, 50);
        assert_eq!(config.max_varchar_length, 255);
    }

    #[test]
    fn test_builder() {
        let config = InferenceConfig::builder()
            .sample_size(1000)
            .detect_formats(false)
            .assume_nullable(true)
            .varchar_bounds(10, 100)
            .build();

        assert_eq!(config.sample_size, 1000);
        assert!(!config.detect_formats);
        assert!(config.assume_nullable);
        assert_eq!(config.max_varchar_length, 100);
    }

    #[test]
    fn test_builder_clamping() {
        let config = InferenceConfig::builder()
            .varchar_growth(0.5)
            .varchar_bounds(80, 20)
            .build();

        assert_eq!(config.varchar_growth, 1.0);
        assert_eq!(config.max_varchar_length, 80);
    }
}
