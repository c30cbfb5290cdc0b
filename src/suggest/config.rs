//! Configuration for the suggestion boundary

use serde::{Deserialize, Serialize};

/// Configuration for asking a collaborator for a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestConfig {
    /// Ask the collaborator at all; when off the fallback builder is used
    pub enabled: bool,
    /// Payloads below this confidence (0.0 - 1.0) are rejected
    pub min_confidence: f64,
    /// Sample rows sent per file
    pub max_samples: usize,
    /// Free-text hint about what the data is for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: 0.7,
            max_samples: 20,
            use_case: None,
        }
    }
}

impl SuggestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_samples(mut self, samples: usize) -> Self {
        self.max_samples = samples;
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = Some(use_case.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuggestConfig::default();
        assert!(config.enabled);
        assert_eq!(config.min_confidence, 0.7);
        assert!(!SuggestConfig::disabled().enabled);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(SuggestConfig::new().with_min_confidence(1.5).min_confidence, 1.0);
    }
}
