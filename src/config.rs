//! Crate-wide configuration
//!
//! One [`ForgeConfig`] gathers the settings of every component. It can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! name = "shop"
//!
//! [inference]
//! sampleSize = 500
//!
//! [suggest]
//! minConfidence = 0.8
//!
//! [export]
//! formats = ["sql-migration", "prisma"]
//!
//! [export.options]
//! schema = "app"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::{ExportFormat, ExportOptions};
use crate::inference::InferenceConfig;
use crate::suggest::SuggestConfig;
use crate::validation::{ValidatorConfig, validate_identifier};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parsing error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which artifacts to emit and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub formats: Vec<ExportFormat>,
    /// Skip emission when validation reports errors
    pub block_on_errors: bool,
    pub options: ExportOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: vec![ExportFormat::SqlMigration],
            block_on_errors: true,
            options: ExportOptions::default(),
        }
    }
}

/// Configuration for a whole analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgeConfig {
    /// Name given to the produced schema
    pub name: String,
    pub inference: InferenceConfig,
    pub validator: ValidatorConfig,
    pub suggest: SuggestConfig,
    pub export: ExportConfig,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            name: "generated_schema".to_string(),
            inference: InferenceConfig::default(),
            validator: ValidatorConfig::default(),
            suggest: SuggestConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl ForgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_suggest(mut self, suggest: SuggestConfig) -> Self {
        self.suggest = suggest;
        self
    }

    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.export.formats = formats;
        self
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export.options = options;
        self
    }

    pub fn block_on_errors(mut self, block: bool) -> Self {
        self.export.block_on_errors = block;
        self
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ForgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }

        let inference = &self.inference;
        if inference.varchar_growth < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "inference.varcharGrowth must be at least 1.0, got {}",
                inference.varchar_growth
            )));
        }
        if inference.min_varchar_length == 0
            || inference.min_varchar_length > inference.max_varchar_length
        {
            return Err(ConfigError::Invalid(format!(
                "inference VARCHAR bounds [{}, {}] are not a valid range",
                inference.min_varchar_length, inference.max_varchar_length
            )));
        }

        if !(0.0..=1.0).contains(&self.suggest.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "suggest.minConfidence must be within 0.0 - 1.0, got {}",
                self.suggest.min_confidence
            )));
        }

        if self.export.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "export.formats must name at least one format".to_string(),
            ));
        }
        validate_identifier(&self.export.options.schema).map_err(|e| {
            ConfigError::Invalid(format!("export.options.schema: {}", e))
        })?;
        if self.export.options.migration_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "export.options.migrationName must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ForgeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ForgeConfig::from_toml_str(
            r#"
name = "shop"

[inference]
sampleSize = 100

[export]
formats = ["prisma", "mermaid"]
"#,
        )
        .unwrap();
        assert_eq!(config.name, "shop");
        assert_eq!(config.inference.sample_size, 100);
        assert!(config.inference.detect_formats);
        assert_eq!(
            config.export.formats,
            vec![ExportFormat::Prisma, ExportFormat::Mermaid]
        );
        assert_eq!(config.export.options.schema, "public");
        assert!(config.validator.require_uuid_primary_keys);
    }

    #[test]
    fn test_out_of_range_values() {
        let cases = [
            "[suggest]\nminConfidence = 1.5",
            "[inference]\nvarcharGrowth = 0.5",
            "[inference]\nminVarcharLength = 300",
            "[export]\nformats = []",
            "[export.options]\nschema = \"select\"",
        ];
        for case in cases {
            let err = ForgeConfig::from_toml_str(case).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{}: {:?}", case, err);
        }
    }

    #[test]
    fn test_bad_toml() {
        let err = ForgeConfig::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_format_is_a_parse_error() {
        let err = ForgeConfig::from_toml_str("[export]\nformats = [\"dbml\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
