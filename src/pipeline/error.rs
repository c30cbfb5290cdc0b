//! Error types for pipeline runs

use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::inference::InferenceError;

/// Errors that abort a pipeline run.
///
/// Suggestion failures are not here: they are recovered by the fallback
/// builder and recorded in the report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Missing required input: {0}")]
    MissingInput(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
