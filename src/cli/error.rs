//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

use schema_forge::config::ConfigError;
use schema_forge::export::ExportError;
use schema_forge::inference::InferenceError;
use schema_forge::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation failed with {0} error(s)")]
    ValidationFailed(usize),
}
