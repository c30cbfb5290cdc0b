//! Error types for type inference

use thiserror::Error;

/// Errors that can occur while reading or inferring a file descriptor.
///
/// Inconsistencies inside a descriptor (ragged rows, odd headers) are
/// findings, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Descriptor has no header row
    #[error("file '{0}' has no headers")]
    NoHeaders(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for InferenceError {
    fn from(e: serde_json::Error) -> Self {
        InferenceError::JsonParse(e.to_string())
    }
}

impl From<std::io::Error> for InferenceError {
    fn from(e: std::io::Error) -> Self {
        InferenceError::Io(e.to_string())
    }
}

pub type InferenceResult<T> = Result<T, InferenceError>;
