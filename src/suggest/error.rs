//! Error types for the suggestion boundary

use thiserror::Error;

/// Errors raised while asking for, or accepting, a suggested schema.
///
/// None of these reach the caller of the pipeline: each one is answered by
/// the rule-based fallback and recorded in the report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SuggestionError {
    /// The collaborator failed or could not be reached
    #[error("Suggestion service failed: {0}")]
    Upstream(String),

    /// The payload could not be normalized into the schema model
    #[error("Invalid suggestion payload: {0}")]
    InvalidPayload(String),

    /// The collaborator was not confident enough
    #[error("Suggestion confidence {confidence:.2} is below the minimum {minimum:.2}")]
    LowConfidence { confidence: f64, minimum: f64 },
}

impl From<serde_json::Error> for SuggestionError {
    fn from(err: serde_json::Error) -> Self {
        SuggestionError::InvalidPayload(err.to_string())
    }
}

pub type SuggestionResult<T> = Result<T, SuggestionError>;
