//! Suggestion collaborator trait

use async_trait::async_trait;

use super::error::SuggestionResult;
use super::payload::{SuggestionPayload, SuggestionRequest};

/// Producer of suggested schemas, typically backed by a language model.
///
/// Implementations own transport, retries and timeouts; the core calls
/// `suggest` once per run and treats any error as a reason to fall back.
#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> SuggestionResult<SuggestionPayload>;

    /// Name reported in the pipeline report
    fn name(&self) -> &str;
}

/// A canned client for tests
#[cfg(test)]
pub struct MockSuggestionClient {
    payload: Option<SuggestionPayload>,
}

#[cfg(test)]
impl MockSuggestionClient {
    pub fn returning(payload: SuggestionPayload) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    pub fn failing() -> Self {
        Self { payload: None }
    }
}

#[cfg(test)]
#[async_trait]
impl SuggestionClient for MockSuggestionClient {
    async fn suggest(&self, _request: &SuggestionRequest) -> SuggestionResult<SuggestionPayload> {
        self.payload
            .clone()
            .ok_or_else(|| super::SuggestionError::Upstream("mock failure".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
