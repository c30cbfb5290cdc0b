//! Boundary to the schema suggestion collaborator
//!
//! The collaborator is an opaque async producer of a loosely typed
//! [`SuggestionPayload`]. This module normalizes that payload into the
//! schema model, applies the confidence gate, and provides the rule-based
//! [`fallback_schema`] used whenever no acceptable suggestion exists.

mod client;
mod config;
mod error;
mod fallback;
mod payload;

pub use client::SuggestionClient;
#[cfg(test)]
pub(crate) use client::MockSuggestionClient;
pub use config::SuggestConfig;
pub use error::{SuggestionError, SuggestionResult};
pub use fallback::fallback_schema;
pub use payload::{
    SuggestedColumn, SuggestedConstraint, SuggestedPolicy, SuggestedRelationship, SuggestedTable,
    SuggestionPayload, SuggestionRequest,
};

use tracing::{debug, warn};

use crate::models::Schema;

/// Ask `client` for a schema and accept it only when it clears the
/// confidence gate and normalizes cleanly.
pub async fn suggest_schema(
    client: &dyn SuggestionClient,
    request: &SuggestionRequest,
    config: &SuggestConfig,
    name: &str,
) -> SuggestionResult<Schema> {
    debug!(
        "Requesting suggestion from '{}' for {} file(s)",
        client.name(),
        request.files.len()
    );
    let payload = client.suggest(request).await?;

    if payload.confidence < config.min_confidence {
        warn!(
            "Suggestion from '{}' rejected: confidence {:.2} < {:.2}",
            client.name(),
            payload.confidence,
            config.min_confidence
        );
        return Err(SuggestionError::LowConfidence {
            confidence: payload.confidence,
            minimum: config.min_confidence,
        });
    }

    payload.into_schema(name)
}

#[cfg(test)]
mod tests {
    use super::client::MockSuggestionClient;
    use super::*;

    fn payload(confidence: f64) -> SuggestionPayload {
        SuggestionPayload {
            confidence,
            tables: vec![SuggestedTable {
                name: "notes".into(),
                columns: vec![SuggestedColumn {
                    name: "id".into(),
                    type_name: "uuid".into(),
                    constraints: vec![SuggestedConstraint {
                        kind: "primary_key".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn request() -> SuggestionRequest {
        SuggestionRequest::new(&[], 10, None)
    }

    #[tokio::test]
    async fn test_accepts_confident_payload() {
        let client = MockSuggestionClient::returning(payload(0.95));
        let schema = suggest_schema(&client, &request(), &SuggestConfig::default(), "app")
            .await
            .unwrap();
        assert_eq!(schema.table_names(), vec!["notes"]);
    }

    #[tokio::test]
    async fn test_confidence_gate() {
        let client = MockSuggestionClient::returning(payload(0.4));
        let err = suggest_schema(&client, &request(), &SuggestConfig::default(), "app")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SuggestionError::LowConfidence {
                confidence: 0.4,
                minimum: 0.7
            }
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported() {
        let client = MockSuggestionClient::failing();
        let err = suggest_schema(&client, &request(), &SuggestConfig::default(), "app")
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestionError::Upstream(_)));
    }
}
