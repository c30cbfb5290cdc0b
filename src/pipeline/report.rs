//! Outcome of one pipeline run

use serde::{Deserialize, Serialize};

use crate::export::ExportedFile;
use crate::inference::FileInference;
use crate::models::Schema;
use crate::resolver::DependencyOrder;
use crate::validation::ValidationReport;

/// Where the schema came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SchemaSource {
    /// Accepted from the named suggestion client
    Suggested { client: String },
    /// Built by the rule-based fallback
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub run_id: String,
    pub schema: Schema,
    pub source: SchemaSource,
    /// Why the suggestion was not used, when one was asked for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_error: Option<String>,
    pub inferences: Vec<FileInference>,
    pub validation: ValidationReport,
    pub order: DependencyOrder,
    pub files: Vec<ExportedFile>,
    /// Emission was skipped because validation reported errors
    pub emission_blocked: bool,
    pub duration_ms: u64,
}

impl PipelineReport {
    pub fn used_fallback(&self) -> bool {
        self.source == SchemaSource::Fallback
    }

    /// Structural findings from inference plus validation errors
    pub fn error_count(&self) -> usize {
        self.inferences
            .iter()
            .flat_map(|i| &i.findings)
            .filter(|f| f.is_error())
            .count()
            + self.validation.errors.len()
    }

    /// One-line summary for logs and terminals
    pub fn summary(&self) -> String {
        let source = match &self.source {
            SchemaSource::Suggested { client } => format!("suggested by {}", client),
            SchemaSource::Fallback => "fallback".to_string(),
        };
        format!(
            "schema '{}' ({}): {} table(s), {} relationship(s), {} error(s), {} warning(s), {} file(s) in {}ms",
            self.schema.name,
            source,
            self.schema.tables.len(),
            self.schema.foreign_keys().len(),
            self.error_count(),
            self.validation.warnings.len(),
            self.files.len(),
            self.duration_ms
        )
    }
}
