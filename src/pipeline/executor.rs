//! Runs infer -> suggest/fallback -> validate -> order -> emit

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::error::{PipelineError, PipelineResult};
use super::report::{PipelineReport, SchemaSource};
use crate::config::ForgeConfig;
use crate::export::{ExportedFile, emit};
use crate::inference::{FileDescriptor, FileInference, TypeInferrer};
use crate::models::Schema;
use crate::resolver::{DependencyOrder, dependency_order};
use crate::suggest::{SuggestionClient, SuggestionRequest, fallback_schema, suggest_schema};
use crate::validation::{FindingCode, SchemaValidator, ValidationCache, ValidationReport};

/// Drives one analysis run per call to [`SchemaPipeline::run`].
///
/// The validation cache is shared across runs and can be injected so several
/// pipelines reuse one store.
pub struct SchemaPipeline {
    config: ForgeConfig,
    client: Option<Arc<dyn SuggestionClient>>,
    cache: Arc<ValidationCache>,
}

impl SchemaPipeline {
    pub fn new(config: ForgeConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: None,
            cache: Arc::new(ValidationCache::new()),
        })
    }

    pub fn with_client(mut self, client: Arc<dyn SuggestionClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_cache(mut self, cache: Arc<ValidationCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Infer every file; headers are required, everything else is a finding.
    pub fn infer(&self, files: &[FileDescriptor]) -> PipelineResult<Vec<FileInference>> {
        let _span = info_span!("pipeline_stage", stage = "infer").entered();
        let inferrer = TypeInferrer::with_config(self.config.inference.clone());
        let inferences = files
            .iter()
            .map(|file| inferrer.infer_file(file))
            .collect::<Result<Vec<_>, _>>()?;
        info!(files = inferences.len(), "Inference completed");
        Ok(inferences)
    }

    pub fn validate(&self, schema: &Schema) -> ValidationReport {
        let validator = SchemaValidator::new(self.config.validator.clone());
        self.cache.validate(&validator, schema)
    }

    /// Emit every configured format.
    pub fn emit(&self, schema: &Schema) -> PipelineResult<Vec<ExportedFile>> {
        let _span = info_span!("pipeline_stage", stage = "emit").entered();
        let mut files = Vec::new();
        for format in &self.config.export.formats {
            files.extend(emit(schema, *format, &self.config.export.options)?);
        }
        Ok(files)
    }

    pub async fn run(&self, files: &[FileDescriptor]) -> PipelineResult<PipelineReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("pipeline_run", run_id = %run_id, files = files.len());
        self.run_inner(run_id, files).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: String,
        files: &[FileDescriptor],
    ) -> PipelineResult<PipelineReport> {
        let start = Instant::now();
        if files.is_empty() {
            return Err(PipelineError::MissingInput(
                "at least one file descriptor".to_string(),
            ));
        }
        info!("Starting pipeline");

        let inferences = self.infer(files)?;
        let (schema, source, suggestion_error) = self.draft(files, &inferences).await;
        let (validation, order, files, emission_blocked) = self.finish(&schema)?;

        let report = PipelineReport {
            run_id,
            schema,
            source,
            suggestion_error,
            inferences,
            validation,
            order,
            files,
            emission_blocked,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!("{}", report.summary());
        Ok(report)
    }

    /// The suggested schema when one is configured and acceptable, else the
    /// fallback, with the reason the suggestion was not used.
    async fn draft(
        &self,
        files: &[FileDescriptor],
        inferences: &[FileInference],
    ) -> (Schema, SchemaSource, Option<String>) {
        let suggest = &self.config.suggest;
        let client = match &self.client {
            Some(client) if suggest.enabled => client,
            _ => {
                debug!("No suggestion client in use, building fallback schema");
                return (
                    fallback_schema(&self.config.name, inferences),
                    SchemaSource::Fallback,
                    None,
                );
            }
        };

        let request = SuggestionRequest::new(files, suggest.max_samples, suggest.use_case.clone());
        let outcome = suggest_schema(client.as_ref(), &request, suggest, &self.config.name)
            .instrument(info_span!("pipeline_stage", stage = "suggest"))
            .await;

        match outcome {
            Ok(schema) => (
                schema,
                SchemaSource::Suggested {
                    client: client.name().to_string(),
                },
                None,
            ),
            Err(e) => {
                warn!(error = %e, "Suggestion not used, falling back to rule-based schema");
                (
                    fallback_schema(&self.config.name, inferences),
                    SchemaSource::Fallback,
                    Some(e.to_string()),
                )
            }
        }
    }

    fn finish(
        &self,
        schema: &Schema,
    ) -> PipelineResult<(ValidationReport, DependencyOrder, Vec<ExportedFile>, bool)> {
        let validation = self.validate(schema);
        let order = dependency_order(schema);

        if self.config.export.block_on_errors && blocks_emission(&validation) {
            warn!(
                errors = validation.errors.len(),
                "Validation failed, skipping emission"
            );
            return Ok((validation, order, Vec::new(), true));
        }

        let files = self.emit(schema)?;
        Ok((validation, order, files, false))
    }
}

/// Cycles are emitted anyway; the SQL builders add foreign keys after all tables.
fn blocks_emission(report: &ValidationReport) -> bool {
    report
        .errors
        .iter()
        .any(|finding| finding.code != FindingCode::CycleDetected)
}
