//! `run` command: the full pipeline over a set of descriptors

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CliError;
use crate::output::{OutputFormat, emit_output, print_validation, render, write_files};
use schema_forge::config::ForgeConfig;
use schema_forge::inference::FileDescriptor;
use schema_forge::pipeline::SchemaPipeline;
use schema_forge::suggest::{
    SuggestionClient, SuggestionPayload, SuggestionRequest, SuggestionResult,
};

/// Arguments for the `run` command
pub struct RunArgs {
    pub files: Vec<PathBuf>,
    /// Recorded suggestion payload to replay instead of calling a service
    pub suggestion: Option<PathBuf>,
    pub out_dir: PathBuf,
    /// Where to write the run report; stdout when absent
    pub report: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Replays a suggestion payload read from disk.
struct RecordedSuggestion {
    name: String,
    payload: SuggestionPayload,
}

impl RecordedSuggestion {
    fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
        let payload = serde_json::from_str(&content).map_err(|e| {
            CliError::InvalidArgument(format!(
                "{} is not a suggestion payload: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            name: format!("recorded:{}", path.display()),
            payload,
        })
    }
}

#[async_trait]
impl SuggestionClient for RecordedSuggestion {
    async fn suggest(&self, _request: &SuggestionRequest) -> SuggestionResult<SuggestionPayload> {
        Ok(self.payload.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handle the `run` command
pub async fn handle_run(args: &RunArgs, config: ForgeConfig) -> Result<(), CliError> {
    let files = args
        .files
        .iter()
        .map(|p| FileDescriptor::from_path(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut pipeline = SchemaPipeline::new(config)?;
    if let Some(path) = &args.suggestion {
        pipeline = pipeline.with_client(Arc::new(RecordedSuggestion::load(path)?));
    }

    let report = pipeline.run(&files).await?;
    eprintln!("Run {}: {}", report.run_id, report.summary());
    if let Some(reason) = &report.suggestion_error {
        eprintln!("Suggestion not used: {}", reason);
    }
    print_validation(&report.validation);

    if report.emission_blocked {
        eprintln!("Emission skipped: the schema has validation errors");
    } else {
        eprintln!("Writing {} file(s):", report.files.len());
        write_files(&report.files, &args.out_dir)?;
    }

    emit_output(&render(&report, args.format)?, args.report.as_deref())?;

    if report.emission_blocked {
        return Err(CliError::ValidationFailed(report.validation.errors.len()));
    }
    Ok(())
}
