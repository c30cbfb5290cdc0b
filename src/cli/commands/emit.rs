//! `emit` command

use std::path::PathBuf;

use crate::commands::load_schema;
use crate::error::CliError;
use crate::output::{print_validation, write_files};
use schema_forge::config::ForgeConfig;
use schema_forge::export::{ExportFormat, emit};
use schema_forge::validation::SchemaValidator;

/// Arguments for the `emit` command
pub struct EmitArgs {
    pub schema: PathBuf,
    /// Target formats; the configured formats when empty
    pub targets: Vec<String>,
    pub out_dir: PathBuf,
    /// Emit even when validation reports errors
    pub force: bool,
}

fn parse_targets(targets: &[String]) -> Result<Vec<ExportFormat>, CliError> {
    targets
        .iter()
        .map(|t| {
            ExportFormat::parse(t).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "Unknown target '{}', expected one of: {}",
                    t,
                    ExportFormat::all()
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
        })
        .collect()
}

/// Handle the `emit` command
pub fn handle_emit(args: &EmitArgs, config: &ForgeConfig) -> Result<(), CliError> {
    let formats = if args.targets.is_empty() {
        config.export.formats.clone()
    } else {
        parse_targets(&args.targets)?
    };

    let schema = load_schema(&args.schema)?;
    let report = SchemaValidator::new(config.validator.clone()).validate(&schema);
    if !report.is_valid {
        print_validation(&report);
        if !args.force && config.export.block_on_errors {
            return Err(CliError::ValidationFailed(report.errors.len()));
        }
    }

    let mut files = Vec::new();
    for format in formats {
        files.extend(emit(&schema, format, &config.export.options)?);
    }

    eprintln!("Writing {} file(s):", files.len());
    write_files(&files, &args.out_dir)
}
