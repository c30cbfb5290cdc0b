//! Output formatting for CLI

use std::path::Path;

use serde::Serialize;

use crate::error::CliError;
use schema_forge::export::ExportedFile;
use schema_forge::validation::{Finding, ValidationReport};

/// Structured output encoding selected by `--output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| CliError::Serialization(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::Serialization(e.to_string()))
        }
    }
}

/// Print to stdout, or write to `path` when given.
pub fn emit_output(content: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string()))?;
            eprintln!("Written to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Write emitted files into `dir`, creating it if needed.
pub fn write_files(files: &[ExportedFile], dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::FileWriteError(dir.to_path_buf(), e.to_string()))?;
    for file in files {
        let path = dir.join(&file.filename);
        std::fs::write(&path, &file.content)
            .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
        eprintln!("  {} ({} bytes)", path.display(), file.content.len());
    }
    Ok(())
}

fn format_finding(finding: &Finding) -> String {
    let mut line = format!("[{}] {}", finding.code.as_str(), finding.message);
    if let Some(suggestion) = &finding.suggestion {
        line.push_str(&format!(" (suggestion: {})", suggestion));
    }
    line
}

/// Human-readable validation summary on stderr
pub fn print_validation(report: &ValidationReport) {
    for finding in &report.errors {
        eprintln!("error: {}", format_finding(finding));
    }
    for finding in &report.warnings {
        eprintln!("warning: {}", format_finding(finding));
    }
    for finding in &report.infos {
        eprintln!("info: {}", format_finding(finding));
    }
    eprintln!(
        "{} error(s), {} warning(s), {} info(s)",
        report.errors.len(),
        report.warnings.len(),
        report.infos.len()
    );
}
