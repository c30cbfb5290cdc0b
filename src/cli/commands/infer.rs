//! `infer` command

use std::path::PathBuf;

use crate::error::CliError;
use crate::output::{OutputFormat, emit_output, render};
use schema_forge::config::ForgeConfig;
use schema_forge::inference::{FileDescriptor, TypeInferrer};

/// Arguments for the `infer` command
pub struct InferArgs {
    /// File descriptor JSON documents
    pub files: Vec<PathBuf>,
    /// Also print the draft tables built from the inference
    pub tables: bool,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Handle the `infer` command
pub fn handle_infer(args: &InferArgs, config: &ForgeConfig) -> Result<(), CliError> {
    let inferrer = TypeInferrer::with_config(config.inference.clone());
    let mut inferences = Vec::with_capacity(args.files.len());

    for path in &args.files {
        let descriptor = FileDescriptor::from_path(path)?;
        let inference = inferrer.infer_file(&descriptor)?;
        eprintln!(
            "{}: {} column(s), {} finding(s)",
            inference.file_name,
            inference.columns.len(),
            inference.findings.len()
        );
        inferences.push(inference);
    }

    let rendered = if args.tables {
        let tables: Vec<_> = inferences.iter().map(|i| i.to_table()).collect();
        render(&tables, args.format)?
    } else {
        render(&inferences, args.format)?
    };
    emit_output(&rendered, args.output.as_deref())
}
