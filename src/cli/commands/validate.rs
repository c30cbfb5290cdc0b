//! `validate` and `order` commands

use std::path::Path;

use crate::commands::load_schema;
use crate::error::CliError;
use crate::output::{OutputFormat, emit_output, print_validation, render};
use schema_forge::config::ForgeConfig;
use schema_forge::resolver::dependency_order;
use schema_forge::validation::SchemaValidator;

/// Handle the `validate` command
pub fn handle_validate(
    schema: &Path,
    format: OutputFormat,
    config: &ForgeConfig,
) -> Result<(), CliError> {
    let schema = load_schema(schema)?;
    let report = SchemaValidator::new(config.validator.clone()).validate(&schema);

    print_validation(&report);
    println!("{}", render(&report, format)?);

    if report.is_valid {
        eprintln!("Validation successful");
        Ok(())
    } else {
        Err(CliError::ValidationFailed(report.errors.len()))
    }
}

/// Handle the `order` command
pub fn handle_order(schema: &Path, format: OutputFormat) -> Result<(), CliError> {
    let schema = load_schema(schema)?;
    let order = dependency_order(&schema);
    for cycle in &order.cycles {
        eprintln!("cycle: {}", cycle.join(" -> "));
    }
    emit_output(&render(&order, format)?, None)
}
