//! CLI command implementations

pub mod emit;
pub mod infer;
pub mod run;
pub mod validate;

use std::path::Path;

use crate::error::CliError;
use schema_forge::models::Schema;

/// Load a schema document from a JSON file.
pub fn load_schema(path: &Path) -> Result<Schema, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::InvalidArgument(format!("{} is not a schema document: {}", path.display(), e))
    })
}
