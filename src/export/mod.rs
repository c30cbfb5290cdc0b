//! Multi-target code emission
//!
//! Renders a [`Schema`] into executable or documentary artifacts:
//! - SQL migration (framed, with a rollback file)
//! - Declarative SQL
//! - Prisma schema
//! - TypeScript bindings
//! - Mermaid ER diagram
//!
//! Every family builds a small syntax tree and renders it with a dedicated
//! printer. Type mapping is total per target; a type a target cannot express
//! aborts the call with [`ExportError::UnmappableType`].

pub mod mermaid;
pub mod prisma;
pub mod sql;
pub mod typescript;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Schema;

pub use mermaid::MermaidExporter;
pub use prisma::PrismaExporter;
pub use sql::SqlExporter;
pub use typescript::TypeScriptExporter;

/// Error during export
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// A column type the target has no representation for
    #[error("{target} cannot represent type '{type_name}' of column {table}.{column}")]
    UnmappableType {
        target: String,
        type_name: String,
        table: String,
        column: String,
    },
    /// A relationship or policy pointing at a table or column that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    /// Emitted SQL could not be parsed back
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    SqlMigration,
    SqlDeclarative,
    Prisma,
    #[serde(rename = "typescript")]
    TypeScript,
    Mermaid,
}

impl ExportFormat {
    pub fn all() -> [ExportFormat; 5] {
        [
            ExportFormat::SqlMigration,
            ExportFormat::SqlDeclarative,
            ExportFormat::Prisma,
            ExportFormat::TypeScript,
            ExportFormat::Mermaid,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::SqlMigration => "sql-migration",
            ExportFormat::SqlDeclarative => "sql-declarative",
            ExportFormat::Prisma => "prisma",
            ExportFormat::TypeScript => "typescript",
            ExportFormat::Mermaid => "mermaid",
        }
    }

    /// Accepts the kebab-case name and a few short aliases.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "sql-migration" | "migration" | "sql" => Some(ExportFormat::SqlMigration),
            "sql-declarative" | "declarative" => Some(ExportFormat::SqlDeclarative),
            "prisma" => Some(ExportFormat::Prisma),
            "typescript" | "ts" => Some(ExportFormat::TypeScript),
            "mermaid" | "mmd" => Some(ExportFormat::Mermaid),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One emitted artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub filename: String,
    pub content: String,
    pub mime_type: String,
}

impl ExportedFile {
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Options shared by all emitters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// SQL namespace
    pub schema: String,
    pub include_rls: bool,
    pub include_indexes: bool,
    pub include_comments: bool,
    pub if_not_exists: bool,
    pub migration_name: String,
    /// Fixed migration timestamp; the schema's `updated_at` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            include_rls: true,
            include_indexes: true,
            include_comments: true,
            if_not_exists: false,
            migration_name: "init_schema".to_string(),
            timestamp: None,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn include_rls(mut self, include: bool) -> Self {
        self.include_rls = include;
        self
    }

    pub fn include_indexes(mut self, include: bool) -> Self {
        self.include_indexes = include;
        self
    }

    pub fn include_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    pub fn if_not_exists(mut self, enabled: bool) -> Self {
        self.if_not_exists = enabled;
        self
    }

    pub fn with_migration_name(mut self, name: impl Into<String>) -> Self {
        self.migration_name = name.into();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Timestamp stamped on migrations for this schema snapshot.
    pub fn timestamp_for(&self, schema: &Schema) -> DateTime<Utc> {
        self.timestamp.unwrap_or(schema.updated_at)
    }
}

/// Render `schema` in one target format.
///
/// # Example
///
/// ```rust
/// use schema_forge::export::{ExportFormat, ExportOptions, emit};
/// use schema_forge::models::{Column, DataType, Schema, Table};
///
/// let mut schema = Schema::new("shop");
/// schema
///     .add_table(Table::new(
///         "customers",
///         vec![Column::new("id", DataType::Uuid).primary_key()],
///     ))
///     .unwrap();
///
/// let files = emit(&schema, ExportFormat::SqlDeclarative, &ExportOptions::default()).unwrap();
/// assert_eq!(files[0].filename, "schema.sql");
/// assert!(files[0].content.contains("CREATE TABLE \"public\".\"customers\""));
/// ```
pub fn emit(
    schema: &Schema,
    format: ExportFormat,
    options: &ExportOptions,
) -> ExportResult<Vec<ExportedFile>> {
    let files = match format {
        ExportFormat::SqlMigration => SqlExporter.export_migration(schema, options)?,
        ExportFormat::SqlDeclarative => vec![SqlExporter.export_declarative(schema, options)?],
        ExportFormat::Prisma => vec![PrismaExporter.export(schema, options)?],
        ExportFormat::TypeScript => vec![TypeScriptExporter.export(schema, options)?],
        ExportFormat::Mermaid => vec![MermaidExporter.export(schema, options)?],
    };

    info!(
        "Emitted {} file(s) for schema '{}' as {}",
        files.len(),
        schema.name,
        format
    );
    Ok(files)
}

/// `order_items` -> `OrderItems`
pub(crate) fn pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub(crate) fn unmappable(
    target: &str,
    data_type: &crate::models::DataType,
    table: &str,
    column: &str,
) -> ExportError {
    ExportError::UnmappableType {
        target: target.to_string(),
        type_name: data_type.name(),
        table: table.to_string(),
        column: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("sql"), Some(ExportFormat::SqlMigration));
        assert_eq!(ExportFormat::parse("TS"), Some(ExportFormat::TypeScript));
        assert_eq!(ExportFormat::parse("dbml"), None);
        for format in ExportFormat::all() {
            assert_eq!(ExportFormat::parse(format.as_str()), Some(format));
        }
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("order_items"), "OrderItems");
        assert_eq!(pascal_case("customers"), "Customers");
        assert_eq!(pascal_case("api_v2_keys"), "ApiV2Keys");
    }

    #[test]
    fn test_timestamp_defaults_to_schema() {
        let schema = Schema::new("s");
        let options = ExportOptions::default();
        assert_eq!(options.timestamp_for(&schema), schema.updated_at);
    }
}
