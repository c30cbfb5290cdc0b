//! SQL emission: migration and declarative families
//!
//! # Security
//!
//! All identifiers are double-quoted and literals single-quoted, with
//! embedded quotes doubled. DEFAULT, CHECK and policy predicates are
//! expressions and are emitted verbatim.

pub mod ast;
pub mod builder;
pub mod printer;
pub mod types;
pub mod verify;

use tracing::debug;

use crate::export::{ExportOptions, ExportResult, ExportedFile};
use crate::models::Schema;
use crate::validation::input::to_snake_identifier;

pub use builder::SqlBuilder;
pub use printer::{print_statements, quote_identifier, quote_literal};
pub use verify::{ParsedColumn, ParsedTable, reparse_create_tables};

const SQL_MIME: &str = "application/sql";

/// Exporter for PostgreSQL DDL
pub struct SqlExporter;

impl SqlExporter {
    /// Framed migration plus its rollback.
    ///
    /// Files are named `{timestamp}_{name}.sql` and `{timestamp}_{name}_down.sql`,
    /// where the timestamp is the fixed option or the schema's `updated_at`.
    pub fn export_migration(
        &self,
        schema: &Schema,
        options: &ExportOptions,
    ) -> ExportResult<Vec<ExportedFile>> {
        let builder = SqlBuilder::new(schema, options);
        let statements = builder.statements()?;
        let down = builder.down_statements();

        let timestamp = options.timestamp_for(schema);
        let mut name = to_snake_identifier(&options.migration_name);
        if name.is_empty() {
            name = "migration".to_string();
        }
        let stamp = timestamp.format("%Y%m%d%H%M%S").to_string();

        let header = format!(
            "-- Migration: {}\n-- Schema: {} (version {})\n-- Generated by schema-forge at {}\n",
            name,
            schema.name,
            schema.version,
            timestamp.to_rfc3339()
        );

        let up = format!(
            "{}\nBEGIN;\n\n{}\nCOMMIT;\n",
            header,
            print_statements(&statements)
        );
        let rollback = format!(
            "{}-- Rollback\n\nBEGIN;\n\n{}\nCOMMIT;\n",
            header,
            print_statements(&down)
        );

        debug!(
            "Migration {}_{}: {} statement(s), {} rollback statement(s)",
            stamp,
            name,
            statements.len(),
            down.len()
        );

        Ok(vec![
            ExportedFile::new(format!("{}_{}.sql", stamp, name), up, SQL_MIME),
            ExportedFile::new(format!("{}_{}_down.sql", stamp, name), rollback, SQL_MIME),
        ])
    }

    /// The same statements in one unframed `schema.sql`.
    pub fn export_declarative(
        &self,
        schema: &Schema,
        options: &ExportOptions,
    ) -> ExportResult<ExportedFile> {
        let statements = SqlBuilder::new(schema, options).statements()?;
        Ok(ExportedFile::new(
            "schema.sql",
            print_statements(&statements),
            SQL_MIME,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, DataType, Table};
    use chrono::{TimeZone, Utc};

    fn schema() -> Schema {
        let mut schema = Schema::new("crm");
        schema
            .add_table(Table::new(
                "contacts",
                vec![Column::new("id", DataType::Uuid).primary_key()],
            ))
            .unwrap();
        schema
    }

    #[test]
    fn test_migration_files_are_framed_and_named() {
        let options = ExportOptions::default()
            .with_migration_name("Add Contacts")
            .at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
        let files = SqlExporter.export_migration(&schema(), &options).unwrap();

        assert_eq!(files[0].filename, "20240301123000_add_contacts.sql");
        assert_eq!(files[1].filename, "20240301123000_add_contacts_down.sql");
        assert!(files[0].content.contains("BEGIN;\n"));
        assert!(files[0].content.trim_end().ends_with("COMMIT;"));
        assert!(files[1].content.contains("DROP TABLE IF EXISTS \"public\".\"contacts\" CASCADE;"));
    }

    #[test]
    fn test_same_snapshot_renders_same_files() {
        let schema = schema();
        let options = ExportOptions::default();
        let first = SqlExporter.export_migration(&schema, &options).unwrap();
        let second = SqlExporter.export_migration(&schema, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_declarative_has_no_framing() {
        let file = SqlExporter
            .export_declarative(&schema(), &ExportOptions::default())
            .unwrap();
        assert_eq!(file.filename, "schema.sql");
        assert!(!file.content.contains("BEGIN;"));
        assert!(file.content.starts_with("CREATE TABLE"));
    }
}
