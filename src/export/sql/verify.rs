//! Round-trip verification of emitted DDL with `sqlparser`

use serde::{Deserialize, Serialize};
use sqlparser::ast::{ColumnOption, ObjectName, ObjectNamePart, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::export::{ExportError, ExportResult};

/// A column as read back from a `CREATE TABLE` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedColumn {
    pub name: String,
    /// Type as the parser prints it, e.g. `NUMERIC(10,2)`
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub name: String,
    pub columns: Vec<ParsedColumn>,
}

impl ParsedTable {
    pub fn column(&self, name: &str) -> Option<&ParsedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

fn last_identifier(name: &ObjectName) -> String {
    match name.0.last() {
        Some(ObjectNamePart::Identifier(ident)) => ident.value.clone(),
        _ => name.to_string().trim_matches('"').to_string(),
    }
}

/// Column names listed in a table-level `PRIMARY KEY (...)` clause.
fn key_columns(constraint: &str) -> Vec<String> {
    let Some(start) = constraint.find("PRIMARY KEY") else {
        return Vec::new();
    };
    let rest = &constraint[start..];
    match (rest.find('('), rest.find(')')) {
        (Some(open), Some(close)) if close > open => rest[open + 1..close]
            .split(',')
            .map(|c| c.trim().trim_matches('"').to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse every `CREATE TABLE` statement in `sql` and report the column
/// names, types and nullability the database would see. Other statements
/// are skipped.
pub fn reparse_create_tables(sql: &str) -> ExportResult<Vec<ParsedTable>> {
    let dialect = PostgreSqlDialect {};
    let mut tables = Vec::new();

    for chunk in sql.split(";\n") {
        let statement: String = chunk
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let statement = statement.trim();
        if !statement.starts_with("CREATE TABLE") {
            continue;
        }

        let parsed = Parser::parse_sql(&dialect, statement)
            .map_err(|e| ExportError::Parse(format!("{}: {}", e, statement)))?;

        for parsed in parsed {
            let Statement::CreateTable(create) = parsed else {
                continue;
            };

            let table_keys: Vec<String> = create
                .constraints
                .iter()
                .flat_map(|c| key_columns(&c.to_string()))
                .collect();

            let columns = create
                .columns
                .iter()
                .map(|column| {
                    let inline_key = column
                        .options
                        .iter()
                        .any(|o| o.option.to_string().starts_with("PRIMARY KEY"));
                    let primary_key = inline_key || table_keys.contains(&column.name.value);
                    let not_null = column
                        .options
                        .iter()
                        .any(|o| matches!(o.option, ColumnOption::NotNull));
                    ParsedColumn {
                        name: column.name.value.clone(),
                        data_type: column.data_type.to_string(),
                        nullable: !(not_null || primary_key),
                        primary_key,
                    }
                })
                .collect();

            tables.push(ParsedTable {
                name: last_identifier(&create.name),
                columns,
            });
        }
    }

    Ok(tables)
}
