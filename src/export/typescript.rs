//! TypeScript binding emission
//!
//! One `Row` interface per table plus `Insert` and `Update` variants, enum
//! unions and a recursive `Json` alias.

use std::collections::HashSet;

use super::{ExportOptions, ExportResult, ExportedFile, pascal_case, unmappable};
use crate::models::{Column, DataType, Schema, Table};

const JSON_ALIAS: &str =
    "string | number | boolean | null | { [key: string]: Json | undefined } | Json[]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub type_expr: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Alias { name: String, definition: String },
    Interface { name: String, properties: Vec<Property> },
}

fn ts_type(data_type: &DataType) -> Option<String> {
    let rendered = match data_type {
        DataType::Text
        | DataType::Varchar
        | DataType::Char
        | DataType::Uuid
        | DataType::Date
        | DataType::Time
        | DataType::Timestamp
        | DataType::TimestampTz => "string".to_string(),
        DataType::SmallInt
        | DataType::Integer
        | DataType::BigInt
        | DataType::Numeric
        | DataType::Decimal
        | DataType::Real
        | DataType::DoublePrecision => "number".to_string(),
        DataType::Boolean => "boolean".to_string(),
        DataType::Json | DataType::Jsonb => "Json".to_string(),
        DataType::Array { element } => format!("{}[]", ts_type(element)?),
        DataType::Enum { name, .. } => pascal_case(name),
        DataType::Other { .. } => return None,
    };
    Some(rendered)
}

fn string_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn property_name(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Exporter for TypeScript type declarations
pub struct TypeScriptExporter;

impl TypeScriptExporter {
    pub fn export(&self, schema: &Schema, _options: &ExportOptions) -> ExportResult<ExportedFile> {
        let declarations = self.build(schema)?;
        let header = format!(
            "// Generated by schema-forge from schema '{}' (version {})\n\n",
            schema.name, schema.version
        );
        Ok(ExportedFile::new(
            "types.ts",
            header + &print(&declarations),
            "application/typescript",
        ))
    }

    pub fn build(&self, schema: &Schema) -> ExportResult<Vec<Declaration>> {
        let mut declarations = vec![Declaration::Alias {
            name: "Json".to_string(),
            definition: JSON_ALIAS.to_string(),
        }];

        let mut seen: HashSet<String> = HashSet::new();
        for column in schema.tables.iter().flat_map(|t| &t.columns) {
            let mut data_type = &column.data_type;
            while let DataType::Array { element } = data_type {
                data_type = element;
            }
            if let DataType::Enum { name, values } = data_type
                && seen.insert(name.clone())
            {
                let definition = if values.is_empty() {
                    "never".to_string()
                } else {
                    values
                        .iter()
                        .map(|v| string_literal(v))
                        .collect::<Vec<_>>()
                        .join(" | ")
                };
                declarations.push(Declaration::Alias {
                    name: pascal_case(name),
                    definition,
                });
            }
        }

        for table in &schema.tables {
            declarations.extend(self.interfaces(table)?);
        }
        Ok(declarations)
    }

    fn interfaces(&self, table: &Table) -> ExportResult<[Declaration; 3]> {
        let base = pascal_case(&table.name);
        let mut row = Vec::new();
        let mut insert = Vec::new();
        let mut update = Vec::new();

        for column in &table.columns {
            let mut type_expr = ts_type(&column.data_type).ok_or_else(|| {
                unmappable("typescript", &column.data_type, &table.name, &column.name)
            })?;
            if column.is_nullable() {
                type_expr.push_str(" | null");
            }
            let property = |optional: bool| Property {
                name: property_name(&column.name),
                type_expr: type_expr.clone(),
                optional,
            };
            row.push(property(false));
            insert.push(property(!required_on_insert(column)));
            update.push(property(true));
        }

        Ok([
            Declaration::Interface {
                name: format!("{}Row", base),
                properties: row,
            },
            Declaration::Interface {
                name: format!("{}Insert", base),
                properties: insert,
            },
            Declaration::Interface {
                name: format!("{}Update", base),
                properties: update,
            },
        ])
    }
}

fn required_on_insert(column: &Column) -> bool {
    !column.is_nullable() && !column.has_default()
}

pub fn print(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|declaration| match declaration {
            Declaration::Alias { name, definition } => {
                format!("export type {} = {};\n", name, definition)
            }
            Declaration::Interface { name, properties } => {
                let mut out = format!("export interface {} {{\n", name);
                for p in properties {
                    out.push_str(&format!(
                        "  {}{}: {};\n",
                        p.name,
                        if p.optional { "?" } else { "" },
                        p.type_expr
                    ));
                }
                out.push_str("}\n");
                out
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
