//! Prisma schema emission
//!
//! Builds a [`PrismaSchema`] tree (generator, datasource, enums, models) and
//! renders it with column-aligned fields the way `prisma format` lays them
//! out. Tables become PascalCase models mapped back with `@@map`; every
//! foreign key becomes a named `@relation` on both ends.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{ExportError, ExportOptions, ExportResult, ExportedFile, pascal_case, unmappable};
use crate::models::{Column, DataType, IndexMethod, ReferentialAction, Relationship, Schema, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldArity {
    Required,
    Optional,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub arity: FieldArity,
    pub attributes: Vec<String>,
}

impl Field {
    fn type_with_arity(&self) -> String {
        match self.arity {
            FieldArity::Required => self.type_name.clone(),
            FieldArity::Optional => format!("{}?", self.type_name),
            FieldArity::List => format!("{}[]", self.type_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub fields: Vec<Field>,
    /// `@@` attributes, printed after the fields
    pub attributes: Vec<String>,
}

impl Model {
    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// `base`, or `base_2`, `base_3`, ... when taken
    fn free_field_name(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 2;
        while self.has_field(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        candidate
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    /// Database value when it is not a valid Prisma identifier
    pub map: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<EnumValue>,
    pub map: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrismaSchema {
    pub header: String,
    pub enums: Vec<EnumDecl>,
    pub models: Vec<Model>,
}

fn is_prisma_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn enum_value(raw: &str) -> EnumValue {
    if is_prisma_identifier(raw) {
        return EnumValue {
            name: raw.to_string(),
            map: None,
        };
    }
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name = format!("v_{}", name);
    }
    EnumValue {
        name,
        map: Some(raw.to_string()),
    }
}

fn referential_action(action: ReferentialAction) -> &'static str {
    match action {
        ReferentialAction::NoAction => "NoAction",
        ReferentialAction::Restrict => "Restrict",
        ReferentialAction::Cascade => "Cascade",
        ReferentialAction::SetNull => "SetNull",
        ReferentialAction::SetDefault => "SetDefault",
    }
}

fn index_type(method: IndexMethod) -> &'static str {
    match method {
        IndexMethod::BTree => "BTree",
        IndexMethod::Hash => "Hash",
        IndexMethod::Gin => "Gin",
        IndexMethod::Gist => "Gist",
        IndexMethod::Brin => "Brin",
    }
}

/// Prisma scalar type and native `@db` attribute for a non-array type.
fn scalar(column: &Column, data_type: &DataType) -> Option<(String, Option<String>)> {
    let mapped = match data_type {
        DataType::Text => ("String".to_string(), None),
        DataType::Varchar => (
            "String".to_string(),
            Some(match column.length {
                Some(n) => format!("@db.VarChar({})", n),
                None => "@db.VarChar".to_string(),
            }),
        ),
        DataType::Char => (
            "String".to_string(),
            Some(match column.length {
                Some(n) => format!("@db.Char({})", n),
                None => "@db.Char".to_string(),
            }),
        ),
        DataType::SmallInt => ("Int".to_string(), Some("@db.SmallInt".to_string())),
        DataType::Integer => ("Int".to_string(), None),
        DataType::BigInt => ("BigInt".to_string(), None),
        DataType::Numeric | DataType::Decimal => (
            "Decimal".to_string(),
            match (column.precision, column.scale) {
                (Some(p), Some(s)) => Some(format!("@db.Decimal({}, {})", p, s)),
                (Some(p), None) => Some(format!("@db.Decimal({}, 0)", p)),
                _ => None,
            },
        ),
        DataType::Real => ("Float".to_string(), Some("@db.Real".to_string())),
        DataType::DoublePrecision => ("Float".to_string(), None),
        DataType::Boolean => ("Boolean".to_string(), None),
        DataType::Date => ("DateTime".to_string(), Some("@db.Date".to_string())),
        DataType::Time => ("DateTime".to_string(), Some("@db.Time".to_string())),
        DataType::Timestamp => ("DateTime".to_string(), Some("@db.Timestamp".to_string())),
        DataType::TimestampTz => ("DateTime".to_string(), Some("@db.Timestamptz".to_string())),
        DataType::Uuid => ("String".to_string(), Some("@db.Uuid".to_string())),
        DataType::Json => ("Json".to_string(), Some("@db.Json".to_string())),
        DataType::Jsonb => ("Json".to_string(), None),
        DataType::Enum { name, .. } => (pascal_case(name), None),
        DataType::Array { .. } | DataType::Other { .. } => return None,
    };
    Some(mapped)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Translate a SQL default expression into a `@default(...)` argument.
fn default_value(expression: &str, data_type: &DataType) -> String {
    let trimmed = expression.trim();
    let lowered = trimmed.to_lowercase();

    if lowered == "now()" || lowered == "current_timestamp" {
        return "now()".to_string();
    }
    if lowered.starts_with("nextval(") {
        return "autoincrement()".to_string();
    }
    if lowered == "true" || lowered == "false" {
        return lowered;
    }
    if trimmed.parse::<f64>().is_ok() {
        return trimmed.to_string();
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        let literal = trimmed[1..trimmed.len() - 1].replace("''", "'");
        return match data_type {
            DataType::Enum { .. } => enum_value(&literal).name,
            _ => format!("\"{}\"", escape(&literal)),
        };
    }
    format!("dbgenerated(\"{}\")", escape(trimmed))
}

/// Exporter for Prisma schema files
pub struct PrismaExporter;

impl PrismaExporter {
    pub fn export(&self, schema: &Schema, options: &ExportOptions) -> ExportResult<ExportedFile> {
        let tree = self.build(schema, options)?;
        Ok(ExportedFile::new("schema.prisma", print(&tree), "text/plain"))
    }

    pub fn build(&self, schema: &Schema, options: &ExportOptions) -> ExportResult<PrismaSchema> {
        let mut enums: Vec<EnumDecl> = Vec::new();
        let mut models: Vec<Model> = Vec::with_capacity(schema.tables.len());
        let mut model_index: HashMap<String, usize> = HashMap::new();

        for table in &schema.tables {
            collect_enums(table, &mut enums);
            model_index.insert(table.name.clone(), models.len());
            models.push(self.model(table, options)?);
        }

        for fk in schema.foreign_keys() {
            self.relation(schema, &fk, &model_index, &mut models)?;
        }

        for (table, model) in schema.tables.iter().zip(models.iter_mut()) {
            model.attributes.push(format!("@@map(\"{}\")", escape(&table.name)));
        }

        debug!(
            "Built Prisma schema with {} model(s) and {} enum(s)",
            models.len(),
            enums.len()
        );

        Ok(PrismaSchema {
            header: format!(
                "// Generated by schema-forge from schema '{}' (version {})",
                schema.name, schema.version
            ),
            enums,
            models,
        })
    }

    fn model(&self, table: &Table, options: &ExportOptions) -> ExportResult<Model> {
        let composite = table.primary_key_columns().len() > 1;
        let mut fields = Vec::with_capacity(table.columns.len());

        for column in &table.columns {
            let (mapped, arity) = match &column.data_type {
                DataType::Array { element } => (scalar(column, element), FieldArity::List),
                other => (
                    scalar(column, other),
                    if column.is_nullable() {
                        FieldArity::Optional
                    } else {
                        FieldArity::Required
                    },
                ),
            };
            let (type_name, native) = mapped.ok_or_else(|| {
                unmappable("prisma", &column.data_type, &table.name, &column.name)
            })?;

            let mut attributes = Vec::new();
            if column.is_primary_key() && !composite {
                attributes.push("@id".to_string());
            } else if column.is_unique() && !column.is_primary_key() {
                attributes.push("@unique".to_string());
            }
            if let Some(expression) = column.default_expression() {
                attributes.push(format!(
                    "@default({})",
                    default_value(expression, &column.data_type)
                ));
            }
            attributes.extend(native);

            fields.push(Field {
                name: column.name.clone(),
                type_name,
                arity,
                attributes,
            });
        }

        let mut attributes = Vec::new();
        if composite {
            let keys: Vec<&str> = table
                .primary_key_columns()
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            attributes.push(format!("@@id([{}])", keys.join(", ")));
        }
        if options.include_indexes {
            for index in &table.indexes {
                let mut args = vec![
                    format!("[{}]", index.columns.join(", ")),
                    format!("map: \"{}\"", escape(&index.name)),
                ];
                if let Some(method) = index.method {
                    args.push(format!("type: {}", index_type(method)));
                }
                let kind = if index.unique { "@@unique" } else { "@@index" };
                attributes.push(format!("{}({})", kind, args.join(", ")));
            }
        }

        Ok(Model {
            name: pascal_case(&table.name),
            fields,
            attributes,
        })
    }

    /// Add the owning field on the source model and the back-relation on the
    /// target model.
    fn relation(
        &self,
        schema: &Schema,
        fk: &Relationship,
        model_index: &HashMap<String, usize>,
        models: &mut [Model],
    ) -> ExportResult<()> {
        let missing = |table: &str, column: &str| {
            ExportError::InvalidReference(format!(
                "relationship '{}' points at missing column {}.{}",
                fk.name, table, column
            ))
        };
        let source_column = schema
            .table(&fk.source_table)
            .and_then(|t| t.column(&fk.source_column))
            .ok_or_else(|| missing(&fk.source_table, &fk.source_column))?;
        if !schema
            .table(&fk.target_table)
            .is_some_and(|t| t.has_column(&fk.target_column))
        {
            return Err(missing(&fk.target_table, &fk.target_column));
        }
        let (Some(&source), Some(&target)) = (
            model_index.get(&fk.source_table),
            model_index.get(&fk.target_table),
        ) else {
            return Err(missing(&fk.source_table, &fk.source_column));
        };

        let target_model = models[target].name.clone();
        let source_model = models[source].name.clone();

        let base = fk
            .source_column
            .strip_suffix("_id")
            .filter(|s| !s.is_empty())
            .unwrap_or(&fk.target_table);
        let owning_name = models[source].free_field_name(base);

        let mut args = vec![
            format!("\"{}\"", escape(&fk.name)),
            format!("fields: [{}]", fk.source_column),
            format!("references: [{}]", fk.target_column),
        ];
        if fk.on_delete != ReferentialAction::NoAction {
            args.push(format!("onDelete: {}", referential_action(fk.on_delete)));
        }
        if fk.on_update != ReferentialAction::NoAction {
            args.push(format!("onUpdate: {}", referential_action(fk.on_update)));
        }

        models[source].fields.push(Field {
            name: owning_name,
            type_name: target_model,
            arity: if source_column.is_nullable() {
                FieldArity::Optional
            } else {
                FieldArity::Required
            },
            attributes: vec![format!("@relation({})", args.join(", "))],
        });

        let back_name = models[target].free_field_name(&fk.source_table);
        models[target].fields.push(Field {
            name: back_name,
            type_name: source_model,
            arity: if source_column.is_unique() {
                FieldArity::Optional
            } else {
                FieldArity::List
            },
            attributes: vec![format!("@relation(\"{}\")", escape(&fk.name))],
        });

        Ok(())
    }
}

fn collect_enums(table: &Table, enums: &mut Vec<EnumDecl>) {
    let mut seen: HashSet<String> = enums.iter().map(|e| e.map.clone()).collect();
    for column in &table.columns {
        let data_type = match &column.data_type {
            DataType::Array { element } => element.as_ref(),
            other => other,
        };
        if let DataType::Enum { name, values } = data_type
            && seen.insert(name.clone())
        {
            enums.push(EnumDecl {
                name: pascal_case(name),
                values: values.iter().map(|v| enum_value(v)).collect(),
                map: name.clone(),
            });
        }
    }
}

/// Render the tree as schema text.
pub fn print(schema: &PrismaSchema) -> String {
    let mut out = String::new();
    out.push_str(&schema.header);
    out.push_str("\n\n");
    out.push_str("generator client {\n  provider = \"prisma-client-js\"\n}\n\n");
    out.push_str(
        "datasource db {\n  provider = \"postgresql\"\n  url      = env(\"DATABASE_URL\")\n}\n",
    );

    for decl in &schema.enums {
        out.push_str(&format!("\nenum {} {{\n", decl.name));
        for value in &decl.values {
            match &value.map {
                Some(raw) => out.push_str(&format!("  {} @map(\"{}\")\n", value.name, escape(raw))),
                None => out.push_str(&format!("  {}\n", value.name)),
            }
        }
        out.push_str(&format!("\n  @@map(\"{}\")\n}}\n", escape(&decl.map)));
    }

    for model in &schema.models {
        out.push_str(&format!("\nmodel {} {{\n", model.name));
        let name_width = model.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        let types: Vec<String> = model.fields.iter().map(Field::type_with_arity).collect();
        let type_width = types.iter().map(String::len).max().unwrap_or(0);

        for (field, type_name) in model.fields.iter().zip(&types) {
            let line = format!(
                "  {:name_width$} {:type_width$} {}",
                field.name,
                type_name,
                field.attributes.join(" "),
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
        if !model.attributes.is_empty() {
            out.push('\n');
            for attribute in &model.attributes {
                out.push_str(&format!("  {}\n", attribute));
            }
        }
        out.push_str("}\n");
    }

    out
}
