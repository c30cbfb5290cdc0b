//! Request and loosely typed payload exchanged with the collaborator, and
//! normalization of the payload into the schema model

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{SuggestionError, SuggestionResult};
use crate::inference::FileDescriptor;
use crate::models::{
    AccessPolicy, Cardinality, Column, Constraint, DataType, ParsedType, PolicyOperation,
    ReferentialAction, Relationship, Schema, Table,
};

/// What the collaborator is shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub files: Vec<FileDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

impl SuggestionRequest {
    /// Copy the descriptors with at most `max_samples` rows and sample
    /// values each.
    pub fn new(files: &[FileDescriptor], max_samples: usize, use_case: Option<String>) -> Self {
        let files = files
            .iter()
            .map(|file| {
                let mut file = file.clone();
                file.total_rows = file.total_count();
                file.rows.truncate(max_samples);
                for stats in &mut file.column_stats {
                    stats.sample_values.truncate(max_samples);
                }
                file
            })
            .collect();
        Self { files, use_case }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestedConstraint {
    /// `primary_key`, `foreign_key`, `unique`, `not_null`, `default`, `check`
    #[serde(rename = "type")]
    pub kind: String,
    pub table: Option<String>,
    pub column: Option<String>,
    pub expression: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestedColumn {
    pub name: String,
    /// Free-form type string such as `varchar(120)` or `enum`
    #[serde(rename = "type", alias = "dataType")]
    pub type_name: String,
    pub nullable: Option<bool>,
    pub default: Option<String>,
    pub constraints: Vec<SuggestedConstraint>,
    /// Values when the type is `enum`
    pub values: Vec<String>,
    pub comment: Option<String>,
    pub source_column: Option<String>,
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestedTable {
    pub name: String,
    pub columns: Vec<SuggestedColumn>,
    pub comment: Option<String>,
    pub join_table: bool,
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestedRelationship {
    pub name: Option<String>,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    /// Defaults to the target table's primary key
    pub target_column: Option<String>,
    pub cardinality: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestedPolicy {
    pub table: String,
    pub name: String,
    pub operation: String,
    pub using: Option<String>,
    pub with_check: Option<String>,
    pub roles: Vec<String>,
}

/// A suggested schema as the collaborator returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestionPayload {
    pub tables: Vec<SuggestedTable>,
    pub relationships: Vec<SuggestedRelationship>,
    pub policies: Vec<SuggestedPolicy>,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub justification: Option<String>,
}

fn invalid(message: impl Into<String>) -> SuggestionError {
    SuggestionError::InvalidPayload(message.into())
}

/// Lowercase with separators removed: `One-To-Many` -> `onetomany`
fn squash(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn action(input: Option<&str>, what: &str) -> SuggestionResult<ReferentialAction> {
    match input {
        None => Ok(ReferentialAction::NoAction),
        Some(raw) => ReferentialAction::parse(raw)
            .ok_or_else(|| invalid(format!("unknown {} action '{}'", what, raw))),
    }
}

fn cardinality(input: Option<&str>) -> SuggestionResult<Cardinality> {
    let Some(raw) = input else {
        return Ok(Cardinality::OneToMany);
    };
    match squash(raw).as_str() {
        "onetoone" | "11" => Ok(Cardinality::OneToOne),
        "onetomany" | "manytoone" | "1n" | "n1" => Ok(Cardinality::OneToMany),
        "manytomany" | "nm" | "mn" => Ok(Cardinality::ManyToMany),
        _ => Err(invalid(format!("unknown cardinality '{}'", raw))),
    }
}

fn constraint(
    table: &str,
    column: &str,
    raw: &SuggestedConstraint,
) -> SuggestionResult<Constraint> {
    let expression = || {
        raw.expression
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                invalid(format!(
                    "{} constraint on {}.{} has no expression",
                    raw.kind, table, column
                ))
            })
    };

    Ok(match squash(&raw.kind).as_str() {
        "primarykey" | "pk" => Constraint::PrimaryKey,
        "foreignkey" | "fk" | "references" => Constraint::ForeignKey {
            table: raw.table.clone().ok_or_else(|| {
                invalid(format!("foreign key on {}.{} has no target table", table, column))
            })?,
            column: raw.column.clone().unwrap_or_else(|| "id".to_string()),
            on_delete: action(raw.on_delete.as_deref(), "on delete")?,
            on_update: action(raw.on_update.as_deref(), "on update")?,
        },
        "unique" => Constraint::Unique,
        "notnull" => Constraint::NotNull,
        "default" => Constraint::Default {
            expression: expression()?,
        },
        "check" => Constraint::Check {
            expression: expression()?,
        },
        _ => {
            return Err(invalid(format!(
                "unknown constraint '{}' on {}.{}",
                raw.kind, table, column
            )));
        }
    })
}

fn column(table: &str, raw: &SuggestedColumn) -> SuggestionResult<Column> {
    if raw.name.trim().is_empty() {
        return Err(invalid(format!("table '{}' has a column without a name", table)));
    }
    if raw.type_name.trim().is_empty() {
        return Err(invalid(format!("column {}.{} has no type", table, raw.name)));
    }

    let parsed = if squash(&raw.type_name) == "enum" {
        if raw.values.is_empty() {
            return Err(invalid(format!("enum column {}.{} has no values", table, raw.name)));
        }
        ParsedType {
            data_type: DataType::enumeration(format!("{}_{}", table, raw.name), raw.values.clone()),
            length: None,
            precision: None,
            scale: None,
        }
    } else {
        DataType::parse(&raw.type_name)
    };

    let mut column = Column::new(raw.name.clone(), parsed.data_type);
    column.length = parsed.length;
    column.precision = parsed.precision;
    column.scale = parsed.scale;
    column.default = raw.default.clone();
    column.comment = raw.comment.clone().or_else(|| raw.justification.clone());
    column.source_column = raw.source_column.clone();
    if raw.nullable == Some(false) {
        column.nullable = false;
    }

    for c in &raw.constraints {
        let constraint = constraint(table, &raw.name, c)?;
        if matches!(constraint, Constraint::PrimaryKey | Constraint::NotNull) {
            column.nullable = false;
        }
        if !column.constraints.contains(&constraint) {
            column.constraints.push(constraint);
        }
    }
    Ok(column)
}

fn table(raw: &SuggestedTable) -> SuggestionResult<Table> {
    if raw.name.trim().is_empty() {
        return Err(invalid("table without a name"));
    }
    if raw.columns.is_empty() {
        return Err(invalid(format!("table '{}' has no columns", raw.name)));
    }

    let columns = raw
        .columns
        .iter()
        .map(|c| column(&raw.name, c))
        .collect::<SuggestionResult<Vec<_>>>()?;
    let mut table = Table::new(raw.name.clone(), columns);
    table.comment = raw.comment.clone().or_else(|| raw.justification.clone());
    table.join_table = raw.join_table;
    Ok(table)
}

impl SuggestionPayload {
    /// Normalize into the closed model.
    ///
    /// Type strings are parsed into [`DataType`] (unknown names survive as
    /// `Other` for the validator to flag), constraints into tagged variants
    /// and relationship endpoints are checked through the schema's own
    /// transformations. Any structural problem rejects the whole payload.
    pub fn into_schema(self, name: &str) -> SuggestionResult<Schema> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(invalid(format!(
                "confidence {} is outside 0.0 - 1.0",
                self.confidence
            )));
        }
        if self.tables.is_empty() {
            return Err(invalid("no tables suggested"));
        }

        let mut schema = Schema::new(name);
        for raw in &self.tables {
            schema
                .add_table(table(raw)?)
                .map_err(|e| invalid(e.to_string()))?;
        }

        for raw in &self.relationships {
            let target_column = match &raw.target_column {
                Some(column) => column.clone(),
                None => schema
                    .table(&raw.target_table)
                    .and_then(|t| t.primary_key())
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "id".to_string()),
            };
            let mut relationship = Relationship::new(
                raw.source_table.clone(),
                raw.source_column.clone(),
                raw.target_table.clone(),
                target_column,
            )
            .with_cardinality(cardinality(raw.cardinality.as_deref())?)
            .on_delete(action(raw.on_delete.as_deref(), "on delete")?)
            .on_update(action(raw.on_update.as_deref(), "on update")?);
            if let Some(name) = &raw.name {
                relationship = relationship.with_name(name.clone());
            }
            if let Some(text) = &raw.justification {
                relationship = relationship.with_justification(text.clone());
            }
            schema
                .add_relationship(relationship)
                .map_err(|e| invalid(e.to_string()))?;
        }

        for raw in &self.policies {
            let operation = PolicyOperation::parse(&raw.operation).ok_or_else(|| {
                invalid(format!(
                    "policy '{}' has unknown operation '{}'",
                    raw.name, raw.operation
                ))
            })?;
            let policy = AccessPolicy {
                table: raw.table.clone(),
                name: raw.name.clone(),
                operation,
                using: raw.using.clone(),
                with_check: raw.with_check.clone(),
                roles: raw.roles.clone(),
            };
            schema
                .add_policy(policy)
                .map_err(|e| invalid(e.to_string()))?;
        }

        debug!(
            "Normalized suggestion into {} table(s), {} relationship(s), {} policy(ies)",
            schema.tables.len(),
            schema.relationships.len(),
            schema.policies.len()
        );
        Ok(schema)
    }
}
