//! Schema model: the root of the canonical representation

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::column::Constraint;
use super::enums::Cardinality;
use super::policy::AccessPolicy;
use super::relationship::Relationship;
use super::table::Table;
use crate::validation::input::validate_identifier;

/// Errors raised by schema transformations. A failed transformation leaves
/// the schema untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("column '{column}' not found on table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("column '{column}' already exists on table '{table}'")]
    ColumnExists { table: String, column: String },

    #[error("relationship '{0}' already exists")]
    RelationshipExists(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// The canonical schema model.
///
/// Built once per analysis run and changed only through the transformation
/// methods below, each of which bumps `version` and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: Uuid,
    pub name: String,
    pub version: u32,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub policies: Vec<AccessPolicy>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            version: 1,
            tables: Vec::new(),
            relationships: Vec::new(),
            policies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Append a table; names must be unique.
    pub fn add_table(&mut self, table: Table) -> SchemaResult<()> {
        if self.table(&table.name).is_some() {
            return Err(SchemaError::TableExists(table.name));
        }
        self.tables.push(table);
        self.touch();
        Ok(())
    }

    /// Remove a table together with the relationships and policies that
    /// reference it.
    pub fn remove_table(&mut self, name: &str) -> SchemaResult<Table> {
        let position = self
            .tables
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()))?;

        let removed = self.tables.remove(position);
        self.relationships
            .retain(|r| r.source_table != name && r.target_table != name);
        self.policies.retain(|p| p.table != name);
        for table in &mut self.tables {
            for column in &mut table.columns {
                column.constraints.retain(|c| {
                    !matches!(c, Constraint::ForeignKey { table: target, .. } if target == name)
                });
            }
        }
        self.touch();
        Ok(removed)
    }

    /// Rename a column and every reference to it (relationships, foreign key
    /// constraints, index column lists).
    pub fn rename_column(&mut self, table: &str, from: &str, to: &str) -> SchemaResult<()> {
        validate_identifier(to).map_err(|e| SchemaError::InvalidIdentifier(e.to_string()))?;

        let target = self
            .tables
            .iter_mut()
            .find(|t| t.name == table)
            .ok_or_else(|| SchemaError::TableNotFound(table.to_string()))?;

        if target.has_column(to) {
            return Err(SchemaError::ColumnExists {
                table: table.to_string(),
                column: to.to_string(),
            });
        }

        let column = target
            .column_mut(from)
            .ok_or_else(|| SchemaError::ColumnNotFound {
                table: table.to_string(),
                column: from.to_string(),
            })?;
        column.name = to.to_string();

        for index in &mut target.indexes {
            for name in &mut index.columns {
                if *name == from {
                    *name = to.to_string();
                }
            }
        }

        for rel in &mut self.relationships {
            if rel.source_table == table && rel.source_column == from {
                rel.source_column = to.to_string();
            }
            if rel.target_table == table && rel.target_column == from {
                rel.target_column = to.to_string();
            }
        }

        for other in &mut self.tables {
            for col in &mut other.columns {
                for constraint in &mut col.constraints {
                    if let Constraint::ForeignKey {
                        table: ref_table,
                        column: ref_column,
                        ..
                    } = constraint
                        && *ref_table == table
                        && *ref_column == from
                    {
                        *ref_column = to.to_string();
                    }
                }
            }
        }

        self.touch();
        Ok(())
    }

    /// Add a relationship whose endpoints exist.
    pub fn add_relationship(&mut self, relationship: Relationship) -> SchemaResult<()> {
        for (table, column) in [
            (&relationship.source_table, &relationship.source_column),
            (&relationship.target_table, &relationship.target_column),
        ] {
            let t = self
                .table(table)
                .ok_or_else(|| SchemaError::TableNotFound(table.clone()))?;
            if !t.has_column(column) {
                return Err(SchemaError::ColumnNotFound {
                    table: table.clone(),
                    column: column.clone(),
                });
            }
        }

        if self
            .relationships
            .iter()
            .any(|r| r.name == relationship.name || r.endpoint_key() == relationship.endpoint_key())
        {
            return Err(SchemaError::RelationshipExists(relationship.name));
        }

        self.relationships.push(relationship);
        self.touch();
        Ok(())
    }

    /// Add a row-level access policy on an existing table.
    pub fn add_policy(&mut self, policy: AccessPolicy) -> SchemaResult<()> {
        if self.table(&policy.table).is_none() {
            return Err(SchemaError::TableNotFound(policy.table));
        }
        self.policies.push(policy);
        self.touch();
        Ok(())
    }

    /// Every foreign key in the schema: explicit relationships first, then
    /// column-level FOREIGN KEY constraints not already covered by one.
    pub fn foreign_keys(&self) -> Vec<Relationship> {
        let mut seen: HashSet<(String, String, String, String)> = HashSet::new();
        let mut keys = Vec::new();

        for rel in &self.relationships {
            if seen.insert(rel.endpoint_key()) {
                keys.push(rel.clone());
            }
        }

        for table in &self.tables {
            for column in &table.columns {
                if let Some(Constraint::ForeignKey {
                    table: target_table,
                    column: target_column,
                    on_delete,
                    on_update,
                }) = column.foreign_key()
                {
                    let rel = Relationship::new(
                        table.name.clone(),
                        column.name.clone(),
                        target_table.clone(),
                        target_column.clone(),
                    )
                    .with_cardinality(if column.is_unique() {
                        Cardinality::OneToOne
                    } else {
                        Cardinality::OneToMany
                    })
                    .on_delete(*on_delete)
                    .on_update(*on_update);
                    if seen.insert(rel.endpoint_key()) {
                        keys.push(rel);
                    }
                }
            }
        }

        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, DataType, Index};

    fn sample_schema() -> Schema {
        let mut schema = Schema::new("shop");
        schema
            .add_table(Table::new(
                "customers",
                vec![Column::new("id", DataType::Uuid).primary_key()],
            ))
            .unwrap();
        schema
            .add_table(
                Table::new(
                    "orders",
                    vec![
                        Column::new("id", DataType::Uuid).primary_key(),
                        Column::new("customer_id", DataType::Uuid),
                    ],
                )
                .with_index(Index::new("idx_orders_customer", vec!["customer_id".to_string()])),
            )
            .unwrap();
        schema
            .add_relationship(Relationship::new("orders", "customer_id", "customers", "id"))
            .unwrap();
        schema
    }

    #[test]
    fn test_add_duplicate_table_fails() {
        let mut schema = sample_schema();
        let version = schema.version;
        let err = schema
            .add_table(Table::new("orders", Vec::new()))
            .unwrap_err();
        assert_eq!(err, SchemaError::TableExists("orders".to_string()));
        assert_eq!(schema.version, version);
    }

    #[test]
    fn test_transformations_bump_version() {
        let schema = sample_schema();
        assert_eq!(schema.version, 4);
    }

    #[test]
    fn test_remove_table_drops_references() {
        let mut schema = sample_schema();
        schema
            .add_policy(AccessPolicy::select("customers", "read", "true"))
            .unwrap();
        schema.remove_table("customers").unwrap();
        assert!(schema.relationships.is_empty());
        assert!(schema.policies.is_empty());
        assert_eq!(schema.table_names(), vec!["orders"]);
    }

    #[test]
    fn test_rename_column_rewrites_references() {
        let mut schema = sample_schema();
        schema
            .rename_column("orders", "customer_id", "buyer_id")
            .unwrap();
        let orders = schema.table("orders").unwrap();
        assert!(orders.has_column("buyer_id"));
        assert_eq!(orders.indexes[0].columns, vec!["buyer_id".to_string()]);
        assert_eq!(schema.relationships[0].source_column, "buyer_id");
    }

    #[test]
    fn test_rename_column_rejects_invalid_identifier() {
        let mut schema = sample_schema();
        let err = schema
            .rename_column("orders", "customer_id", "1bad")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_add_relationship_requires_endpoints() {
        let mut schema = sample_schema();
        let err = schema
            .add_relationship(Relationship::new("orders", "missing", "customers", "id"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_foreign_keys_merge_column_constraints() {
        let mut schema = sample_schema();
        schema
            .add_table(Table::new(
                "payments",
                vec![
                    Column::new("id", DataType::Uuid).primary_key(),
                    Column::new("order_id", DataType::Uuid).references("orders", "id"),
                ],
            ))
            .unwrap();
        // The same edge declared both ways is reported once.
        schema.tables[1].columns[1] = Column::new("customer_id", DataType::Uuid)
            .references("customers", "id");

        let keys = schema.foreign_keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].source_table, "payments");
    }
}
