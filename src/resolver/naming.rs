//! Foreign key inference from column naming conventions

use std::collections::HashSet;

use tracing::debug;

use crate::models::{Cardinality, Relationship, Schema, Table};

/// Candidate table names for the stem of an `X_id` column:
/// `X`, `Xs`, `Xes`, and `Xies` when `X` ends in `y`.
fn candidate_tables(stem: &str) -> Vec<String> {
    let mut names = vec![
        stem.to_string(),
        format!("{}s", stem),
        format!("{}es", stem),
    ];
    if let Some(base) = stem.strip_suffix('y') {
        names.push(format!("{}ies", base));
    }
    names
}

/// Column to point a foreign key at: the single primary key, else `id`.
fn target_key(table: &Table) -> Option<&str> {
    table
        .primary_key()
        .map(|c| c.name.as_str())
        .or_else(|| table.column("id").map(|c| c.name.as_str()))
}

/// Find the table an `X_id` column refers to, ignoring case.
fn resolve_target<'a>(schema: &'a Schema, column: &str) -> Option<&'a Table> {
    let lower = column.to_lowercase();
    let stem = lower.strip_suffix("_id")?;
    if stem.is_empty() {
        return None;
    }
    candidate_tables(stem).into_iter().find_map(|candidate| {
        schema
            .tables
            .iter()
            .find(|t| t.name.to_lowercase() == candidate)
    })
}

/// Infer relationships from `X_id` column names.
///
/// Columns named `id`, columns already covered by a relationship or a FOREIGN
/// KEY constraint, and self-references are skipped. The cardinality is
/// one-to-one when the source column is unique, one-to-many otherwise.
pub fn infer_relationships(schema: &Schema) -> Vec<Relationship> {
    let covered: HashSet<(String, String)> = schema
        .foreign_keys()
        .into_iter()
        .map(|fk| (fk.source_table.to_lowercase(), fk.source_column.to_lowercase()))
        .collect();

    let mut inferred = Vec::new();
    for table in &schema.tables {
        for column in &table.columns {
            if column.name.eq_ignore_ascii_case("id")
                || covered.contains(&(table.name.to_lowercase(), column.name.to_lowercase()))
            {
                continue;
            }

            let Some(target) = resolve_target(schema, &column.name) else {
                continue;
            };
            if target.name == table.name {
                continue;
            }
            let Some(target_column) = target_key(target) else {
                debug!(table = %target.name, "Referenced table has no key column, skipping");
                continue;
            };

            let cardinality = if column.is_unique() {
                Cardinality::OneToOne
            } else {
                Cardinality::OneToMany
            };
            debug!(
                source = %format!("{}.{}", table.name, column.name),
                target = %format!("{}.{}", target.name, target_column),
                "Inferred relationship from column name"
            );
            inferred.push(
                Relationship::new(
                    table.name.clone(),
                    column.name.clone(),
                    target.name.clone(),
                    target_column,
                )
                .with_cardinality(cardinality)
                .with_justification(format!(
                    "column '{}' matches table '{}'",
                    column.name, target.name
                )),
            );
        }
    }
    inferred
}

/// Add inferred relationships to a schema that has none. Returns how many
/// were added.
pub fn apply_inferred_relationships(schema: &mut Schema) -> usize {
    if !schema.relationships.is_empty() {
        return 0;
    }
    let mut added = 0;
    for rel in infer_relationships(schema) {
        if schema.add_relationship(rel).is_ok() {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, DataType};

    fn schema_with(tables: Vec<Table>) -> Schema {
        let mut schema = Schema::new("test");
        for table in tables {
            schema.add_table(table).unwrap();
        }
        schema
    }

    fn keyed(name: &str, extra: Vec<Column>) -> Table {
        let mut columns = vec![Column::new("id", DataType::Uuid).primary_key()];
        columns.extend(extra);
        Table::new(name, columns)
    }

    #[test]
    fn test_plural_forms() {
        let schema = schema_with(vec![
            keyed("customers", vec![]),
            keyed("addresses", vec![]),
            keyed("categories", vec![]),
            keyed(
                "orders",
                vec![
                    Column::new("customer_id", DataType::Uuid),
                    Column::new("address_id", DataType::Uuid),
                    Column::new("category_id", DataType::Uuid),
                ],
            ),
        ]);
        let rels = infer_relationships(&schema);
        let targets: Vec<&str> = rels.iter().map(|r| r.target_table.as_str()).collect();
        assert_eq!(targets, vec!["customers", "addresses", "categories"]);
        assert!(rels.iter().all(|r| r.target_column == "id"));
    }

    #[test]
    fn test_case_insensitive_match() {
        let schema = schema_with(vec![
            keyed("Customer", vec![]),
            keyed("orders", vec![Column::new("CUSTOMER_ID", DataType::Uuid)]),
        ]);
        let rels = infer_relationships(&schema);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].target_table, "Customer");
    }

    #[test]
    fn test_skips_self_reference_and_unknown() {
        let schema = schema_with(vec![keyed(
            "employees",
            vec![
                Column::new("employee_id", DataType::Uuid),
                Column::new("vendor_id", DataType::Uuid),
            ],
        )]);
        assert!(infer_relationships(&schema).is_empty());
    }

    #[test]
    fn test_unique_source_is_one_to_one() {
        let schema = schema_with(vec![
            keyed("users", vec![]),
            keyed("profiles", vec![Column::new("user_id", DataType::Uuid).unique()]),
        ]);
        let rels = infer_relationships(&schema);
        assert_eq!(rels[0].cardinality, Cardinality::OneToOne);
    }

    #[test]
    fn test_existing_foreign_key_not_duplicated() {
        let schema = schema_with(vec![
            keyed("users", vec![]),
            keyed(
                "posts",
                vec![Column::new("user_id", DataType::Uuid).references("users", "id")],
            ),
        ]);
        assert!(infer_relationships(&schema).is_empty());
    }

    #[test]
    fn test_apply_only_when_no_relationships() {
        let mut schema = schema_with(vec![
            keyed("users", vec![]),
            keyed("posts", vec![Column::new("user_id", DataType::Uuid)]),
        ]);
        assert_eq!(apply_inferred_relationships(&mut schema), 1);
        assert_eq!(apply_inferred_relationships(&mut schema), 0);
        assert_eq!(schema.relationships.len(), 1);
    }
}
