//! Rule-based schema builder used when no acceptable suggestion exists

use std::collections::HashSet;

use tracing::{debug, info};

use crate::inference::FileInference;
use crate::models::{Column, DataType, Schema, Table};
use crate::resolver::{apply_inferred_relationships, infer_relationships};

const KEY_COLUMN: &str = "id";
const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

/// Build a schema straight from inference results.
///
/// Every table gets a surrogate `id UUID PRIMARY KEY DEFAULT
/// gen_random_uuid()` and `created_at`/`updated_at` audit columns. Inferred
/// columns that collide with those names are kept with a `source_` prefix,
/// so a raw `id` becomes `source_id`. `X_id` columns are then linked by
/// naming convention; one whose inferred type differs from the referenced key
/// keeps its raw values as `source_X_id` and is replaced by a nullable column
/// of the key's type.
pub fn fallback_schema(name: &str, inferences: &[FileInference]) -> Schema {
    let mut schema = Schema::new(name);
    let mut table_names: HashSet<String> = HashSet::new();

    for inference in inferences {
        let mut table_name = inference.table_name.clone();
        let mut n = 2;
        while table_names.contains(&table_name) {
            table_name = format!("{}_{}", inference.table_name, n);
            n += 1;
        }
        table_names.insert(table_name.clone());

        let table = fallback_table(&table_name, inference);
        // Names were made unique above.
        if let Err(e) = schema.add_table(table) {
            debug!("Skipping table '{}': {}", table_name, e);
        }
    }

    let retyped = retype_link_columns(&mut schema);
    let linked = apply_inferred_relationships(&mut schema);
    info!(
        "Fallback schema '{}' built with {} table(s) and {} inferred relationship(s), {} retyped",
        name,
        schema.tables.len(),
        linked,
        retyped
    );
    schema
}

/// First of `base`, `base_2`, `base_3`, ... that is not taken.
fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while taken(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    name
}

/// Give every `X_id` column the type of the key it will reference.
fn retype_link_columns(schema: &mut Schema) -> usize {
    let mismatched: Vec<(String, String, DataType)> = infer_relationships(schema)
        .into_iter()
        .filter_map(|rel| {
            let source = schema.table(&rel.source_table)?.column(&rel.source_column)?;
            let key = schema.table(&rel.target_table)?.column(&rel.target_column)?;
            (source.data_type != key.data_type).then(|| {
                (rel.source_table.clone(), rel.source_column.clone(), key.data_type.clone())
            })
        })
        .collect();

    for (table_name, column_name, key_type) in &mismatched {
        let Some(table) = schema.tables.iter_mut().find(|t| &t.name == table_name) else {
            continue;
        };
        let Some(position) = table.columns.iter().position(|c| &c.name == column_name) else {
            continue;
        };
        let renamed = unique_name(&format!("source_{}", column_name), |n| table.has_column(n));
        debug!(
            table = %table_name,
            column = %column_name,
            kept_as = %renamed,
            "Retyped link column to {}",
            key_type
        );

        let raw = &mut table.columns[position];
        if raw.source_column.is_none() {
            raw.source_column = Some(column_name.clone());
        }
        raw.name = renamed;
        table
            .columns
            .insert(position, Column::new(column_name.clone(), key_type.clone()));
    }
    mismatched.len()
}

fn fallback_table(name: &str, inference: &FileInference) -> Table {
    let reserved = [KEY_COLUMN, CREATED_AT, UPDATED_AT];
    let mut taken: HashSet<String> = inference.columns.iter().map(|c| c.name.clone()).collect();
    taken.extend(reserved.iter().map(|s| s.to_string()));

    let mut columns = vec![
        Column::new(KEY_COLUMN, DataType::Uuid)
            .primary_key()
            .with_default("gen_random_uuid()"),
    ];

    for inferred in &inference.columns {
        let mut column = inferred.to_column();
        if reserved.contains(&column.name.as_str()) {
            let renamed = unique_name(&format!("source_{}", column.name), |n| taken.contains(n));
            taken.insert(renamed.clone());
            if column.source_column.is_none() {
                column.source_column = Some(inferred.source_name.clone());
            }
            column.name = renamed;
        }
        columns.push(column);
    }

    columns.push(
        Column::new(CREATED_AT, DataType::TimestampTz)
            .not_null()
            .with_default("now()"),
    );
    columns.push(
        Column::new(UPDATED_AT, DataType::TimestampTz)
            .not_null()
            .with_default("now()"),
    );

    Table::new(name, columns)
}
