//! Schema validation
//!
//! Every check is independent and reports typed findings; validation never
//! mutates the schema.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::finding::{Finding, FindingCode, Severity};
use super::input::{ValidationError, validate_identifier};
use crate::models::{AccessPolicy, Cardinality, Column, DataType, Schema, Table};
use crate::resolver::dependency_order;

/// Validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Primary keys and columns named `id` must be UUID
    pub require_uuid_primary_keys: bool,
    /// Warn when a foreign key column type differs from the referenced column
    pub check_foreign_key_types: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            require_uuid_primary_keys: true,
            check_foreign_key_types: true,
        }
    }
}

/// Outcome of validating one schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub infos: Vec<Finding>,
}

impl ValidationReport {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let mut report = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => report.errors.push(finding),
                Severity::Warning => report.warnings.push(finding),
                Severity::Info => report.infos.push(finding),
            }
        }
        report.is_valid = report.errors.is_empty();
        report
    }

    /// All findings, errors first
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.infos.iter())
    }

    pub fn has_code(&self, code: FindingCode) -> bool {
        self.findings().any(|f| f.code == code)
    }

    pub fn count(&self, code: FindingCode) -> usize {
        self.findings().filter(|f| f.code == code).count()
    }
}

/// Checks a [`Schema`] for structural correctness.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: ValidatorConfig,
}

impl SchemaValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, schema: &Schema) -> ValidationReport {
        let mut findings = Vec::new();

        findings.extend(check_naming(schema));
        findings.extend(check_duplicates(schema));
        for table in &schema.tables {
            findings.extend(self.check_primary_key(table));
            findings.extend(check_columns(table));
            findings.extend(check_indexes(table));
        }
        findings.extend(self.check_relationships(schema));
        findings.extend(check_cycles(schema));
        findings.extend(check_policies(schema));

        let report = ValidationReport::from_findings(findings);
        debug!(
            schema = %schema.name,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            infos = report.infos.len(),
            "Schema validated"
        );
        report
    }

    fn check_primary_key(&self, table: &Table) -> Vec<Finding> {
        let mut findings = Vec::new();
        let keys = table.primary_key_columns();

        if !table.join_table {
            match keys.len() {
                0 => findings.push(
                    Finding::error(
                        FindingCode::MissingPrimaryKey,
                        format!("table '{}' has no primary key", table.name),
                    )
                    .at_table(&table.name)
                    .with_hint("add an `id UUID PRIMARY KEY` column"),
                ),
                1 => {}
                n => findings.push(
                    Finding::error(
                        FindingCode::MultiplePrimaryKeys,
                        format!("table '{}' has {} primary key columns", table.name, n),
                    )
                    .at_table(&table.name)
                    .with_hint("mark the table as a join table or keep a single key"),
                ),
            }
        }

        for key in &keys {
            if key.nullable {
                findings.push(
                    Finding::error(
                        FindingCode::NullablePrimaryKey,
                        format!("primary key '{}' is marked nullable", key.name),
                    )
                    .at_column(&table.name, &key.name)
                    .with_fix("NOT NULL"),
                );
            }
        }

        if self.config.require_uuid_primary_keys {
            let mut checked = HashSet::new();
            let id_column = table.column("id");
            for column in keys.iter().copied().chain(id_column) {
                if !checked.insert(column.name.as_str()) || column.data_type == DataType::Uuid {
                    continue;
                }
                // Composite join keys are foreign keys; their type follows the target.
                if table.join_table && column.foreign_key().is_some() {
                    continue;
                }
                findings.push(
                    Finding::error(
                        FindingCode::PrimaryKeyNotUuid,
                        format!(
                            "key column '{}' is {}, expected uuid",
                            column.name, column.data_type
                        ),
                    )
                    .at_column(&table.name, &column.name)
                    .with_hint(
                        "use UUID with DEFAULT gen_random_uuid() and keep the old value as source_id",
                    ),
                );
            }
        }

        findings
    }

    fn check_relationships(&self, schema: &Schema) -> Vec<Finding> {
        let mut findings = Vec::new();

        for fk in schema.foreign_keys() {
            let location = format!(
                "{}.{} -> {}.{}",
                fk.source_table, fk.source_column, fk.target_table, fk.target_column
            );

            let source = endpoint(
                schema,
                &fk.source_table,
                &fk.source_column,
                &location,
                &mut findings,
            );
            let target = endpoint(
                schema,
                &fk.target_table,
                &fk.target_column,
                &location,
                &mut findings,
            );

            if fk.is_self_reference() {
                findings.push(
                    Finding::info(
                        FindingCode::SelfReference,
                        format!("self-referencing relationship {}", location),
                    )
                    .at_column(&fk.source_table, &fk.source_column),
                );
            }

            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };

            if fk.cardinality == Cardinality::OneToOne && !target.is_unique() {
                findings.push(
                    Finding::error(
                        FindingCode::OneToOneTargetNotUnique,
                        format!(
                            "one-to-one relationship {} targets a column without UNIQUE or PRIMARY KEY",
                            location
                        ),
                    )
                    .at_column(&fk.target_table, &fk.target_column)
                    .with_fix("UNIQUE"),
                );
            }

            if self.config.check_foreign_key_types && source.data_type != target.data_type {
                findings.push(
                    Finding::warning(
                        FindingCode::ForeignKeyTypeMismatch,
                        format!(
                            "relationship {} joins {} to {}",
                            location, source.data_type, target.data_type
                        ),
                    )
                    .at_column(&fk.source_table, &fk.source_column)
                    .with_fix(target.data_type.name()),
                );
            }
        }

        findings
    }
}

/// Validate with default settings.
pub fn validate(schema: &Schema) -> ValidationReport {
    SchemaValidator::default().validate(schema)
}

fn identifier_finding(name: &str, kind: &str, error: ValidationError) -> Finding {
    let code = match error {
        ValidationError::TooLong { .. } => FindingCode::IdentifierTooLong,
        ValidationError::ReservedWord(_) => FindingCode::ReservedWord,
        _ => FindingCode::InvalidIdentifier,
    };
    let finding = Finding::error(code, format!("{} name '{}': {}", kind, name, error));
    let fixed = super::input::to_snake_identifier(name);
    if !fixed.is_empty() && fixed != name {
        finding.with_fix(fixed)
    } else {
        finding
    }
}

fn check_naming(schema: &Schema) -> Vec<Finding> {
    let mut findings = Vec::new();
    for table in &schema.tables {
        if let Err(e) = validate_identifier(&table.name) {
            findings.push(identifier_finding(&table.name, "table", e).at_table(&table.name));
        }
        for column in &table.columns {
            if let Err(e) = validate_identifier(&column.name) {
                findings.push(
                    identifier_finding(&column.name, "column", e)
                        .at_column(&table.name, &column.name),
                );
            }
        }
    }
    findings
}

fn check_duplicates(schema: &Schema) -> Vec<Finding> {
    let mut findings = Vec::new();

    let mut tables = HashSet::new();
    for table in &schema.tables {
        if !tables.insert(table.name.to_lowercase()) {
            findings.push(
                Finding::error(
                    FindingCode::DuplicateTable,
                    format!("table '{}' is defined more than once", table.name),
                )
                .at_table(&table.name),
            );
        }

        let mut columns = HashSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.to_lowercase()) {
                findings.push(
                    Finding::error(
                        FindingCode::DuplicateColumn,
                        format!("column '{}' appears more than once", column.name),
                    )
                    .at_column(&table.name, &column.name),
                );
            }
        }
    }

    findings
}

fn check_column(table: &str, column: &Column) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !column.data_type.is_supported() {
        findings.push(
            Finding::error(
                FindingCode::UnsupportedType,
                format!("type '{}' is not supported", column.data_type),
            )
            .at_column(table, &column.name),
        );
    }

    let element = match &column.data_type {
        DataType::Array { element } => element.as_ref(),
        other => other,
    };

    if element.requires_length() && column.length.is_none() {
        findings.push(
            Finding::error(
                FindingCode::MissingLength,
                format!("{} column '{}' needs a length", element, column.name),
            )
            .at_column(table, &column.name)
            .with_fix("255"),
        );
    }

    if let (Some(precision), Some(scale)) = (column.precision, column.scale)
        && scale > precision
    {
        findings.push(
            Finding::error(
                FindingCode::ScaleExceedsPrecision,
                format!(
                    "scale {} exceeds precision {} on '{}'",
                    scale, precision, column.name
                ),
            )
            .at_column(table, &column.name),
        );
    }

    findings
}

fn check_columns(table: &Table) -> Vec<Finding> {
    table
        .columns
        .iter()
        .flat_map(|c| check_column(&table.name, c))
        .collect()
}

fn check_indexes(table: &Table) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in &table.indexes {
        for column in &index.columns {
            if !table.has_column(column) {
                findings.push(
                    Finding::error(
                        FindingCode::UnknownIndexColumn,
                        format!("index '{}' references unknown column '{}'", index.name, column),
                    )
                    .at_column(&table.name, column),
                );
            }
        }
    }
    findings
}

/// Resolve one relationship endpoint, recording a finding when it is missing.
fn endpoint<'a>(
    schema: &'a Schema,
    table: &str,
    column: &str,
    location: &str,
    findings: &mut Vec<Finding>,
) -> Option<&'a Column> {
    let Some(t) = schema.table(table) else {
        findings.push(
            Finding::error(
                FindingCode::UnknownTable,
                format!("relationship {} references unknown table '{}'", location, table),
            )
            .at_table(table),
        );
        return None;
    };
    let found = t.column(column);
    if found.is_none() {
        findings.push(
            Finding::error(
                FindingCode::UnknownColumn,
                format!("relationship {} references unknown column '{}'", location, column),
            )
            .at_column(table, column),
        );
    }
    found
}

fn check_cycles(schema: &Schema) -> Vec<Finding> {
    dependency_order(schema)
        .cycles
        .into_iter()
        .map(|cycle| {
            let first = cycle.first().cloned().unwrap_or_default();
            Finding::error(
                FindingCode::CycleDetected,
                format!("circular dependency: {}", cycle.join(" -> ")),
            )
            .at_table(first)
            .with_hint("make one foreign key nullable or deferrable")
        })
        .collect()
}

fn check_policy(schema: &Schema, policy: &AccessPolicy) -> Vec<Finding> {
    let mut findings = Vec::new();
    if schema.table(&policy.table).is_none() {
        findings.push(
            Finding::error(
                FindingCode::UnknownPolicyTable,
                format!("policy '{}' targets unknown table '{}'", policy.name, policy.table),
            )
            .at_table(&policy.table),
        );
    }
    for violation in policy.shape_violations() {
        findings.push(
            Finding::error(
                FindingCode::InvalidPolicyShape,
                format!("policy '{}': {}", policy.name, violation),
            )
            .at_table(&policy.table),
        );
    }
    findings
}

fn check_policies(schema: &Schema) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for policy in &schema.policies {
        findings.extend(check_policy(schema, policy));

        let count = seen
            .entry((policy.table.clone(), policy.name.clone()))
            .or_insert(0);
        *count += 1;
        if *count == 2 {
            findings.push(
                Finding::error(
                    FindingCode::DuplicatePolicy,
                    format!("policy '{}' is defined more than once", policy.name),
                )
                .at_table(&policy.table),
            );
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Index, Relationship};

    fn customers() -> Table {
        Table::new(
            "customers",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("email", DataType::Varchar).with_length(255),
            ],
        )
    }

    fn schema_of(tables: Vec<Table>) -> Schema {
        let mut schema = Schema::new("test");
        schema.tables = tables;
        schema
    }

    #[test]
    fn test_valid_schema() {
        let report = validate(&schema_of(vec![customers()]));
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_non_uuid_id_is_flagged() {
        let table = Table::new(
            "products",
            vec![Column::new("id", DataType::Integer).primary_key()],
        );
        let report = validate(&schema_of(vec![table]));
        assert!(!report.is_valid);
        assert!(report.has_code(FindingCode::PrimaryKeyNotUuid));
    }

    #[test]
    fn test_uuid_rule_can_be_disabled() {
        let table = Table::new(
            "products",
            vec![Column::new("id", DataType::Integer).primary_key()],
        );
        let validator = SchemaValidator::new(ValidatorConfig {
            require_uuid_primary_keys: false,
            ..Default::default()
        });
        assert!(validator.validate(&schema_of(vec![table])).is_valid);
    }

    #[test]
    fn test_missing_and_multiple_primary_keys() {
        let none = Table::new("logs", vec![Column::new("message", DataType::Text)]);
        let two = Table::new(
            "pairs",
            vec![
                Column::new("a", DataType::Uuid).primary_key(),
                Column::new("b", DataType::Uuid).primary_key(),
            ],
        );
        let report = validate(&schema_of(vec![none, two]));
        assert!(report.has_code(FindingCode::MissingPrimaryKey));
        assert!(report.has_code(FindingCode::MultiplePrimaryKeys));
    }

    #[test]
    fn test_join_table_allows_composite_key() {
        let table = Table::new(
            "order_tags",
            vec![
                Column::new("order_id", DataType::Uuid).primary_key(),
                Column::new("tag_id", DataType::Uuid).primary_key(),
            ],
        )
        .as_join_table();
        assert!(validate(&schema_of(vec![table])).is_valid);
    }

    #[test]
    fn test_nullable_primary_key() {
        let mut column = Column::new("id", DataType::Uuid).primary_key();
        column.nullable = true;
        let report = validate(&schema_of(vec![Table::new("things", vec![column])]));
        let finding = report
            .errors
            .iter()
            .find(|f| f.code == FindingCode::NullablePrimaryKey)
            .unwrap();
        assert!(finding.auto_fixable);
    }

    #[test]
    fn test_column_invariants() {
        let table = Table::new(
            "items",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("code", DataType::Char),
                Column::new("price", DataType::Numeric).with_precision(4, Some(6)),
                Column::new("shape", DataType::Other { name: "geometry".to_string() }),
            ],
        )
        .with_index(Index::new("idx_items_missing", vec!["missing".to_string()]));
        let report = validate(&schema_of(vec![table]));
        assert!(report.has_code(FindingCode::MissingLength));
        assert!(report.has_code(FindingCode::ScaleExceedsPrecision));
        assert!(report.has_code(FindingCode::UnsupportedType));
        assert!(report.has_code(FindingCode::UnknownIndexColumn));
    }

    #[test]
    fn test_naming_findings() {
        let table = Table::new(
            "select",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("First Name", DataType::Text),
                Column::new("a".repeat(64), DataType::Text),
            ],
        );
        let report = validate(&schema_of(vec![table]));
        assert!(report.has_code(FindingCode::ReservedWord));
        assert!(report.has_code(FindingCode::InvalidIdentifier));
        assert!(report.has_code(FindingCode::IdentifierTooLong));

        let invalid = report
            .errors
            .iter()
            .find(|f| f.code == FindingCode::InvalidIdentifier)
            .unwrap();
        assert_eq!(invalid.suggestion.as_deref(), Some("first_name"));
    }

    #[test]
    fn test_duplicates() {
        let table = Table::new(
            "customers",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("name", DataType::Text),
                Column::new("name", DataType::Text),
            ],
        );
        let report = validate(&schema_of(vec![table, customers()]));
        assert!(report.has_code(FindingCode::DuplicateColumn));
        assert!(report.has_code(FindingCode::DuplicateTable));
    }

    #[test]
    fn test_relationship_endpoints_and_types() {
        let orders = Table::new(
            "orders",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("customer_id", DataType::Integer),
            ],
        );
        let mut schema = schema_of(vec![customers(), orders]);
        schema.relationships.push(Relationship::new("orders", "customer_id", "customers", "id"));
        schema.relationships.push(Relationship::new("orders", "ghost_id", "ghosts", "id"));
        schema.relationships.push(
            Relationship::new("orders", "id", "customers", "email")
                .with_cardinality(Cardinality::OneToOne),
        );

        let report = validate(&schema);
        assert!(report.has_code(FindingCode::UnknownTable));
        assert!(report.has_code(FindingCode::UnknownColumn));
        assert!(report.has_code(FindingCode::OneToOneTargetNotUnique));
        assert_eq!(report.count(FindingCode::ForeignKeyTypeMismatch), 2);
        assert!(report.warnings.iter().all(|f| f.code == FindingCode::ForeignKeyTypeMismatch));
    }

    #[test]
    fn test_cycle_detected_and_self_reference() {
        let a = Table::new(
            "a",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("b_id", DataType::Uuid).references("b", "id"),
                Column::new("parent_id", DataType::Uuid).references("a", "id"),
            ],
        );
        let b = Table::new(
            "b",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("a_id", DataType::Uuid).references("a", "id"),
            ],
        );
        let report = validate(&schema_of(vec![a, b]));
        assert_eq!(report.count(FindingCode::CycleDetected), 1);
        assert_eq!(report.count(FindingCode::SelfReference), 1);
        assert!(!report.is_valid);
        assert!(report.errors.iter().all(|f| f.code == FindingCode::CycleDetected));
    }

    #[test]
    fn test_policy_checks() {
        let mut schema = schema_of(vec![customers()]);
        let mut bad_insert = AccessPolicy::insert("customers", "ins", "true");
        bad_insert.using = Some("true".to_string());
        schema.policies = vec![
            bad_insert,
            AccessPolicy::select("missing", "read", "true"),
            AccessPolicy::select("customers", "read_all", "true"),
            AccessPolicy::select("customers", "read_all", "true"),
        ];
        let report = validate(&schema);
        assert!(report.has_code(FindingCode::InvalidPolicyShape));
        assert!(report.has_code(FindingCode::UnknownPolicyTable));
        assert_eq!(report.count(FindingCode::DuplicatePolicy), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = schema_of(vec![customers()]);
        let before = schema.clone();
        assert_eq!(validate(&schema), validate(&schema));
        assert_eq!(schema, before);
    }
}
