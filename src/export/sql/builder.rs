//! Builds the DDL statement tree for a schema

use std::collections::HashSet;

use tracing::{debug, warn};

use super::ast::{
    AddForeignKey, ColumnDef, CreateIndex, CreatePolicy, CreateTable, QualifiedName, Statement,
};
use super::types::column_type;
use crate::export::{ExportError, ExportOptions, ExportResult};
use crate::models::{AccessPolicy, DataType, PolicyOperation, Schema, Table};
use crate::resolver::dependency_order;

const DENY: &str = "false";

pub struct SqlBuilder<'a> {
    schema: &'a Schema,
    options: &'a ExportOptions,
    /// Tables in creation order
    ordered: Vec<&'a Table>,
}

impl<'a> SqlBuilder<'a> {
    pub fn new(schema: &'a Schema, options: &'a ExportOptions) -> Self {
        let order = dependency_order(schema);
        if order.has_cycles() {
            warn!(
                "Schema '{}' has {} dependency cycle(s); foreign keys are still added after all tables",
                schema.name,
                order.cycles.len()
            );
        }
        let ordered = order
            .order
            .iter()
            .filter_map(|name| schema.table(name))
            .collect();
        Self {
            schema,
            options,
            ordered,
        }
    }

    fn name(&self, table: &str) -> QualifiedName {
        QualifiedName::new(self.options.schema.clone(), table)
    }

    /// Forward statements: enums, tables, foreign keys, indexes, row-level
    /// security, comments.
    pub fn statements(&self) -> ExportResult<Vec<Statement>> {
        let mut statements = self.enums();

        for table in &self.ordered {
            statements.push(Statement::CreateTable(self.create_table(table)?));
        }
        statements.extend(self.foreign_keys()?);
        if self.options.include_indexes {
            statements.extend(self.indexes());
        }
        if self.options.include_rls {
            statements.extend(self.policies()?);
        }
        if self.options.include_comments {
            statements.extend(self.comments());
        }

        debug!(
            "Built {} statement(s) for {} table(s)",
            statements.len(),
            self.ordered.len()
        );
        Ok(statements)
    }

    /// Rollback statements: tables in reverse creation order, then types.
    pub fn down_statements(&self) -> Vec<Statement> {
        let mut statements: Vec<Statement> = self
            .ordered
            .iter()
            .rev()
            .map(|t| Statement::DropTable(self.name(&t.name)))
            .collect();
        statements.extend(self.enums().into_iter().rev().filter_map(|s| match s {
            Statement::CreateEnum { name, .. } => Some(Statement::DropType(name)),
            _ => None,
        }));
        statements
    }

    fn enums(&self) -> Vec<Statement> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut statements = Vec::new();

        for table in &self.schema.tables {
            for column in &table.columns {
                let mut data_type = &column.data_type;
                while let DataType::Array { element } = data_type {
                    data_type = element;
                }
                if let DataType::Enum { name, values } = data_type {
                    if seen.insert(name.clone()) {
                        statements.push(Statement::CreateEnum {
                            name: self.name(name),
                            values: values.clone(),
                        });
                    } else {
                        debug!(
                            "Enum '{}' already declared, reusing it for {}.{}",
                            name, table.name, column.name
                        );
                    }
                }
            }
        }
        statements
    }

    fn create_table(&self, table: &Table) -> ExportResult<CreateTable> {
        let composite = table.primary_key_columns().len() > 1;
        let mut columns = Vec::with_capacity(table.columns.len());

        for column in &table.columns {
            columns.push(ColumnDef {
                name: column.name.clone(),
                sql_type: column_type(column, &table.name, &self.options.schema)?,
                primary_key: column.is_primary_key() && !composite,
                not_null: !column.is_nullable(),
                unique: column.is_unique() && !column.is_primary_key(),
                default: column.default_expression().map(str::to_string),
                checks: column.check_expressions().map(str::to_string).collect(),
            });
        }

        let primary_key = if composite {
            table
                .primary_key_columns()
                .iter()
                .map(|c| c.name.clone())
                .collect()
        } else {
            Vec::new()
        };

        Ok(CreateTable {
            name: self.name(&table.name),
            if_not_exists: self.options.if_not_exists,
            columns,
            primary_key,
        })
    }

    fn foreign_keys(&self) -> ExportResult<Vec<Statement>> {
        let position = |table: &str| {
            self.ordered
                .iter()
                .position(|t| t.name == table)
                .unwrap_or(usize::MAX)
        };

        let mut keys = self.schema.foreign_keys();
        for key in &keys {
            for (table, column) in [
                (&key.source_table, &key.source_column),
                (&key.target_table, &key.target_column),
            ] {
                let exists = self
                    .schema
                    .table(table)
                    .is_some_and(|t| t.has_column(column));
                if !exists {
                    return Err(ExportError::InvalidReference(format!(
                        "relationship '{}' points at missing column {}.{}",
                        key.name, table, column
                    )));
                }
            }
        }
        keys.sort_by_key(|k| position(&k.source_table));

        Ok(keys
            .into_iter()
            .map(|key| {
                Statement::AddForeignKey(AddForeignKey {
                    table: self.name(&key.source_table),
                    constraint: key.name,
                    column: key.source_column,
                    references: self.name(&key.target_table),
                    referenced_column: key.target_column,
                    on_delete: key.on_delete,
                    on_update: key.on_update,
                })
            })
            .collect())
    }

    fn indexes(&self) -> Vec<Statement> {
        self.ordered
            .iter()
            .flat_map(|table| {
                table.indexes.iter().map(|index| {
                    Statement::CreateIndex(CreateIndex {
                        name: index.name.clone(),
                        table: self.name(&table.name),
                        columns: index.columns.clone(),
                        unique: index.unique,
                        method: index.method,
                        if_not_exists: self.options.if_not_exists,
                    })
                })
            })
            .collect()
    }

    fn policies(&self) -> ExportResult<Vec<Statement>> {
        if let Some(orphan) = self
            .schema
            .policies
            .iter()
            .find(|p| self.schema.table(&p.table).is_none())
        {
            return Err(ExportError::InvalidReference(format!(
                "policy '{}' targets missing table '{}'",
                orphan.name, orphan.table
            )));
        }

        let mut statements = Vec::new();
        for table in &self.ordered {
            let policies: Vec<&AccessPolicy> = self
                .schema
                .policies
                .iter()
                .filter(|p| p.table == table.name)
                .collect();
            if policies.is_empty() {
                continue;
            }

            statements.push(Statement::EnableRls(self.name(&table.name)));
            for policy in policies {
                statements.push(Statement::CreatePolicy(self.policy(policy)));
            }
        }
        Ok(statements)
    }

    /// The operation decides which clauses are rendered, whatever the policy
    /// carries.
    fn policy(&self, policy: &AccessPolicy) -> CreatePolicy {
        let using = policy.using.clone().unwrap_or_else(|| DENY.to_string());
        let (using, with_check) = match policy.operation {
            PolicyOperation::Select | PolicyOperation::Delete => (Some(using), None),
            PolicyOperation::Insert => (
                None,
                Some(
                    policy
                        .with_check
                        .clone()
                        .unwrap_or_else(|| DENY.to_string()),
                ),
            ),
            PolicyOperation::Update => {
                let check = policy.with_check.clone().unwrap_or_else(|| using.clone());
                (Some(using), Some(check))
            }
        };

        CreatePolicy {
            name: policy.name.clone(),
            table: self.name(&policy.table),
            operation: policy.operation,
            roles: policy.roles.clone(),
            using,
            with_check,
        }
    }

    fn comments(&self) -> Vec<Statement> {
        let mut statements = Vec::new();
        for table in &self.ordered {
            if let Some(comment) = &table.comment {
                statements.push(Statement::CommentOnTable {
                    table: self.name(&table.name),
                    comment: comment.clone(),
                });
            }
            for column in &table.columns {
                if let Some(comment) = &column.comment {
                    statements.push(Statement::CommentOnColumn {
                        table: self.name(&table.name),
                        column: column.name.clone(),
                        comment: comment.clone(),
                    });
                }
            }
        }
        statements
    }
}
