//! Statement tree for PostgreSQL DDL

use crate::models::{IndexMethod, PolicyOperation, ReferentialAction};

/// Schema-qualified object name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Rendered type, e.g. `NUMERIC(10,2)`
    pub sql_type: String,
    /// Inline `PRIMARY KEY`
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub checks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub name: QualifiedName,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    /// Table-level key, set only for composite keys
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForeignKey {
    pub table: QualifiedName,
    pub constraint: String,
    pub column: String,
    pub references: QualifiedName,
    pub referenced_column: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    pub name: String,
    pub table: QualifiedName,
    pub columns: Vec<String>,
    pub unique: bool,
    pub method: Option<IndexMethod>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePolicy {
    pub name: String,
    pub table: QualifiedName,
    pub operation: PolicyOperation,
    /// Empty renders as `public`
    pub roles: Vec<String>,
    pub using: Option<String>,
    pub with_check: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateEnum {
        name: QualifiedName,
        values: Vec<String>,
    },
    CreateTable(CreateTable),
    AddForeignKey(AddForeignKey),
    CreateIndex(CreateIndex),
    EnableRls(QualifiedName),
    CreatePolicy(CreatePolicy),
    CommentOnTable {
        table: QualifiedName,
        comment: String,
    },
    CommentOnColumn {
        table: QualifiedName,
        column: String,
        comment: String,
    },
    DropTable(QualifiedName),
    DropType(QualifiedName),
}
