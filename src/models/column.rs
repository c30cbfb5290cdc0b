//! Column model

use serde::{Deserialize, Serialize};

use super::enums::{DataType, ReferentialAction};

/// Column-level constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Constraint {
    PrimaryKey,
    ForeignKey {
        table: String,
        column: String,
        #[serde(default, rename = "onDelete")]
        on_delete: ReferentialAction,
        #[serde(default, rename = "onUpdate")]
        on_update: ReferentialAction,
    },
    Unique,
    NotNull,
    Default {
        expression: String,
    },
    Check {
        expression: String,
    },
}

/// Column model representing a field in a table
///
/// Constraints are typed from the start; DEFAULT and CHECK expressions are
/// kept verbatim and never re-interpreted.
///
/// # Example
///
/// ```rust
/// use schema_forge::models::{Column, DataType};
///
/// let column = Column::new("email", DataType::Varchar)
///     .with_length(255)
///     .not_null()
///     .unique();
/// assert!(column.is_unique());
/// assert!(!column.is_nullable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Raw header this column was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Create a nullable column without constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            length: None,
            precision: None,
            scale: None,
            default: None,
            constraints: Vec::new(),
            comment: None,
            source_column: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as primary key; primary keys are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.nullable = false;
        self.push_constraint(Constraint::PrimaryKey);
        self
    }

    pub fn unique(mut self) -> Self {
        self.push_constraint(Constraint::Unique);
        self
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    pub fn with_check(mut self, expression: impl Into<String>) -> Self {
        self.push_constraint(Constraint::Check {
            expression: expression.into(),
        });
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.push_constraint(Constraint::ForeignKey {
            table: table.into(),
            column: column.into(),
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        });
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn from_source(mut self, raw_name: impl Into<String>) -> Self {
        self.source_column = Some(raw_name.into());
        self
    }

    fn push_constraint(&mut self, constraint: Constraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&Constraint::PrimaryKey)
    }

    /// UNIQUE or PRIMARY KEY
    pub fn is_unique(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Unique | Constraint::PrimaryKey))
    }

    /// Effective nullability: the flag, narrowed by NOT NULL and PRIMARY KEY.
    pub fn is_nullable(&self) -> bool {
        self.nullable
            && !self
                .constraints
                .iter()
                .any(|c| matches!(c, Constraint::NotNull | Constraint::PrimaryKey))
    }

    /// The default expression, from the field or a DEFAULT constraint.
    pub fn default_expression(&self) -> Option<&str> {
        self.default.as_deref().or_else(|| {
            self.constraints.iter().find_map(|c| match c {
                Constraint::Default { expression } => Some(expression.as_str()),
                _ => None,
            })
        })
    }

    pub fn has_default(&self) -> bool {
        self.default_expression().is_some()
    }

    pub fn check_expressions(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Check { expression } => Some(expression.as_str()),
            _ => None,
        })
    }

    /// Column-level FOREIGN KEY constraint, if any
    pub fn foreign_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| matches!(c, Constraint::ForeignKey { .. }))
    }
}
