//! Typed findings shared by structural checks and schema validation

use serde::{Deserialize, Serialize};

/// How serious a finding is. Only `Error` makes a report invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Machine-readable finding code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    // Structural (tabular samples)
    EmptyHeader,
    DuplicateHeader,
    ReservedHeader,
    HeaderTooLong,
    InvalidHeader,
    EmptyRow,
    AllNullColumn,
    RowWidthMismatch,

    // Naming
    InvalidIdentifier,
    IdentifierTooLong,
    ReservedWord,
    DuplicateTable,
    DuplicateColumn,

    // Keys and columns
    MissingPrimaryKey,
    MultiplePrimaryKeys,
    NullablePrimaryKey,
    PrimaryKeyNotUuid,
    MissingLength,
    ScaleExceedsPrecision,
    UnsupportedType,
    UnknownIndexColumn,

    // Relationships
    UnknownTable,
    UnknownColumn,
    OneToOneTargetNotUnique,
    ForeignKeyTypeMismatch,
    CycleDetected,
    SelfReference,

    // Access policies
    UnknownPolicyTable,
    InvalidPolicyShape,
    DuplicatePolicy,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::EmptyHeader => "EMPTY_HEADER",
            FindingCode::DuplicateHeader => "DUPLICATE_HEADER",
            FindingCode::ReservedHeader => "RESERVED_HEADER",
            FindingCode::HeaderTooLong => "HEADER_TOO_LONG",
            FindingCode::InvalidHeader => "INVALID_HEADER",
            FindingCode::EmptyRow => "EMPTY_ROW",
            FindingCode::AllNullColumn => "ALL_NULL_COLUMN",
            FindingCode::RowWidthMismatch => "ROW_WIDTH_MISMATCH",
            FindingCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            FindingCode::IdentifierTooLong => "IDENTIFIER_TOO_LONG",
            FindingCode::ReservedWord => "RESERVED_WORD",
            FindingCode::DuplicateTable => "DUPLICATE_TABLE",
            FindingCode::DuplicateColumn => "DUPLICATE_COLUMN",
            FindingCode::MissingPrimaryKey => "MISSING_PRIMARY_KEY",
            FindingCode::MultiplePrimaryKeys => "MULTIPLE_PRIMARY_KEYS",
            FindingCode::NullablePrimaryKey => "NULLABLE_PRIMARY_KEY",
            FindingCode::PrimaryKeyNotUuid => "PRIMARY_KEY_NOT_UUID",
            FindingCode::MissingLength => "MISSING_LENGTH",
            FindingCode::ScaleExceedsPrecision => "SCALE_EXCEEDS_PRECISION",
            FindingCode::UnsupportedType => "UNSUPPORTED_TYPE",
            FindingCode::UnknownIndexColumn => "UNKNOWN_INDEX_COLUMN",
            FindingCode::UnknownTable => "UNKNOWN_TABLE",
            FindingCode::UnknownColumn => "UNKNOWN_COLUMN",
            FindingCode::OneToOneTargetNotUnique => "ONE_TO_ONE_TARGET_NOT_UNIQUE",
            FindingCode::ForeignKeyTypeMismatch => "FOREIGN_KEY_TYPE_MISMATCH",
            FindingCode::CycleDetected => "CYCLE_DETECTED",
            FindingCode::SelfReference => "SELF_REFERENCE",
            FindingCode::UnknownPolicyTable => "UNKNOWN_POLICY_TABLE",
            FindingCode::InvalidPolicyShape => "INVALID_POLICY_SHAPE",
            FindingCode::DuplicatePolicy => "DUPLICATE_POLICY",
        }
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reportable observation. Findings are never fatal on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Suggested fix, e.g. the normalized header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub auto_fixable: bool,
}

impl Finding {
    pub fn new(code: FindingCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            table: None,
            column: None,
            suggestion: None,
            auto_fixable: false,
        }
    }

    pub fn error(code: FindingCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: FindingCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: FindingCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn at_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn at_column(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self.column = Some(column.into());
        self
    }

    /// Attach a fix that can be applied without asking the user.
    pub fn with_fix(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self.auto_fixable = true;
        self
    }

    /// Attach a hint that needs a human decision.
    pub fn with_hint(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self.auto_fixable = false;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        match (&self.table, &self.column) {
            (Some(table), Some(column)) => write!(f, " ({}.{})", table, column),
            (Some(table), None) => write!(f, " ({})", table),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&FindingCode::PrimaryKeyNotUuid).unwrap();
        assert_eq!(json, "\"PRIMARY_KEY_NOT_UUID\"");
        assert_eq!(FindingCode::CycleDetected.as_str(), "CYCLE_DETECTED");
    }

    #[test]
    fn test_display_includes_location() {
        let finding = Finding::error(FindingCode::NullablePrimaryKey, "primary key is nullable")
            .at_column("orders", "id");
        assert_eq!(
            finding.to_string(),
            "[NULLABLE_PRIMARY_KEY] primary key is nullable (orders.id)"
        );
    }

    #[test]
    fn test_with_fix_marks_auto_fixable() {
        let finding =
            Finding::warning(FindingCode::ReservedHeader, "reserved").with_fix("order_col");
        assert!(finding.auto_fixable);
        assert_eq!(finding.suggestion.as_deref(), Some("order_col"));

        let finding = finding.with_hint("rename it");
        assert!(!finding.auto_fixable);
    }
}
