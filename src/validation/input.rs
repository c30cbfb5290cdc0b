//! Identifier rules shared by inference, validation and the schema model.
//!
//! An identifier starts with a letter, contains only ASCII letters, digits
//! and underscores, is at most 63 characters long (the PostgreSQL limit),
//! and is not a reserved word.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum identifier length (PostgreSQL NAMEDATALEN - 1)
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Words that cannot be used as unquoted identifiers
const RESERVED_WORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "binary",
    "both",
    "case",
    "cast",
    "check",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "false",
    "fetch",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "group",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "intersect",
    "into",
    "is",
    "isnull",
    "join",
    "lateral",
    "leading",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "natural",
    "not",
    "notnull",
    "null",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "outer",
    "overlaps",
    "placing",
    "primary",
    "references",
    "returning",
    "right",
    "select",
    "session_user",
    "similar",
    "some",
    "symmetric",
    "table",
    "tablesample",
    "then",
    "to",
    "trailing",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
];

/// Errors that can occur during identifier validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Identifier is empty
    #[error("identifier cannot be empty")]
    Empty,

    /// Identifier exceeds the maximum length
    #[error("identifier exceeds maximum length (max: {max}, got: {actual})")]
    TooLong { max: usize, actual: usize },

    /// Identifier does not start with a letter
    #[error("identifier must start with a letter: '{0}'")]
    InvalidStart(String),

    /// Identifier contains characters outside [A-Za-z0-9_]
    #[error("identifier contains invalid character '{character}': '{identifier}'")]
    InvalidCharacters { identifier: String, character: char },

    /// Identifier is a reserved word
    #[error("identifier is a reserved word: '{0}'")]
    ReservedWord(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a table or column identifier.
///
/// # Examples
///
/// ```
/// use schema_forge::validation::input::validate_identifier;
///
/// assert!(validate_identifier("user_orders").is_ok());
/// assert!(validate_identifier("").is_err());
/// assert!(validate_identifier("1st_place").is_err());
/// assert!(validate_identifier("select").is_err());
/// ```
pub fn validate_identifier(name: &str) -> ValidationResult<()> {
    let first = name.chars().next().ok_or(ValidationError::Empty)?;

    let length = name.chars().count();
    if length > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            max: MAX_IDENTIFIER_LENGTH,
            actual: length,
        });
    }

    if !first.is_ascii_alphabetic() {
        return Err(ValidationError::InvalidStart(name.to_string()));
    }

    if let Some(character) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
    {
        return Err(ValidationError::InvalidCharacters {
            identifier: name.to_string(),
            character,
        });
    }

    if is_reserved_word(name) {
        return Err(ValidationError::ReservedWord(name.to_string()));
    }

    Ok(())
}

pub fn is_reserved_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

/// Turn arbitrary text into a lowercase snake_case identifier.
///
/// Non-alphanumeric runs collapse into one underscore, camelCase boundaries
/// split, a leading digit gets a `c_` prefix, reserved words get a `_col`
/// suffix, and the result is truncated to [`MAX_IDENTIFIER_LENGTH`].
/// Returns an empty string when nothing usable remains.
pub fn to_snake_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_lower_or_digit = false;

    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower_or_digit && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
        }
    }

    let mut out = out.trim_matches('_').to_string();
    if out.is_empty() {
        return out;
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out = format!("c_{}", out);
    }
    if is_reserved_word(&out) {
        out.push_str("_col");
    }
    truncate_identifier(&out)
}

/// Truncate to the identifier limit without leaving a trailing underscore.
pub fn truncate_identifier(name: &str) -> String {
    if name.len() <= MAX_IDENTIFIER_LENGTH {
        return name.to_string();
    }
    name[..MAX_IDENTIFIER_LENGTH].trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_edge_cases() {
        let max_name = "a".repeat(63);
        assert!(validate_identifier(&max_name).is_ok());

        let too_long = "a".repeat(64);
        assert!(matches!(
            validate_identifier(&too_long),
            Err(ValidationError::TooLong { max: 63, actual: 64 })
        ));

        assert!(matches!(
            validate_identifier("_private"),
            Err(ValidationError::InvalidStart(_))
        ));
        assert!(matches!(
            validate_identifier("my-table"),
            Err(ValidationError::InvalidCharacters { character: '-', .. })
        ));
        assert!(matches!(
            validate_identifier("Order"),
            Err(ValidationError::ReservedWord(_))
        ));
    }

    #[test]
    fn test_common_column_names_are_allowed() {
        for name in ["date", "time", "text", "name", "status", "amount"] {
            assert!(validate_identifier(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_to_snake_identifier() {
        assert_eq!(to_snake_identifier("First Name"), "first_name");
        assert_eq!(to_snake_identifier("customerID"), "customer_id");
        assert_eq!(to_snake_identifier("  Total ($) "), "total");
        assert_eq!(to_snake_identifier("2024 sales"), "c_2024_sales");
        assert_eq!(to_snake_identifier("order"), "order_col");
        assert_eq!(to_snake_identifier("***"), "");
    }

    #[test]
    fn test_truncate_identifier() {
        let long = format!("{}_{}", "a".repeat(62), "b".repeat(10));
        let truncated = truncate_identifier(&long);
        assert_eq!(truncated.len(), 62);
        assert!(!truncated.ends_with('_'));
    }
}
