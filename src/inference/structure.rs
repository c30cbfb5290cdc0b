//! Structural checks on headers and rows, and header normalization

use std::collections::{HashMap, HashSet};

use super::descriptor::FileDescriptor;
use super::types::HeaderMapping;
use crate::validation::input::{
    MAX_IDENTIFIER_LENGTH, ValidationError, is_reserved_word, to_snake_identifier,
    truncate_identifier, validate_identifier,
};
use crate::validation::{Finding, FindingCode};

/// Rewrite headers into unique identifiers.
///
/// Empty headers become `column_<n>` (1-based), everything is lowercased into
/// snake_case, reserved words get a `_col` suffix, long names are truncated
/// to 63 characters, and repeats get `_2`, `_3`, ... appended.
///
/// ```rust
/// use schema_forge::inference::normalize_headers;
///
/// let headers: Vec<String> = vec!["Name".into(), "".into(), "name".into(), "order".into()];
/// let normalized: Vec<String> = normalize_headers(&headers)
///     .into_iter()
///     .map(|m| m.normalized)
///     .collect();
/// assert_eq!(normalized, vec!["name", "column_2", "name_2", "order_col"]);
/// ```
pub fn normalize_headers(headers: &[String]) -> Vec<HeaderMapping> {
    let mut used: HashSet<String> = HashSet::new();
    let mut mappings = Vec::with_capacity(headers.len());

    for (index, raw) in headers.iter().enumerate() {
        let mut base = to_snake_identifier(raw);
        if base.is_empty() {
            base = format!("column_{}", index + 1);
        }

        let mut candidate = base.clone();
        let mut n = 2;
        while used.contains(&candidate) {
            let suffix = format!("_{}", n);
            let keep = base.len().min(MAX_IDENTIFIER_LENGTH - suffix.len());
            let stem = truncate_identifier(&base[..keep]);
            candidate = format!("{}{}", stem, suffix);
            n += 1;
        }

        used.insert(candidate.clone());
        mappings.push(HeaderMapping {
            raw: raw.clone(),
            normalized: candidate,
        });
    }

    mappings
}

/// Run the header and row checks for one descriptor.
pub fn check_structure(descriptor: &FileDescriptor, table: &str) -> Vec<Finding> {
    let mut findings = check_headers(&descriptor.headers, table);
    findings.extend(check_rows(descriptor, table));
    findings
}

fn check_headers(headers: &[String], table: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let normalized = normalize_headers(headers);
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for (index, (raw, mapping)) in headers.iter().zip(&normalized).enumerate() {
        let trimmed = raw.trim();
        let position = index + 1;

        if trimmed.is_empty() {
            findings.push(
                Finding::warning(
                    FindingCode::EmptyHeader,
                    format!("column {} has an empty header", position),
                )
                .at_table(table)
                .with_fix(&mapping.normalized),
            );
            continue;
        }

        let key = trimmed.to_lowercase();
        if let Some(first) = first_seen.get(&key) {
            findings.push(
                Finding::error(
                    FindingCode::DuplicateHeader,
                    format!(
                        "header '{}' in column {} repeats column {}",
                        trimmed, position, first
                    ),
                )
                .at_column(table, raw)
                .with_fix(&mapping.normalized),
            );
        } else {
            first_seen.insert(key, position);
        }

        if trimmed.chars().count() > MAX_IDENTIFIER_LENGTH {
            findings.push(
                Finding::warning(
                    FindingCode::HeaderTooLong,
                    format!(
                        "header in column {} is {} characters, limit is {}",
                        position,
                        trimmed.chars().count(),
                        MAX_IDENTIFIER_LENGTH
                    ),
                )
                .at_column(table, raw)
                .with_fix(&mapping.normalized),
            );
        }

        if is_reserved_word(trimmed) {
            findings.push(
                Finding::warning(
                    FindingCode::ReservedHeader,
                    format!("header '{}' is a reserved word", trimmed),
                )
                .at_column(table, raw)
                .with_fix(&mapping.normalized),
            );
        } else if matches!(
            validate_identifier(trimmed),
            Err(ValidationError::InvalidStart(_) | ValidationError::InvalidCharacters { .. })
        ) {
            findings.push(
                Finding::info(
                    FindingCode::InvalidHeader,
                    format!("header '{}' is not a plain identifier", trimmed),
                )
                .at_column(table, raw)
                .with_fix(&mapping.normalized),
            );
        }
    }

    findings
}

fn check_rows(descriptor: &FileDescriptor, table: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let width = descriptor.headers.len();

    for (index, row) in descriptor.rows.iter().enumerate() {
        let row_number = index + 1;

        if row
            .iter()
            .all(|cell| cell.as_deref().is_none_or(|v| v.trim().is_empty()))
        {
            findings.push(
                Finding::info(FindingCode::EmptyRow, format!("row {} is empty", row_number))
                    .at_table(table),
            );
            continue;
        }

        if row.len() != width {
            findings.push(
                Finding::warning(
                    FindingCode::RowWidthMismatch,
                    format!(
                        "row {} has {} cells, expected {}",
                        row_number,
                        row.len(),
                        width
                    ),
                )
                .at_table(table),
            );
        }
    }

    if !descriptor.column_stats.is_empty() && descriptor.column_stats.len() != width {
        findings.push(
            Finding::warning(
                FindingCode::RowWidthMismatch,
                format!(
                    "column statistics cover {} columns, expected {}",
                    descriptor.column_stats.len(),
                    width
                ),
            )
            .at_table(table),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn codes(findings: &[Finding]) -> Vec<FindingCode> {
        findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_normalize_long_and_duplicate() {
        let long = "x".repeat(70);
        let mappings = normalize_headers(&headers(&[&long, &long]));
        assert_eq!(mappings[0].normalized.len(), 63);
        assert_eq!(mappings[1].normalized.len(), 63);
        assert!(mappings[1].normalized.ends_with("_2"));
        assert_ne!(mappings[0].normalized, mappings[1].normalized);
    }

    #[test]
    fn test_normalize_third_duplicate() {
        let mappings = normalize_headers(&headers(&["a", "A", "a "]));
        let names: Vec<&str> = mappings.iter().map(|m| m.normalized.as_str()).collect();
        assert_eq!(names, vec!["a", "a_2", "a_3"]);
    }

    #[test]
    fn test_header_findings() {
        let long = "y".repeat(64);
        let findings = check_headers(
            &headers(&["id", "", "Email", "email", "select", &long, "Unit Price"]),
            "t",
        );
        assert_eq!(
            codes(&findings),
            vec![
                FindingCode::EmptyHeader,
                FindingCode::DuplicateHeader,
                FindingCode::ReservedHeader,
                FindingCode::HeaderTooLong,
                FindingCode::InvalidHeader,
            ]
        );
        assert!(findings.iter().all(|f| f.auto_fixable));
        assert_eq!(findings[0].suggestion.as_deref(), Some("column_2"));
        assert_eq!(findings[2].suggestion.as_deref(), Some("select_col"));
    }

    #[test]
    fn test_row_findings() {
        let descriptor = FileDescriptor::new("t.csv", headers(&["a", "b"]))
            .with_row(&[Some("1"), Some("2")])
            .with_row(&[None, Some("  ")])
            .with_row(&[Some("1"), Some("2"), Some("3")]);
        let findings = check_rows(&descriptor, "t");
        assert_eq!(
            codes(&findings),
            vec![FindingCode::EmptyRow, FindingCode::RowWidthMismatch]
        );
        assert!(findings[0].message.contains("row 2"));
    }
}
