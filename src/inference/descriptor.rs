//! Input descriptors: headers, sampled rows and per-column counts

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::InferenceResult;
use crate::validation::input::to_snake_identifier;

/// Aggregate counts for one column, computed over the whole file by the
/// producer of the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnStats {
    pub null_count: usize,
    pub empty_count: usize,
    /// Deduplicated sample values
    pub sample_values: Vec<String>,
}

/// A tabular file as seen by the inference engine.
///
/// Cells are `None` for nulls and `Some("")` for empty strings; the two are
/// counted separately.
///
/// # Example
///
/// ```rust
/// use schema_forge::inference::FileDescriptor;
///
/// let json = r#"{
///     "fileName": "customers.csv",
///     "headers": ["id", "email"],
///     "rows": [["1", "a@b.com"], ["2", null]],
///     "totalRows": 2
/// }"#;
/// let descriptor = FileDescriptor::from_json_str(json).unwrap();
/// assert_eq!(descriptor.table_name(), "customers");
/// assert_eq!(descriptor.column_values(1, 0), vec![Some("a@b.com"), None]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub file_name: String,
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Option<String>>>,
    /// Rows in the full file; defaults to the number of sampled rows
    #[serde(default)]
    pub total_rows: usize,
    /// Per-column counts, parallel to `headers` when present
    #[serde(default)]
    pub column_stats: Vec<ColumnStats>,
}

impl FileDescriptor {
    pub fn new(file_name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            file_name: file_name.into(),
            headers,
            ..Default::default()
        }
    }

    /// Append a sampled row; `None` cells are nulls.
    pub fn with_row<S: AsRef<str>>(mut self, cells: &[Option<S>]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|c| c.as_ref().map(|s| s.as_ref().to_string()))
                .collect(),
        );
        self
    }

    pub fn with_total_rows(mut self, total: usize) -> Self {
        self.total_rows = total;
        self
    }

    pub fn with_column_stats(mut self, stats: Vec<ColumnStats>) -> Self {
        self.column_stats = stats;
        self
    }

    pub fn from_json_str(json: &str) -> InferenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> InferenceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Table name derived from the file name without its extension.
    pub fn table_name(&self) -> String {
        let base = Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.file_name.as_str());
        let name = to_snake_identifier(base);
        if name.is_empty() {
            "imported_table".to_string()
        } else {
            name
        }
    }

    /// Rows in the full file, never fewer than were sampled.
    pub fn total_count(&self) -> usize {
        self.total_rows.max(self.rows.len())
    }

    /// Values of one column over the first `limit` rows (0 = all). Cells
    /// missing from short rows read as null. Without sampled rows the
    /// descriptor's sample values are used.
    pub fn column_values(&self, index: usize, limit: usize) -> Vec<Option<&str>> {
        if self.rows.is_empty() {
            return self
                .column_stats
                .get(index)
                .map(|s| s.sample_values.iter().map(|v| Some(v.as_str())).collect())
                .unwrap_or_default();
        }

        let take = if limit == 0 { self.rows.len() } else { limit };
        self.rows
            .iter()
            .take(take)
            .map(|row| row.get(index).and_then(|c| c.as_deref()))
            .collect()
    }

    pub fn stats(&self, index: usize) -> Option<&ColumnStats> {
        self.column_stats.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_from_file() {
        let d = FileDescriptor::new("Customer Orders.csv", vec![]);
        assert_eq!(d.table_name(), "customer_orders");
        let d = FileDescriptor::new("???.csv", vec![]);
        assert_eq!(d.table_name(), "imported_table");
    }

    #[test]
    fn test_short_rows_read_as_null() {
        let d = FileDescriptor::new("t.csv", vec!["a".into(), "b".into()])
            .with_row(&[Some("1"), Some("x")])
            .with_row(&[Some("2")]);
        assert_eq!(d.column_values(1, 0), vec![Some("x"), None]);
        assert_eq!(d.column_values(0, 1), vec![Some("1")]);
    }

    #[test]
    fn test_sample_values_without_rows() {
        let d = FileDescriptor::new("t.csv", vec!["a".into()]).with_column_stats(vec![ColumnStats {
            null_count: 3,
            empty_count: 0,
            sample_values: vec!["x".into(), "y".into()],
        }]);
        assert_eq!(d.column_values(0, 0), vec![Some("x"), Some("y")]);
    }

    #[test]
    fn test_total_count_never_below_samples() {
        let d = FileDescriptor::new("t.csv", vec!["a".into()])
            .with_row(&[Some("1")])
            .with_row(&[Some("2")]);
        assert_eq!(d.total_count(), 2);
        assert_eq!(d.with_total_rows(100).total_count(), 100);
    }
}
