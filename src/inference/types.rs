//! Inference results

use serde::{Deserialize, Serialize};

use super::formats::Format;
use crate::models::{Column, DataType, Table};
use crate::validation::{Finding, Severity};

/// Statistics gathered while inferring one column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStatistics {
    /// Rows in the full file
    pub total_count: usize,
    /// Sampled cells inspected
    pub sample_count: usize,
    pub null_count: usize,
    pub empty_count: usize,
    /// Distinct non-empty sampled values
    pub distinct_count: usize,
    /// Longest non-empty sampled value, in characters
    pub max_length: usize,
    /// `null_count / total_count`
    pub null_ratio: f64,
    /// `distinct_count / non-empty samples`
    pub uniqueness_ratio: f64,
}

/// Best-fit type and statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredColumn {
    /// Normalized identifier
    pub name: String,
    /// Header as it appeared in the file
    pub source_name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    pub stats: ColumnStatistics,
}

impl InferredColumn {
    /// Model column carrying the inferred type, modifiers and nullability.
    pub fn to_column(&self) -> Column {
        let mut column = Column::new(self.name.clone(), self.data_type.clone());
        column.length = self.length;
        column.precision = self.precision;
        column.scale = self.scale;
        column.nullable = self.nullable;
        if self.source_name != self.name {
            column = column.from_source(self.source_name.clone());
        }
        column
    }
}

/// Raw header and the identifier it was normalized to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMapping {
    pub raw: String,
    pub normalized: String,
}

/// Everything inferred from one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInference {
    pub file_name: String,
    pub table_name: String,
    pub columns: Vec<InferredColumn>,
    pub findings: Vec<Finding>,
    pub header_mapping: Vec<HeaderMapping>,
}

impl FileInference {
    /// Draft table with the inferred columns in file order. No key is added.
    pub fn to_table(&self) -> Table {
        Table::new(
            self.table_name.clone(),
            self.columns.iter().map(InferredColumn::to_column).collect(),
        )
    }

    pub fn column(&self, name: &str) -> Option<&InferredColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}
