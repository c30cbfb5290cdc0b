//! Column type inference

use std::collections::HashSet;

use tracing::debug;

use super::config::InferenceConfig;
use super::descriptor::FileDescriptor;
use super::error::{InferenceError, InferenceResult};
use super::formats::{
    Format, IntegerValue, TemporalKind, decimal_shape, is_boolean_token, is_email,
    is_exponent_number, is_json_document, is_url, is_uuid, merge_temporal, parse_integer,
    temporal_kind,
};
use super::structure::{check_structure, normalize_headers};
use super::types::{ColumnStatistics, FileInference, InferredColumn};
use crate::models::DataType;
use crate::validation::{Finding, FindingCode};

/// Largest precision NUMERIC accepts
const MAX_NUMERIC_PRECISION: u32 = 38;

/// Type plus modifiers chosen for a column
#[derive(Debug, Clone, PartialEq)]
struct Classified {
    data_type: DataType,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
    format: Option<Format>,
}

impl Classified {
    fn plain(data_type: DataType) -> Self {
        Self {
            data_type,
            length: None,
            precision: None,
            scale: None,
            format: None,
        }
    }

    fn tagged(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// Infers column types from sampled values.
///
/// Pure and deterministic: the same descriptor and configuration always
/// yield the same result.
#[derive(Debug, Clone, Default)]
pub struct TypeInferrer {
    config: InferenceConfig,
}

impl TypeInferrer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer one column from its sampled values.
    ///
    /// `null_count` and `total_count` are the file-wide aggregates; sampled
    /// nulls are counted too and the larger figure wins. Empty strings are
    /// counted separately and never take part in pattern matching.
    pub fn infer_column(
        &self,
        name: &str,
        values: &[Option<&str>],
        null_count: usize,
        total_count: usize,
    ) -> InferredColumn {
        let sampled_nulls = values.iter().filter(|v| v.is_none()).count();
        let present: Vec<&str> = values.iter().flatten().copied().collect();
        let empty_count = present.iter().filter(|v| v.trim().is_empty()).count();
        let usable: Vec<&str> = present
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();

        let distinct: HashSet<&str> = usable.iter().copied().collect();
        let max_length = usable.iter().map(|v| v.chars().count()).max().unwrap_or(0);
        let null_count = null_count.max(sampled_nulls);
        let total_count = total_count.max(values.len());

        let stats = ColumnStatistics {
            total_count,
            sample_count: values.len(),
            null_count,
            empty_count,
            distinct_count: distinct.len(),
            max_length,
            null_ratio: ratio(null_count, total_count),
            uniqueness_ratio: ratio(distinct.len(), usable.len()),
        };

        let classified = if usable.is_empty() {
            Classified::plain(DataType::Text)
        } else {
            self.classify(&usable, max_length)
        };

        let nullable =
            self.config.assume_nullable || null_count > 0 || empty_count > 0 || usable.is_empty();

        InferredColumn {
            name: name.to_string(),
            source_name: name.to_string(),
            data_type: classified.data_type,
            length: classified.length,
            precision: classified.precision,
            scale: classified.scale,
            nullable,
            format: classified.format,
            stats,
        }
    }

    /// First pattern every value satisfies, in priority order: UUID, email,
    /// URL, integer, decimal, boolean, date/time, JSON; else VARCHAR/TEXT.
    fn classify(&self, values: &[&str], max_length: usize) -> Classified {
        let detect = self.config.detect_formats;
        let all = |pred: fn(&str) -> bool| values.iter().all(|v| pred(v));

        if detect && all(is_uuid) {
            return Classified::plain(DataType::Uuid).tagged(Format::Uuid);
        }
        if detect && all(is_email) {
            let mut classified = Classified::plain(DataType::Varchar).tagged(Format::Email);
            classified.length = Some(255);
            return classified;
        }
        if detect && all(is_url) {
            return Classified::plain(DataType::Text).tagged(Format::Url);
        }
        if let Some(classified) = classify_integers(values) {
            return classified;
        }
        if let Some(classified) = classify_decimals(values) {
            return classified;
        }
        if all(is_boolean_token) {
            return Classified::plain(DataType::Boolean);
        }
        if detect && let Some(classified) = classify_temporal(values) {
            return classified;
        }
        if detect && all(is_json_document) {
            return Classified::plain(DataType::Jsonb).tagged(Format::Json);
        }

        self.fallback_text(max_length)
    }

    fn fallback_text(&self, max_length: usize) -> Classified {
        let max_length = max_length as u32;
        if max_length > self.config.max_varchar_length {
            return Classified::plain(DataType::Text);
        }
        let grown = (max_length as f64 * self.config.varchar_growth).ceil() as u32;
        let length = grown.clamp(
            self.config.min_varchar_length,
            self.config.max_varchar_length,
        );
        let mut classified = Classified::plain(DataType::Varchar);
        classified.length = Some(length);
        classified
    }

    /// Infer every column of a file and run the structural checks.
    pub fn infer_file(&self, descriptor: &FileDescriptor) -> InferenceResult<FileInference> {
        if descriptor.headers.is_empty() {
            return Err(InferenceError::NoHeaders(descriptor.file_name.clone()));
        }

        let table_name = descriptor.table_name();
        let mut findings = check_structure(descriptor, &table_name);
        let header_mapping = normalize_headers(&descriptor.headers);
        let total_count = descriptor.total_count();

        let mut columns = Vec::with_capacity(header_mapping.len());
        for (index, mapping) in header_mapping.iter().enumerate() {
            let values = descriptor.column_values(index, self.config.sample_size);
            let null_count = descriptor.stats(index).map(|s| s.null_count).unwrap_or(0);

            let mut column =
                self.infer_column(&mapping.normalized, &values, null_count, total_count);
            column.source_name = mapping.raw.clone();
            if let Some(stats) = descriptor.stats(index) {
                column.stats.empty_count = column.stats.empty_count.max(stats.empty_count);
                if stats.empty_count > 0 {
                    column.nullable = true;
                }
            }

            if column.stats.distinct_count == 0 {
                findings.push(
                    Finding::info(
                        FindingCode::AllNullColumn,
                        format!("column '{}' has no values, inferred as text", mapping.raw),
                    )
                    .at_column(&table_name, &mapping.normalized),
                );
            }

            debug!(
                table = %table_name,
                column = %column.name,
                data_type = %column.data_type,
                nullable = column.nullable,
                "Inferred column"
            );
            columns.push(column);
        }

        Ok(FileInference {
            file_name: descriptor.file_name.clone(),
            table_name,
            columns,
            findings,
            header_mapping,
        })
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn classify_integers(values: &[&str]) -> Option<Classified> {
    let mut min = 0_i64;
    let mut max = 0_i64;
    let mut wide_digits: Option<u32> = None;

    for value in values {
        match parse_integer(value)? {
            IntegerValue::Fits(n) => {
                min = min.min(n);
                max = max.max(n);
            }
            IntegerValue::Wide { digits } => {
                wide_digits = Some(wide_digits.map_or(digits, |d| d.max(digits)));
            }
        }
    }

    if let Some(digits) = wide_digits {
        let mut classified = Classified::plain(DataType::Numeric);
        if digits <= MAX_NUMERIC_PRECISION {
            classified.precision = Some(digits);
            classified.scale = Some(0);
        }
        return Some(classified);
    }

    let fits = |lo: i64, hi: i64| lo <= min && max <= hi;
    let data_type = if fits(i16::MIN.into(), i16::MAX.into()) {
        DataType::SmallInt
    } else if fits(i32::MIN.into(), i32::MAX.into()) {
        DataType::Integer
    } else {
        DataType::BigInt
    };
    Some(Classified::plain(data_type))
}

fn classify_decimals(values: &[&str]) -> Option<Classified> {
    let mut integer_digits = 0;
    let mut scale = 0;
    let mut exponent = false;

    for value in values {
        if let Some(shape) = decimal_shape(value) {
            integer_digits = integer_digits.max(shape.integer_digits);
            scale = scale.max(shape.scale);
        } else if is_exponent_number(value) {
            exponent = true;
        } else {
            return None;
        }
    }

    let precision = (integer_digits + scale).max(1);
    if exponent || precision > MAX_NUMERIC_PRECISION {
        return Some(Classified::plain(DataType::DoublePrecision));
    }

    let mut classified = Classified::plain(DataType::Numeric);
    classified.precision = Some(precision);
    classified.scale = Some(scale);
    Some(classified)
}

fn classify_temporal(values: &[&str]) -> Option<Classified> {
    let kinds: Vec<TemporalKind> = values
        .iter()
        .map(|v| temporal_kind(v))
        .collect::<Option<_>>()?;

    Some(match merge_temporal(&kinds)? {
        TemporalKind::Date => Classified::plain(DataType::Date).tagged(Format::Date),
        TemporalKind::Time => Classified::plain(DataType::Time).tagged(Format::Time),
        TemporalKind::Timestamp => {
            Classified::plain(DataType::Timestamp).tagged(Format::DateTime)
        }
        TemporalKind::TimestampTz => {
            Classified::plain(DataType::TimestampTz).tagged(Format::DateTimeTz)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[&str]) -> InferredColumn {
        let values: Vec<Option<&str>> = values.iter().map(|v| Some(*v)).collect();
        TypeInferrer::new().infer_column("c", &values, 0, values.len())
    }

    #[test]
    fn test_small_integers() {
        let column = infer(&["1", "2", "3"]);
        assert_eq!(column.data_type, DataType::SmallInt);
        assert!(!column.nullable);
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(infer(&["32767", "-32768"]).data_type, DataType::SmallInt);
        assert_eq!(infer(&["32768"]).data_type, DataType::Integer);
        assert_eq!(infer(&["-32769"]).data_type, DataType::Integer);
        assert_eq!(infer(&["2147483647"]).data_type, DataType::Integer);
        assert_eq!(infer(&["-2147483648"]).data_type, DataType::Integer);
        assert_eq!(infer(&["2147483648"]).data_type, DataType::BigInt);
        assert_eq!(infer(&["-2147483649"]).data_type, DataType::BigInt);
        assert_eq!(infer(&["-9223372036854775808"]).data_type, DataType::BigInt);
        let wide = infer(&["1", "123456789012345678901234"]);
        assert_eq!(wide.data_type, DataType::Numeric);
        assert_eq!(wide.precision, Some(24));
    }

    #[test]
    fn test_email_is_varchar() {
        let column = infer(&["a@b.com", "c@d.com"]);
        assert_eq!(column.data_type, DataType::Varchar);
        assert_eq!(column.length, Some(255));
        assert_eq!(column.format, Some(Format::Email));
    }

    #[test]
    fn test_uuid_and_url() {
        let uuid = infer(&["550e8400-e29b-41d4-a716-446655440000"]);
        assert_eq!(uuid.data_type, DataType::Uuid);
        let url = infer(&["https://a.example", "http://b.example/x"]);
        assert_eq!(url.data_type, DataType::Text);
        assert_eq!(url.format, Some(Format::Url));
    }

    #[test]
    fn test_decimals() {
        let column = infer(&["12.5", "1234.25", "3"]);
        assert_eq!(column.data_type, DataType::Numeric);
        assert_eq!(column.precision, Some(6));
        assert_eq!(column.scale, Some(2));

        assert_eq!(infer(&["1.5e3", "2.0"]).data_type, DataType::DoublePrecision);
    }

    #[test]
    fn test_booleans_dates_json() {
        assert_eq!(infer(&["yes", "No", "Y"]).data_type, DataType::Boolean);
        assert_eq!(infer(&["2024-01-01", "12/31/2023"]).data_type, DataType::Date);
        assert_eq!(
            infer(&["2024-01-01", "2024-01-01 10:00:00"]).data_type,
            DataType::Timestamp
        );
        assert_eq!(
            infer(&["2024-01-01T10:00:00Z"]).data_type,
            DataType::TimestampTz
        );
        assert_eq!(infer(&["09:30", "17:45:10"]).data_type, DataType::Time);
        assert_eq!(infer(&[r#"{"a":1}"#, "[]"]).data_type, DataType::Jsonb);
    }

    #[test]
    fn test_varchar_sizing() {
        let short = infer(&["abc"]);
        assert_eq!(short.data_type, DataType::Varchar);
        assert_eq!(short.length, Some(50));

        let medium = "m".repeat(100);
        assert_eq!(infer(&[medium.as_str()]).length, Some(120));

        let near_limit = "n".repeat(250);
        assert_eq!(infer(&[near_limit.as_str()]).length, Some(255));

        let long = "l".repeat(300);
        let column = infer(&[long.as_str()]);
        assert_eq!(column.data_type, DataType::Text);
        assert_eq!(column.length, None);
    }

    #[test]
    fn test_empty_strings_excluded_but_nullable() {
        let column = infer(&["1", "", "2"]);
        assert_eq!(column.data_type, DataType::SmallInt);
        assert!(column.nullable);
        assert_eq!(column.stats.empty_count, 1);
    }

    #[test]
    fn test_nulls_from_aggregates() {
        let values = [Some("1"), Some("2")];
        let column = TypeInferrer::new().infer_column("c", &values, 5, 100);
        assert!(column.nullable);
        assert_eq!(column.stats.null_ratio, 0.05);
    }

    #[test]
    fn test_all_null_is_text() {
        let values = [None, Some(""), None];
        let column = TypeInferrer::new().infer_column("c", &values, 0, 3);
        assert_eq!(column.data_type, DataType::Text);
        assert!(column.nullable);
    }

    #[test]
    fn test_mixed_falls_back() {
        assert_eq!(infer(&["1", "abc"]).data_type, DataType::Varchar);
        assert_eq!(infer(&["true", "2"]).data_type, DataType::Varchar);
        assert_eq!(infer(&["007", "012"]).data_type, DataType::Varchar);
    }

    #[test]
    fn test_detect_formats_off() {
        let inferrer =
            TypeInferrer::with_config(InferenceConfig::builder().detect_formats(false).build());
        let values = [Some("a@b.com")];
        assert_eq!(
            inferrer.infer_column("c", &values, 0, 1).data_type,
            DataType::Varchar
        );
    }

    #[test]
    fn test_deterministic() {
        let a = infer(&["x", "y", "2024-01-01"]);
        let b = infer(&["x", "y", "2024-01-01"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_infer_file() {
        let descriptor = FileDescriptor::new(
            "Orders.csv",
            vec!["Order ID".into(), "Total".into(), "".into()],
        )
        .with_row(&[Some("1"), Some("9.99"), None])
        .with_row(&[Some("2"), Some("19.50"), None]);

        let inference = TypeInferrer::new().infer_file(&descriptor).unwrap();
        assert_eq!(inference.table_name, "orders");
        assert_eq!(inference.columns[0].name, "order_id");
        assert_eq!(inference.columns[0].source_name, "Order ID");
        assert_eq!(inference.columns[1].data_type, DataType::Numeric);
        assert_eq!(inference.columns[2].name, "column_3");

        let codes: Vec<FindingCode> = inference.findings.iter().map(|f| f.code).collect();
        assert!(codes.contains(&FindingCode::EmptyHeader));
        assert!(codes.contains(&FindingCode::AllNullColumn));

        let table = inference.to_table();
        assert_eq!(table.columns[0].source_column.as_deref(), Some("Order ID"));
    }

    #[test]
    fn test_infer_file_without_headers() {
        let descriptor = FileDescriptor::new("empty.csv", vec![]);
        assert_eq!(
            TypeInferrer::new().infer_file(&descriptor),
            Err(InferenceError::NoHeaders("empty.csv".to_string()))
        );
    }
}
