//! PostgreSQL type mapping

use super::printer::quote_identifier;
use crate::export::{ExportResult, unmappable};
use crate::models::{Column, DataType};

/// Render a column's type, modifiers included.
pub fn column_type(column: &Column, table: &str, namespace: &str) -> ExportResult<String> {
    render(&column.data_type, column, namespace)
        .ok_or_else(|| unmappable("sql", &column.data_type, table, &column.name))
}

fn render(data_type: &DataType, column: &Column, namespace: &str) -> Option<String> {
    let sized = |base: &str| match column.length {
        Some(n) => format!("{}({})", base, n),
        None => base.to_string(),
    };
    let exact = |base: &str| match (column.precision, column.scale) {
        (Some(p), Some(s)) => format!("{}({},{})", base, p, s),
        (Some(p), None) => format!("{}({})", base, p),
        _ => base.to_string(),
    };

    let rendered = match data_type {
        DataType::Text => "TEXT".to_string(),
        DataType::Varchar => sized("VARCHAR"),
        DataType::Char => sized("CHAR"),
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Integer => "INTEGER".to_string(),
        DataType::BigInt => "BIGINT".to_string(),
        DataType::Numeric => exact("NUMERIC"),
        DataType::Decimal => exact("DECIMAL"),
        DataType::Real => "REAL".to_string(),
        DataType::DoublePrecision => "DOUBLE PRECISION".to_string(),
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Date => "DATE".to_string(),
        DataType::Time => "TIME".to_string(),
        DataType::Timestamp => "TIMESTAMP".to_string(),
        DataType::TimestampTz => "TIMESTAMPTZ".to_string(),
        DataType::Uuid => "UUID".to_string(),
        DataType::Json => "JSON".to_string(),
        DataType::Jsonb => "JSONB".to_string(),
        DataType::Array { element } => format!("{}[]", render(element, column, namespace)?),
        DataType::Enum { name, .. } => format!(
            "{}.{}",
            quote_identifier(namespace),
            quote_identifier(name)
        ),
        DataType::Other { .. } => return None,
    };
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportError;

    fn render_column(column: Column) -> ExportResult<String> {
        column_type(&column, "t", "public")
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(
            render_column(Column::new("a", DataType::Varchar).with_length(80)).unwrap(),
            "VARCHAR(80)"
        );
        assert_eq!(
            render_column(Column::new("a", DataType::Numeric).with_precision(10, Some(2))).unwrap(),
            "NUMERIC(10,2)"
        );
        assert_eq!(
            render_column(Column::new("a", DataType::Decimal).with_precision(12, None)).unwrap(),
            "DECIMAL(12)"
        );
    }

    #[test]
    fn test_arrays_and_enums() {
        let tags = Column::new("tags", DataType::array_of(DataType::Text));
        assert_eq!(render_column(tags).unwrap(), "TEXT[]");

        let status = Column::new(
            "status",
            DataType::enumeration("order_status", vec!["new".into()]),
        );
        assert_eq!(render_column(status).unwrap(), "\"public\".\"order_status\"");
    }

    #[test]
    fn test_other_is_unmappable() {
        let err = render_column(Column::new(
            "geom",
            DataType::array_of(DataType::Other {
                name: "geometry".into(),
            }),
        ))
        .unwrap_err();
        assert!(matches!(err, ExportError::UnmappableType { ref column, .. } if column == "geom"));
    }
}
