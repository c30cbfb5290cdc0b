//! Enumerations shared by the schema model

use serde::{Deserialize, Serialize};

/// Primitive column type.
///
/// The set is closed: every emitter maps each variant to exactly one target
/// representation. `Other` holds a type name that arrived from outside the
/// core (for example a suggestion payload) and could not be normalized; it is
/// kept so the validator can flag it and emitters can refuse it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataType {
    Text,
    Varchar,
    Char,
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Decimal,
    Real,
    DoublePrecision,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    Jsonb,
    Array { element: Box<DataType> },
    Enum { name: String, values: Vec<String> },
    Other { name: String },
}

/// A type string parsed into a [`DataType`] plus its modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub data_type: DataType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl DataType {
    /// Short lowercase name, used in messages and diagram markup.
    pub fn name(&self) -> String {
        match self {
            DataType::Text => "text".to_string(),
            DataType::Varchar => "varchar".to_string(),
            DataType::Char => "char".to_string(),
            DataType::SmallInt => "smallint".to_string(),
            DataType::Integer => "integer".to_string(),
            DataType::BigInt => "bigint".to_string(),
            DataType::Numeric => "numeric".to_string(),
            DataType::Decimal => "decimal".to_string(),
            DataType::Real => "real".to_string(),
            DataType::DoublePrecision => "double".to_string(),
            DataType::Boolean => "boolean".to_string(),
            DataType::Date => "date".to_string(),
            DataType::Time => "time".to_string(),
            DataType::Timestamp => "timestamp".to_string(),
            DataType::TimestampTz => "timestamptz".to_string(),
            DataType::Uuid => "uuid".to_string(),
            DataType::Json => "json".to_string(),
            DataType::Jsonb => "jsonb".to_string(),
            DataType::Array { element } => format!("{}[]", element.name()),
            DataType::Enum { name, .. } => name.clone(),
            DataType::Other { name } => name.clone(),
        }
    }

    pub fn array_of(element: DataType) -> Self {
        DataType::Array {
            element: Box::new(element),
        }
    }

    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        DataType::Enum {
            name: name.into(),
            values,
        }
    }

    /// VARCHAR and CHAR carry a mandatory length.
    pub fn requires_length(&self) -> bool {
        matches!(self, DataType::Varchar | DataType::Char)
    }

    pub fn supports_precision(&self) -> bool {
        matches!(self, DataType::Numeric | DataType::Decimal)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::SmallInt | DataType::Integer | DataType::BigInt
        )
    }

    /// False when the type, or any array element type, is `Other`.
    pub fn is_supported(&self) -> bool {
        match self {
            DataType::Other { .. } => false,
            DataType::Array { element } => element.is_supported(),
            _ => true,
        }
    }

    /// Parse a free-form SQL-ish type string such as `VARCHAR(120)`,
    /// `numeric(10, 2)`, `timestamp with time zone` or `text[]`.
    ///
    /// Unknown names become [`DataType::Other`]; parsing never fails.
    pub fn parse(input: &str) -> ParsedType {
        let trimmed = input.trim();

        if let Some(inner) = trimmed.strip_suffix("[]") {
            let element = DataType::parse(inner);
            return ParsedType {
                data_type: DataType::array_of(element.data_type),
                length: element.length,
                precision: element.precision,
                scale: element.scale,
            };
        }

        let (base, args) = match (trimmed.find('('), trimmed.rfind(')')) {
            (Some(open), Some(close)) if close > open => {
                let args: Vec<u32> = trimmed[open + 1..close]
                    .split(',')
                    .filter_map(|a| a.trim().parse().ok())
                    .collect();
                let rest = format!("{} {}", &trimmed[..open], &trimmed[close + 1..]);
                (rest, args)
            }
            _ => (trimmed.to_string(), Vec::new()),
        };

        let normalized = base
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let data_type = match normalized.as_str() {
            "text" | "string" => DataType::Text,
            "varchar" | "character varying" => DataType::Varchar,
            "char" | "character" | "bpchar" => DataType::Char,
            "smallint" | "int2" => DataType::SmallInt,
            "int" | "integer" | "int4" => DataType::Integer,
            "bigint" | "int8" => DataType::BigInt,
            "numeric" => DataType::Numeric,
            "decimal" => DataType::Decimal,
            "real" | "float4" => DataType::Real,
            "double" | "double precision" | "float8" | "float" => DataType::DoublePrecision,
            "boolean" | "bool" => DataType::Boolean,
            "date" => DataType::Date,
            "time" | "time without time zone" => DataType::Time,
            "timestamp" | "timestamp without time zone" => DataType::Timestamp,
            "timestamptz" | "timestamp with time zone" => DataType::TimestampTz,
            "uuid" => DataType::Uuid,
            "json" => DataType::Json,
            "jsonb" => DataType::Jsonb,
            _ => DataType::Other {
                name: trimmed.to_string(),
            },
        };

        let (length, precision, scale) = if data_type.requires_length() {
            (args.first().copied(), None, None)
        } else if data_type.supports_precision() {
            (None, args.first().copied(), args.get(1).copied())
        } else {
            (None, None, None)
        };

        ParsedType {
            data_type,
            length,
            precision,
            scale,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Relationship cardinality, read from the target's point of view
/// (one target row to many source rows for `OneToMany`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    OneToOne,
    #[default]
    OneToMany,
    ManyToMany,
}

/// Foreign key referential action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Parse `cascade`, `SET NULL`, `set_null`, ... Unknown input yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "no action" | "noaction" => Some(ReferentialAction::NoAction),
            "restrict" => Some(ReferentialAction::Restrict),
            "cascade" => Some(ReferentialAction::Cascade),
            "set null" | "setnull" => Some(ReferentialAction::SetNull),
            "set default" | "setdefault" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }
}

/// Statement kind a row-level access policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyOperation {
    Select,
    Insert,
    Update,
    Delete,
}

impl PolicyOperation {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PolicyOperation::Select => "SELECT",
            PolicyOperation::Insert => "INSERT",
            PolicyOperation::Update => "UPDATE",
            PolicyOperation::Delete => "DELETE",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_uppercase().as_str() {
            "SELECT" => Some(PolicyOperation::Select),
            "INSERT" => Some(PolicyOperation::Insert),
            "UPDATE" => Some(PolicyOperation::Update),
            "DELETE" => Some(PolicyOperation::Delete),
            _ => None,
        }
    }

    /// Whether the operation takes a `USING` predicate
    pub fn takes_using(&self) -> bool {
        !matches!(self, PolicyOperation::Insert)
    }

    /// Whether the operation takes a `WITH CHECK` predicate
    pub fn takes_with_check(&self) -> bool {
        matches!(self, PolicyOperation::Insert | PolicyOperation::Update)
    }
}

impl std::fmt::Display for PolicyOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Index access method hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMethod {
    BTree,
    Hash,
    Gin,
    Gist,
    Brin,
}

impl IndexMethod {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IndexMethod::BTree => "btree",
            IndexMethod::Hash => "hash",
            IndexMethod::Gin => "gin",
            IndexMethod::Gist => "gist",
            IndexMethod::Brin => "brin",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "btree" => Some(IndexMethod::BTree),
            "hash" => Some(IndexMethod::Hash),
            "gin" => Some(IndexMethod::Gin),
            "gist" => Some(IndexMethod::Gist),
            "brin" => Some(IndexMethod::Brin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_length() {
        let parsed = DataType::parse("VARCHAR(120)");
        assert_eq!(parsed.data_type, DataType::Varchar);
        assert_eq!(parsed.length, Some(120));
    }

    #[test]
    fn test_parse_precision_and_scale() {
        let parsed = DataType::parse("numeric(10, 2)");
        assert_eq!(parsed.data_type, DataType::Numeric);
        assert_eq!(parsed.precision, Some(10));
        assert_eq!(parsed.scale, Some(2));
    }

    #[test]
    fn test_parse_multi_word_names() {
        assert_eq!(
            DataType::parse("timestamp  with time zone").data_type,
            DataType::TimestampTz
        );
        assert_eq!(
            DataType::parse("DOUBLE PRECISION").data_type,
            DataType::DoublePrecision
        );
    }

    #[test]
    fn test_parse_array() {
        let parsed = DataType::parse("text[]");
        assert_eq!(parsed.data_type, DataType::array_of(DataType::Text));
    }

    #[test]
    fn test_parse_unknown_is_other() {
        let parsed = DataType::parse("geography");
        assert_eq!(
            parsed.data_type,
            DataType::Other {
                name: "geography".to_string()
            }
        );
        assert!(!parsed.data_type.is_supported());
        assert!(!DataType::array_of(parsed.data_type).is_supported());
    }

    #[test]
    fn test_policy_operation_shapes() {
        assert!(PolicyOperation::Insert.takes_with_check());
        assert!(!PolicyOperation::Insert.takes_using());
        assert!(PolicyOperation::Update.takes_using());
        assert!(PolicyOperation::Update.takes_with_check());
        assert!(!PolicyOperation::Select.takes_with_check());
    }

    #[test]
    fn test_referential_action_parse() {
        assert_eq!(
            ReferentialAction::parse("set_null"),
            Some(ReferentialAction::SetNull)
        );
        assert_eq!(
            ReferentialAction::parse("CASCADE"),
            Some(ReferentialAction::Cascade)
        );
        assert_eq!(ReferentialAction::parse("explode"), None);
    }
}
