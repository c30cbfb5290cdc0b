//! Relationship model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Cardinality, ReferentialAction};

/// Foreign-key relationship from `source_table.source_column` to
/// `target_table.target_column`. The source table depends on the target.
///
/// # Example
///
/// ```rust
/// use schema_forge::models::{Cardinality, ReferentialAction, Relationship};
///
/// let rel = Relationship::new("orders", "customer_id", "customers", "id")
///     .with_cardinality(Cardinality::OneToMany)
///     .on_delete(ReferentialAction::Cascade);
/// assert_eq!(rel.name, "fk_orders_customer_id");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: Uuid,
    pub name: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
    /// Why the relationship exists (naming heuristic, suggestion text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl Relationship {
    pub fn new(
        source_table: impl Into<String>,
        source_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        let source_table = source_table.into();
        let source_column = source_column.into();
        let target_table = target_table.into();
        let target_column = target_column.into();
        let name = format!("fk_{}_{}", source_table, source_column);
        let id = Self::generate_id(&source_table, &source_column, &target_table, &target_column);
        Self {
            id,
            name,
            source_table,
            source_column,
            target_table,
            target_column,
            cardinality: Cardinality::default(),
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
            justification: None,
        }
    }

    /// Deterministic UUID v5 from the four endpoints
    pub fn generate_id(
        source_table: &str,
        source_column: &str,
        target_table: &str,
        target_column: &str,
    ) -> Uuid {
        let key = format!(
            "{}.{}->{}.{}",
            source_table, source_column, target_table, target_column
        );
        Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    pub fn with_justification(mut self, text: impl Into<String>) -> Self {
        self.justification = Some(text.into());
        self
    }

    pub fn is_self_reference(&self) -> bool {
        self.source_table == self.target_table
    }

    /// Case-insensitive identity of the four endpoints, used to deduplicate
    /// relationships against column-level FOREIGN KEY constraints.
    pub fn endpoint_key(&self) -> (String, String, String, String) {
        (
            self.source_table.to_lowercase(),
            self.source_column.to_lowercase(),
            self.target_table.to_lowercase(),
            self.target_column.to_lowercase(),
        )
    }
}
