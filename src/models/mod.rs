//! Schema model
//!
//! The canonical typed representation of tables, columns, constraints,
//! relationships, indexes and row-level access policies.

pub mod column;
pub mod enums;
pub mod policy;
pub mod relationship;
pub mod schema;
pub mod table;

pub use column::{Column, Constraint};
pub use enums::{
    Cardinality, DataType, IndexMethod, ParsedType, PolicyOperation, ReferentialAction,
};
pub use policy::AccessPolicy;
pub use relationship::Relationship;
pub use schema::{Schema, SchemaError, SchemaResult};
pub use table::{Index, Position, Table};
