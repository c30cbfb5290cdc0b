//! Relationship and dependency resolution
//!
//! - Naming inference: `X_id` columns imply foreign keys to `X`/`Xs`/`Xes`/`Xies`
//! - Creation order: depth-first over the table dependency graph, with cycles
//!   recorded rather than followed

pub mod naming;
pub mod order;

pub use naming::{apply_inferred_relationships, infer_relationships};
pub use order::{DependencyOrder, dependency_graph, dependency_order};
