//! Schema Forge - relational schema design from tabular samples
//!
//! Provides:
//! - Type inference over sampled file contents
//! - A typed schema model with validation and a fingerprint cache
//! - Dependency ordering and naming-convention relationship inference
//! - A suggestion boundary with a rule-based fallback
//! - Emission to SQL migrations, declarative SQL, Prisma, TypeScript and Mermaid
//! - A pipeline tying the stages together

pub mod config;
pub mod export;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod suggest;
pub mod validation;

pub use config::{ConfigError, ExportConfig, ForgeConfig};
pub use export::{ExportError, ExportFormat, ExportOptions, ExportResult, ExportedFile, emit};
pub use inference::{FileDescriptor, FileInference, InferenceConfig, TypeInferrer};
pub use models::{
    AccessPolicy, Cardinality, Column, Constraint, DataType, Index, Relationship, Schema,
    SchemaError, Table,
};
pub use pipeline::{PipelineError, PipelineReport, SchemaPipeline, SchemaSource};
pub use resolver::{DependencyOrder, dependency_order};
pub use suggest::{SuggestConfig, SuggestionClient, SuggestionError, SuggestionPayload};
pub use validation::{
    Finding, FindingCode, SchemaValidator, Severity, ValidationCache, ValidationReport,
    ValidatorConfig,
};
