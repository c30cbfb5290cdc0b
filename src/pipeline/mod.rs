//! Analysis pipeline
//!
//! One run takes file descriptors through inference, the suggestion
//! boundary (or its fallback), validation, dependency ordering and emission,
//! and returns a [`PipelineReport`].

mod error;
mod executor;
mod report;

pub use error::{PipelineError, PipelineResult};
pub use executor::SchemaPipeline;
pub use report::{PipelineReport, SchemaSource};
