//! Type inference engine for tabular samples
//!
//! Scans sampled column values and infers a best-fit column type,
//! nullability and statistics, and reports structural issues in headers and
//! rows as typed findings.
//!
//! ## Features
//!
//! - **Type inference** - UUID, email, URL, integer widths, decimals,
//!   booleans, dates and times, JSON, sized VARCHAR/TEXT fallback
//! - **Structural checks** - empty, duplicate, reserved and oversized
//!   headers; empty and ragged rows
//! - **Header normalization** - the auto-fix for the header findings
//!
//! ## Example
//!
//! ```rust
//! use schema_forge::inference::{FileDescriptor, TypeInferrer};
//! use schema_forge::models::DataType;
//!
//! let descriptor = FileDescriptor::new("users.csv", vec!["id".into(), "email".into()])
//!     .with_row(&[Some("1"), Some("a@b.com")])
//!     .with_row(&[Some("2"), Some("c@d.com")]);
//!
//! let inference = TypeInferrer::new().infer_file(&descriptor).unwrap();
//! assert_eq!(inference.columns[0].data_type, DataType::SmallInt);
//! assert_eq!(inference.columns[1].data_type, DataType::Varchar);
//! ```

mod config;
mod descriptor;
mod error;
mod formats;
mod inferrer;
mod structure;
mod types;

pub use config::{InferenceConfig, InferenceConfigBuilder};
pub use descriptor::{ColumnStats, FileDescriptor};
pub use error::{InferenceError, InferenceResult};
pub use formats::{Format, detect_format};
pub use inferrer::TypeInferrer;
pub use structure::{check_structure, normalize_headers};
pub use types::{ColumnStatistics, FileInference, HeaderMapping, InferredColumn};
