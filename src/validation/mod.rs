//! Validation functionality
//!
//! Provides:
//! - Identifier rules (grammar, length, reserved words)
//! - Typed findings with severity, code and optional fix
//! - Schema validation producing a [`ValidationReport`]
//! - A fingerprint-keyed [`ValidationCache`]

pub mod cache;
pub mod finding;
pub mod input;
pub mod validator;

pub use cache::{ValidationCache, fingerprint};
pub use finding::{Finding, FindingCode, Severity};
pub use input::{MAX_IDENTIFIER_LENGTH, ValidationError, is_reserved_word, validate_identifier};
pub use validator::{SchemaValidator, ValidationReport, ValidatorConfig, validate};
