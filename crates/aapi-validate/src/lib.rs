//! # aapi-validate: AsyncAPI Payload Validation
//!
//! Resolve an AsyncAPI document once, then validate payloads against the
//! schema of any message by id or name.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = aapi_validate::from_file("asyncapi.yaml").await?;
//! let payload = serde_json::json!({"lumens": 500, "sendAt": "2020-08-06T15:00:00+00:00"});
//! assert!(validator.validate("lightMeasured", &payload)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! - [`resolver`]: async. Reads the document and classifies parse
//!   failures into [`ResolveError::NotAsyncApi`] or
//!   [`ResolveError::Governance`]. I/O failures pass through untouched.
//! - [`validator`]: sync. Looks the key up, compiles the message payload
//!   schema and reports every violation as [`ValidateError::Invalid`].
//!
//! ## Crate Policy
//!
//! - Depends on `aapi-parser` only through its public parse contract.
//! - No state survives between resolution calls.

pub mod engine;
pub mod error;
pub mod resolver;
pub mod validator;

use std::path::Path;

pub use aapi_parser::{Diagnostic, DiagnosticCode, Input};
pub use error::{ResolveError, ValidateError, ValidationRecord, MESSAGE_NOT_FOUND};
pub use resolver::Resolver;
pub use validator::MessageValidator;

/// Resolve a document from a YAML or JSON file.
///
/// # Errors
///
/// [`ResolveError::Io`] if the file cannot be read; a parse failure
/// otherwise.
pub async fn from_file(path: impl AsRef<Path>) -> Result<MessageValidator, ResolveError> {
    Resolver::from_env()?.resolve_file(path).await
}

/// Resolve a document from a URL.
///
/// # Errors
///
/// [`ResolveError::InvalidUrl`] or [`ResolveError::Http`] if the document
/// cannot be fetched; a parse failure otherwise.
pub async fn from_url(url: &str) -> Result<MessageValidator, ResolveError> {
    Resolver::from_env()?.resolve_url(url).await
}

/// Resolve a document from YAML/JSON text or a decoded value.
///
/// # Errors
///
/// A parse failure if the content is not a valid AsyncAPI document.
pub async fn from_schema(content: impl Into<Input>) -> Result<MessageValidator, ResolveError> {
    Resolver::from_env()?.resolve_schema(content).await
}
