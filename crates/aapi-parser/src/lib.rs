//! # aapi-parser: AsyncAPI Document Parser
//!
//! Parses AsyncAPI 2.0–2.6 and 3.0 documents (YAML or JSON) from a file,
//! a URL, or memory, and returns either an [`AsyncApiDocument`] or the
//! [`Diagnostic`]s explaining why none was produced.
//!
//! ## Contract
//!
//! - Root-document I/O failures are returned as raw [`FetchError`]s, never
//!   as diagnostics.
//! - Input that cannot be read as a document at all yields a single
//!   `uncaught exception` diagnostic ([`DiagnosticCode::UncaughtException`]).
//! - Everything else (unsupported version, structural defects, broken
//!   `$ref`s, unknown schema formats, uncompilable payloads) is reported
//!   with a governance code.
//! - Message payloads are exposed as plain JSON Schema regardless of their
//!   declared `schemaFormat`.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), aapi_parser::FetchError> {
//! use aapi_parser::{FetchConfig, Parser, ParserOptions};
//!
//! let parser = Parser::new(ParserOptions::default(), &FetchConfig::from_env())?;
//! let output = parser.parse_file("asyncapi.yaml").await?;
//! if let Some(document) = output.document {
//!     for message in document.messages() {
//!         println!("{:?}", message.id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
mod decode;
pub mod diagnostic;
pub mod document;
pub mod formats;
pub mod parser;
mod refs;
pub mod ruleset;
pub mod schema;
pub mod source;

pub use config::FetchConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use document::{AsyncApiDocument, AsyncApiVersion, Message, SUPPORTED_VERSIONS};
pub use formats::{AsyncApiSchemaFormat, OpenApiSchemaFormat, SchemaFormat, SchemaFormats};
pub use parser::{ParseOutput, Parser, ParserOptions};
pub use ruleset::RulesetConfig;
pub use schema::{compile_payload, DOCUMENT_URI};
pub use source::{DocumentFetcher, DocumentLocation, FetchError, Input};
