//! # Error Types
//!
//! Two families, one per stage:
//!
//! - [`ResolveError`]: turning input into a document failed. Either the
//!   bytes could not be retrieved (raw I/O, HTTP, URL errors, untouched),
//!   or the parser rejected the document (diagnostics attached).
//! - [`ValidateError`]: a validation call failed. Either no message
//!   matched the key, or the payload violated the message schema.

use std::fmt;

use aapi_parser::{Diagnostic, FetchError};
use thiserror::Error;

/// Message for [`ValidateError::MessageNotFound`].
pub const MESSAGE_NOT_FOUND: &str = "No messages found for the given key";

/// Failure to produce a validator from a document source.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Reading the document from disk failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Fetching the document over HTTP failed, including non-success statuses.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The document URL could not be parsed.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// The input is not an AsyncAPI document at all.
    #[error("Your schema is not an AsyncAPI schema.")]
    NotAsyncApi {
        /// Every finding reported by the parser, in order.
        diagnostics: Vec<Diagnostic>,
    },

    /// The document was read but breaks structural rules, or a document it
    /// references does.
    #[error("Your schema and/or referenced documents have governance issues.")]
    Governance {
        /// Every finding reported by the parser, in order.
        diagnostics: Vec<Diagnostic>,
    },
}

impl ResolveError {
    /// Parser findings, empty for I/O failures.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::NotAsyncApi { diagnostics } | Self::Governance { diagnostics } => diagnostics,
            Self::Io(_) | Self::Http(_) | Self::InvalidUrl(_) => &[],
        }
    }
}

impl From<FetchError> for ResolveError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Io(e) => Self::Io(e),
            FetchError::Http(e) => Self::Http(e),
            FetchError::InvalidUrl(e) => Self::InvalidUrl(e),
        }
    }
}

/// One way a payload failed its schema.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationRecord {
    /// JSON Pointer to the offending value in the payload (`""` for the root).
    pub instance_path: String,
    /// JSON Pointer to the failing keyword within the message schema.
    pub schema_path: String,
    /// The violated keyword, e.g. `minimum` or `required`.
    pub keyword: String,
    /// Constraint description, e.g. `must be >= 0`.
    pub message: String,
}

impl fmt::Display for ValidationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data{} {}", self.instance_path, self.message)
    }
}

/// Failure of a single validation call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidateError {
    /// No message has the requested id or name.
    #[error("No messages found for the given key")]
    MessageNotFound {
        /// The key that matched nothing.
        key: String,
    },

    /// The payload does not conform to the message schema.
    #[error("{summary}")]
    Invalid {
        /// Id or name of the message validated against.
        key: String,
        /// All failures joined into one line, e.g. `data/lumens must be >= 0`.
        summary: String,
        /// Structured failures, in engine evaluation order.
        errors: Vec<ValidationRecord>,
    },

    /// The message schema could not be compiled.
    #[error("payload schema of message '{key}' could not be compiled: {reason}")]
    SchemaCompile {
        /// Id or name of the message whose schema failed.
        key: String,
        /// The engine's explanation.
        reason: String,
    },
}

impl ValidateError {
    /// The key the failing call was made with.
    pub fn key(&self) -> &str {
        match self {
            Self::MessageNotFound { key } | Self::Invalid { key, .. } | Self::SchemaCompile { key, .. } => key,
        }
    }

    /// Structured failures; empty unless [`ValidateError::Invalid`].
    pub fn records(&self) -> &[ValidationRecord] {
        match self {
            Self::Invalid { errors, .. } => errors,
            Self::MessageNotFound { .. } | Self::SchemaCompile { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_not_found_text_is_fixed() {
        let err = ValidateError::MessageNotFound {
            key: "wrong-key".into(),
        };
        assert_eq!(err.to_string(), MESSAGE_NOT_FOUND);
        assert_eq!(err.key(), "wrong-key");
        assert!(err.records().is_empty());
    }

    #[test]
    fn invalid_displays_summary() {
        let record = ValidationRecord {
            instance_path: "/lumens".into(),
            schema_path: "/properties/lumens/minimum".into(),
            keyword: "minimum".into(),
            message: "must be >= 0".into(),
        };
        assert_eq!(record.to_string(), "data/lumens must be >= 0");
        let err = ValidateError::Invalid {
            key: "lightMeasured".into(),
            summary: record.to_string(),
            errors: vec![record],
        };
        assert_eq!(err.to_string(), "data/lumens must be >= 0");
        assert_eq!(err.records().len(), 1);
    }

    #[test]
    fn schema_compile_names_message_and_reason() {
        let err = ValidateError::SchemaCompile {
            key: "tree".into(),
            reason: "5 is not of type \"string\"".into(),
        };
        assert_eq!(err.key(), "tree");
        assert!(err.records().is_empty());
        assert_eq!(
            err.to_string(),
            "payload schema of message 'tree' could not be compiled: 5 is not of type \"string\""
        );
    }

    #[test]
    fn fetch_errors_keep_their_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ResolveError::from(FetchError::Io(io));
        assert!(matches!(&err, ResolveError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
        assert_eq!(err.to_string(), "gone");
        assert!(err.diagnostics().is_empty());
    }
}
