//! # Diagnostics
//!
//! Structured findings produced while parsing an AsyncAPI document.
//!
//! Every failed parse carries at least one diagnostic. The code of the
//! first one routes the failure: [`DiagnosticCode::UncaughtException`]
//! means the input could not be read as a document at all, every other
//! code is a structural (governance) finding on a readable document.

use std::fmt;

use serde::Serialize;

/// Stable classification codes for parse findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// The input could not be decoded into a document. Fatal sentinel.
    #[serde(rename = "uncaught exception")]
    UncaughtException,
    /// `asyncapi` field missing, not a string, or an unsupported version.
    #[serde(rename = "asyncapi-is-asyncapi")]
    IsAsyncApi,
    /// `info` object missing or malformed.
    #[serde(rename = "asyncapi-info")]
    Info,
    /// `channels` object missing or malformed.
    #[serde(rename = "asyncapi-channels")]
    Channels,
    /// `components` or `components.messages` malformed.
    #[serde(rename = "asyncapi-components")]
    Components,
    /// Message payload is neither an object nor a boolean schema.
    #[serde(rename = "asyncapi-message-payload")]
    MessagePayload,
    /// Two messages share a `messageId` (2.x only).
    #[serde(rename = "asyncapi2-message-messageId-uniqueness")]
    MessageIdUniqueness,
    /// Unknown or unconvertible `schemaFormat`.
    #[serde(rename = "asyncapi-schema-format")]
    SchemaFormat,
    /// Payload schema does not compile as JSON Schema.
    #[serde(rename = "asyncapi-payload")]
    Payload,
    /// A `$ref` could not be resolved.
    #[serde(rename = "invalid-ref")]
    InvalidRef,
    /// `info.description` missing (recommended ruleset).
    #[serde(rename = "asyncapi-info-description")]
    InfoDescription,
    /// `info.contact` missing (recommended ruleset).
    #[serde(rename = "asyncapi-info-contact")]
    InfoContact,
}

impl DiagnosticCode {
    /// Returns the stable, machine-readable code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UncaughtException => "uncaught exception",
            Self::IsAsyncApi => "asyncapi-is-asyncapi",
            Self::Info => "asyncapi-info",
            Self::Channels => "asyncapi-channels",
            Self::Components => "asyncapi-components",
            Self::MessagePayload => "asyncapi-message-payload",
            Self::MessageIdUniqueness => "asyncapi2-message-messageId-uniqueness",
            Self::SchemaFormat => "asyncapi-schema-format",
            Self::Payload => "asyncapi-payload",
            Self::InvalidRef => "invalid-ref",
            Self::InfoDescription => "asyncapi-info-description",
            Self::InfoContact => "asyncapi-info-contact",
        }
    }

    /// True for the sentinel that marks input which is not a document at all.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::UncaughtException)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a diagnostic. Only errors prevent a document from being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single parse or governance finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stable code for programmatic handling.
    pub code: DiagnosticCode,
    /// Human-readable description.
    pub message: String,
    pub severity: Severity,
    /// JSON path (keys and array indexes) to the offending node.
    pub path: Vec<String>,
    /// Document the finding belongs to, when it is not the root document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Diagnostic {
    /// Error-severity diagnostic at `path`.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, path: &[String]) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
            path: path.to_vec(),
            source: None,
        }
    }

    /// Warning-severity diagnostic at `path`.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, path: &[String]) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, path)
        }
    }

    /// Attach the location of the document the finding came from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// JSON path rendered as `/a/b/0`, or `(root)` for the document itself.
    pub fn pointer(&self) -> String {
        if self.path.is_empty() {
            "(root)".to_string()
        } else {
            format!("/{}", self.path.join("/"))
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code, self.pointer(), self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

/// Builds a child JSON path without mutating the parent.
pub(crate) fn child_path(path: &[String], segment: impl Into<String>) -> Vec<String> {
    let mut child = path.to_vec();
    child.push(segment.into());
    child
}
