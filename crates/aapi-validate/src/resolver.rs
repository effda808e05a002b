//! # Schema Resolver
//!
//! Parses a document from a file, a URL, or memory and hands the result to
//! [`MessageValidator`]. A failed parse never reaches the validator: it is
//! classified into [`ResolveError`] by the code of its first diagnostic.

use std::path::Path;

use aapi_parser::{Diagnostic, FetchConfig, Input, ParseOutput, Parser, ParserOptions};

use crate::error::ResolveError;
use crate::validator::MessageValidator;

/// Builds validators from AsyncAPI documents.
///
/// Each call parses afresh; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Resolver {
    parser: Parser,
}

impl Resolver {
    /// Resolver with explicit parser and HTTP settings.
    pub fn new(options: ParserOptions, fetch: &FetchConfig) -> Result<Self, ResolveError> {
        Ok(Self {
            parser: Parser::new(options, fetch)?,
        })
    }

    /// Core rules on, recommended rules off, OpenAPI payloads understood,
    /// HTTP settings from the environment.
    pub fn from_env() -> Result<Self, ResolveError> {
        Self::new(ParserOptions::default(), &FetchConfig::from_env())
    }

    /// Parse a YAML or JSON file.
    pub async fn resolve_file(&self, path: impl AsRef<Path>) -> Result<MessageValidator, ResolveError> {
        let output = self.parser.parse_file(path).await?;
        into_validator(output)
    }

    /// Fetch and parse a document by URL.
    pub async fn resolve_url(&self, url: &str) -> Result<MessageValidator, ResolveError> {
        let output = self.parser.parse_url(url).await?;
        into_validator(output)
    }

    /// Parse in-memory text or an already-decoded value.
    pub async fn resolve_schema(&self, content: impl Into<Input>) -> Result<MessageValidator, ResolveError> {
        let output = self.parser.parse(content).await;
        into_validator(output)
    }
}

fn into_validator(output: ParseOutput) -> Result<MessageValidator, ResolveError> {
    match output.document {
        Some(document) => {
            tracing::info!(
                version = %document.version(),
                title = document.title().unwrap_or_default(),
                messages = document.messages().len(),
                "AsyncAPI document resolved"
            );
            Ok(MessageValidator::new(document))
        }
        None => Err(classify(output.diagnostics)),
    }
}

/// Route a failed parse by its first diagnostic: the fatal sentinel means
/// the input is not an AsyncAPI document, anything else is a governance
/// issue. The full list is kept either way.
pub fn classify(diagnostics: Vec<Diagnostic>) -> ResolveError {
    let fatal = diagnostics.first().is_some_and(|d| d.code.is_fatal());
    if let Some(first) = diagnostics.first() {
        tracing::debug!(code = %first.code, total = diagnostics.len(), "document rejected");
    }
    if fatal {
        ResolveError::NotAsyncApi { diagnostics }
    } else {
        ResolveError::Governance { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aapi_parser::DiagnosticCode;

    #[test]
    fn first_diagnostic_routes_the_error() {
        let fatal = Diagnostic::error(DiagnosticCode::UncaughtException, "boom", &[]);
        let lint = Diagnostic::error(DiagnosticCode::Info, "no info", &[]);

        let err = classify(vec![fatal.clone(), lint.clone()]);
        assert!(matches!(err, ResolveError::NotAsyncApi { .. }));
        assert_eq!(err.diagnostics().len(), 2);

        let err = classify(vec![lint, fatal]);
        assert!(matches!(err, ResolveError::Governance { .. }));
        assert_eq!(err.diagnostics().len(), 2);
    }

    #[test]
    fn messages_match_published_wording() {
        let fatal = Diagnostic::error(DiagnosticCode::UncaughtException, "boom", &[]);
        assert_eq!(
            classify(vec![fatal]).to_string(),
            "Your schema is not an AsyncAPI schema."
        );
        let lint = Diagnostic::error(DiagnosticCode::InvalidRef, "dangling", &[]);
        assert_eq!(
            classify(vec![lint]).to_string(),
            "Your schema and/or referenced documents have governance issues."
        );
    }
}
