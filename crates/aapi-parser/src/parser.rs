//! # Parser
//!
//! Turns raw input into a [`ParseOutput`]: either a document, or the
//! diagnostics explaining why there is none.
//!
//! Stages, in order:
//! 1. Decode YAML/JSON. Failure, or a root that is not a mapping, yields a
//!    single `uncaught exception` diagnostic and stops.
//! 2. Check the `asyncapi` field. Failure stops.
//! 3. Load external `$ref` targets and dereference.
//! 4. Core rules, message extraction, recommended rules (as configured).
//!
//! A document is produced only when no error-severity diagnostic exists.

use std::path::Path;

use serde_json::Value;
use url::Url;

use crate::config::FetchConfig;
use crate::decode::decode_text;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::document::AsyncApiDocument;
use crate::formats::SchemaFormats;
use crate::refs::{load_external, Dereferencer};
use crate::ruleset::{self, RulesetConfig};
use crate::source::{DocumentFetcher, DocumentLocation, FetchError, Input};

/// Parse-time settings.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    pub ruleset: RulesetConfig,
    pub schema_formats: SchemaFormats,
}

/// Result of a parse. `document` is `None` iff `diagnostics` holds at
/// least one error.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub document: Option<AsyncApiDocument>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            document: None,
            diagnostics,
        }
    }
}

/// AsyncAPI document parser.
#[derive(Debug, Clone)]
pub struct Parser {
    options: ParserOptions,
    fetcher: DocumentFetcher,
}

impl Parser {
    /// Build a parser. Fails only if the HTTP client cannot be constructed.
    pub fn new(options: ParserOptions, fetch: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            options,
            fetcher: DocumentFetcher::new(fetch)?,
        })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse in-memory content. Relative external `$ref`s cannot be
    /// followed from here and are reported as `invalid-ref`.
    pub async fn parse(&self, input: impl Into<Input>) -> ParseOutput {
        self.parse_at(input.into(), DocumentLocation::Inline).await
    }

    /// Read and parse a UTF-8 file. I/O failures are returned unchanged.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseOutput, FetchError> {
        let path = path.as_ref();
        let text = self.fetcher.read_file(path).await?;
        Ok(self
            .parse_at(Input::Text(text), DocumentLocation::file(path))
            .await)
    }

    /// Fetch and parse a document by URL. Malformed URLs, transport errors
    /// and non-success statuses are returned unchanged.
    pub async fn parse_url(&self, url: &str) -> Result<ParseOutput, FetchError> {
        let url = Url::parse(url)?;
        let text = self.fetcher.fetch_url(&url).await?;
        let location = match url.to_file_path() {
            Ok(path) if url.scheme() == "file" => DocumentLocation::file(path),
            _ => DocumentLocation::Url(url),
        };
        Ok(self.parse_at(Input::Text(text), location).await)
    }

    async fn parse_at(&self, input: Input, location: DocumentLocation) -> ParseOutput {
        tracing::debug!(%location, "parsing AsyncAPI document");

        let raw = match input {
            Input::Json(value) => value,
            Input::Text(text) => match decode_text(&text) {
                Ok(value) => value,
                Err(reason) => return ParseOutput::failed(vec![uncaught(reason)]),
            },
        };
        if !raw.is_object() {
            return ParseOutput::failed(vec![uncaught(format!(
                "document root must be a mapping, found {}",
                kind_of(&raw)
            ))]);
        }

        let version = match ruleset::check_asyncapi_field(&raw) {
            Ok(version) => version,
            Err(diagnostic) => return ParseOutput::failed(vec![diagnostic]),
        };

        let (store, mut diagnostics) = load_external(&raw, &location, &self.fetcher).await;
        let (resolved, ref_diagnostics) = Dereferencer::new(&raw, &location, &store).resolve();
        diagnostics.extend(ref_diagnostics);

        let ruleset = self.options.ruleset;
        if ruleset.core {
            diagnostics.extend(ruleset::run_core(&resolved, version));
        }
        let (messages, message_diagnostics) = ruleset::extract_messages(
            &resolved,
            version,
            &self.options.schema_formats,
            ruleset.core,
        );
        diagnostics.extend(message_diagnostics);
        if ruleset.recommended {
            diagnostics.extend(ruleset::run_recommended(&resolved));
        }

        for warning in diagnostics.iter().filter(|d| !d.is_error()) {
            tracing::warn!(code = %warning.code, path = %warning.pointer(), "{}", warning.message);
        }

        if diagnostics.iter().any(Diagnostic::is_error) {
            tracing::debug!(%location, count = diagnostics.len(), "document rejected");
            return ParseOutput::failed(diagnostics);
        }

        ParseOutput {
            document: Some(AsyncApiDocument {
                version,
                json: resolved,
                messages,
            }),
            diagnostics,
        }
    }
}

fn uncaught(reason: String) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::UncaughtException, reason, &[])
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser(ruleset: RulesetConfig) -> Parser {
        let options = ParserOptions {
            ruleset,
            ..ParserOptions::default()
        };
        Parser::new(options, &FetchConfig::default()).unwrap()
    }

    const MINIMAL_V3: &str = r#"
asyncapi: 3.0.0
info:
  title: Minimal
  version: 1.0.0
components:
  messages:
    ping:
      payload:
        type: object
"#;

    #[tokio::test]
    async fn plain_string_is_uncaught_exception() {
        let output = parser(RulesetConfig::default()).parse("Not a valid schema").await;
        assert!(output.document.is_none());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::UncaughtException);
        assert!(output.diagnostics[0].message.contains("a string"));
    }

    #[tokio::test]
    async fn mapping_without_asyncapi_is_governance() {
        let output = parser(RulesetConfig::default())
            .parse(json!({"openapi": "3.0.0"}))
            .await;
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::IsAsyncApi);
    }

    #[tokio::test]
    async fn minimal_document_parses() {
        let output = parser(RulesetConfig::default()).parse(MINIMAL_V3).await;
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let document = output.document.unwrap();
        assert_eq!(document.title(), Some("Minimal"));
        assert_eq!(document.messages().len(), 1);
    }

    #[tokio::test]
    async fn recommended_warnings_do_not_block() {
        let output = parser(RulesetConfig {
            core: true,
            recommended: true,
        })
        .parse(MINIMAL_V3)
        .await;
        assert!(output.document.is_some());
        assert_eq!(output.diagnostics.len(), 2);
    }

    #[tokio::test]
    async fn core_disabled_skips_structure_checks() {
        let doc = json!({"asyncapi": "2.6.0", "components": {"messages": {"m": {}}}});
        let strict = parser(RulesetConfig::default()).parse(doc.clone()).await;
        assert!(strict.document.is_none());
        let lax = parser(RulesetConfig {
            core: false,
            recommended: false,
        })
        .parse(doc)
        .await;
        assert!(lax.document.is_some());
    }

    #[tokio::test]
    async fn relative_ref_from_inline_is_invalid_ref() {
        let doc = json!({
            "asyncapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "components": {"messages": {"m": {"$ref": "messages.yaml#/m"}}}
        });
        let output = parser(RulesetConfig::default()).parse(doc).await;
        assert!(output.document.is_none());
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::InvalidRef);
    }

    #[tokio::test]
    async fn recursive_payload_is_not_a_governance_issue() {
        let doc = json!({
            "asyncapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "components": {
                "messages": {"tree": {"payload": {"$ref": "#/components/schemas/node"}}},
                "schemas": {"node": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "integer"},
                        "children": {"type": "array", "items": {"$ref": "#/components/schemas/node"}}
                    }
                }}
            }
        });
        let output = parser(RulesetConfig::default()).parse(doc).await;
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let document = output.document.unwrap();
        let payload = document.messages()[0].payload().unwrap();
        assert_eq!(
            payload["properties"]["children"]["items"],
            json!({"$ref": "#/components/schemas/node"})
        );
    }

    #[tokio::test]
    async fn malformed_url_is_raw_error() {
        let err = parser(RulesetConfig::default())
            .parse_url("not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
