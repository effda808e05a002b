//! # Payload Schema Compilation
//!
//! Message payloads are dereferenced before they reach the engine, except
//! for recursive schemas: their back edge stays a fragment-only `$ref`
//! (`#/components/schemas/node`) pointing into the AsyncAPI document rather
//! than into the payload. [`compile_payload`] rebases those references onto
//! [`DOCUMENT_URI`] and serves the dereferenced document from memory, so no
//! network request is ever made for them.
//!
//! Engine settings: Draft 7, `format` assertions on, unknown keywords
//! ignored.

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::{Map, Value};

/// URI the dereferenced AsyncAPI document is served under during
/// compilation. Never fetched.
pub const DOCUMENT_URI: &str = "https://aapi.invalid/asyncapi.json";

/// Resolves [`DOCUMENT_URI`] to the in-memory document and refuses
/// everything else.
struct DocumentRetriever {
    document: Value,
}

impl Retrieve for DocumentRetriever {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let base = uri_str.split_once('#').map_or(uri_str, |(base, _)| base);
        if base == DOCUMENT_URI {
            return Ok(self.document.clone());
        }
        Err(format!("'{uri_str}' is not available: only the AsyncAPI document itself can be referenced").into())
    }
}

/// Compile a message payload schema. `document` is the dereferenced
/// AsyncAPI document the payload was taken from.
///
/// # Errors
///
/// The engine's message if the schema is not a valid Draft 7 schema.
pub fn compile_payload(payload: &Value, document: &Value) -> Result<Validator, String> {
    let mut opts = jsonschema::options();
    opts.with_draft(Draft::Draft7)
        .should_validate_formats(true)
        .with_retriever(DocumentRetriever {
            document: document.clone(),
        });
    opts.build(&rebase_local_refs(payload)).map_err(|e| e.to_string())
}

/// Copy of `schema` with every fragment-only `$ref` prefixed by
/// [`DOCUMENT_URI`].
fn rebase_local_refs(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let rebased = match (key.as_str(), value) {
                    ("$ref", Value::String(reference)) if reference.starts_with('#') => {
                        Value::String(format!("{DOCUMENT_URI}{reference}"))
                    }
                    _ => rebase_local_refs(value),
                };
                out.insert(key.clone(), rebased);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(rebase_local_refs).collect()),
        other => other.clone(),
    }
}
