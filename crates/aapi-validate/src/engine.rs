//! # Schema Engine
//!
//! Runs compiled payload schemas and renders their errors the way the JSON
//! Schema tooling most AsyncAPI users know (ajv) does:
//! `data/lumens must be >= 0`.
//!
//! Engine settings:
//! - Draft 7, which AsyncAPI schema objects extend.
//! - Every error collected, not just the first.
//! - Unknown keywords ignored (AsyncAPI adds `discriminator`, `x-*`, ...).
//! - `format` assertions enabled (date-time, email, uri, ...).
//! - Recursive payloads resolve their `$ref`s against the AsyncAPI
//!   document (see [`aapi_parser::compile_payload`]).
//!
//! `pattern` and `patternProperties` run on the `jsonschema` crate's regex
//! engine, which translates ECMA-262 syntax to Rust regex. No ASCII-only
//! mode is applied on top: `.`, negated classes and literals match by
//! Unicode scalar value, not by byte. The crate exposes no switch for this.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde_json::Value;

use crate::error::ValidationRecord;

/// Stateless compiler/runner for payload schemas.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaEngine;

impl SchemaEngine {
    /// Compile a payload schema taken from `document`.
    pub fn compile(&self, schema: &Value, document: &Value) -> Result<Validator, String> {
        aapi_parser::compile_payload(schema, document)
    }

    /// Every violation of `payload`, in engine evaluation order. Empty when
    /// the payload is valid.
    pub fn check(&self, validator: &Validator, schema: &Value, payload: &Value) -> Vec<ValidationRecord> {
        validator
            .iter_errors(payload)
            .map(|e| record(&e, schema))
            .collect()
    }
}

/// Join records into one line, separated by `", "`.
pub fn errors_text(records: &[ValidationRecord]) -> String {
    if records.is_empty() {
        return "No errors".to_string();
    }
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn record(error: &ValidationError<'_>, schema: &Value) -> ValidationRecord {
    let schema_path = error.schema_path.to_string();
    let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
    ValidationRecord {
        instance_path: error.instance_path.to_string(),
        message: describe(error, schema, &schema_path),
        schema_path,
        keyword,
    }
}

fn describe(error: &ValidationError<'_>, schema: &Value, schema_path: &str) -> String {
    match &error.kind {
        ValidationErrorKind::Minimum { limit, .. } => format!("must be >= {limit}"),
        ValidationErrorKind::Maximum { limit, .. } => format!("must be <= {limit}"),
        ValidationErrorKind::ExclusiveMinimum { limit, .. } => format!("must be > {limit}"),
        ValidationErrorKind::ExclusiveMaximum { limit, .. } => format!("must be < {limit}"),
        ValidationErrorKind::MultipleOf { multiple_of, .. } => format!("must be multiple of {multiple_of}"),
        ValidationErrorKind::MinLength { limit, .. } => {
            format!("must NOT have fewer than {limit} characters")
        }
        ValidationErrorKind::MaxLength { limit, .. } => {
            format!("must NOT have more than {limit} characters")
        }
        ValidationErrorKind::MinItems { limit, .. } => format!("must NOT have fewer than {limit} items"),
        ValidationErrorKind::MaxItems { limit, .. } => format!("must NOT have more than {limit} items"),
        ValidationErrorKind::MinProperties { limit, .. } => {
            format!("must NOT have fewer than {limit} properties")
        }
        ValidationErrorKind::MaxProperties { limit, .. } => {
            format!("must NOT have more than {limit} properties")
        }
        ValidationErrorKind::Required { property, .. } => {
            format!("must have required property '{}'", unquote(&property.to_string()))
        }
        ValidationErrorKind::Type { .. } => {
            format!("must be {}", expected_types(schema.pointer(schema_path)))
        }
        ValidationErrorKind::Format { format, .. } => format!("must match format \"{format}\""),
        ValidationErrorKind::Pattern { pattern, .. } => format!("must match pattern \"{pattern}\""),
        ValidationErrorKind::Enum { .. } => "must be equal to one of the allowed values".to_string(),
        ValidationErrorKind::Constant { .. } => "must be equal to constant".to_string(),
        ValidationErrorKind::AdditionalProperties { .. } => "must NOT have additional properties".to_string(),
        ValidationErrorKind::UniqueItems { .. } => "must NOT have duplicate items".to_string(),
        ValidationErrorKind::AnyOf { .. } => "must match a schema in anyOf".to_string(),
        ValidationErrorKind::OneOfNotValid { .. } | ValidationErrorKind::OneOfMultipleValid { .. } => {
            "must match exactly one schema in oneOf".to_string()
        }
        ValidationErrorKind::Not { .. } => "must NOT be valid".to_string(),
        ValidationErrorKind::FalseSchema { .. } => "boolean schema is false".to_string(),
        ValidationErrorKind::Contains { .. } => "must contain at least 1 valid item(s)".to_string(),
        _ => error.to_string(),
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

/// `type` keyword value rendered as ajv does: `integer` or `string,null`.
fn expected_types(type_keyword: Option<&Value>) -> String {
    match type_keyword {
        Some(Value::String(ty)) => ty.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        _ => "of the declared type".to_string(),
    }
}
