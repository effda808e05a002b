//! # Message Validator
//!
//! Binds a parsed document to payload validation keyed by message id or
//! name. Validation is synchronous and touches no shared mutable state, so
//! one validator can be cloned into any number of tasks.

use std::sync::Arc;

use aapi_parser::{AsyncApiDocument, Message};
use serde_json::Value;

use crate::engine::{errors_text, SchemaEngine};
use crate::error::ValidateError;

/// Validates payloads against the messages of one AsyncAPI document.
///
/// Cloning is cheap; clones share the document.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    document: Arc<AsyncApiDocument>,
    engine: SchemaEngine,
}

impl MessageValidator {
    /// Wrap a successfully parsed document.
    pub fn new(document: AsyncApiDocument) -> Self {
        Self {
            document: Arc::new(document),
            engine: SchemaEngine,
        }
    }

    pub fn document(&self) -> &AsyncApiDocument {
        &self.document
    }

    /// First message, in declaration order, whose id or name equals `key`.
    pub fn find_message(&self, key: &str) -> Option<&Message> {
        self.document.messages().iter().find(|m| m.matches(key))
    }

    /// Validate `payload` against the schema of the message `key`.
    ///
    /// Messages without a payload schema accept any payload. The schema is
    /// compiled on every call.
    ///
    /// # Errors
    ///
    /// - [`ValidateError::MessageNotFound`] if no message matches `key`.
    /// - [`ValidateError::Invalid`] with every violation if the payload
    ///   does not conform.
    /// - [`ValidateError::SchemaCompile`] if the schema does not compile.
    pub fn validate(&self, key: &str, payload: &Value) -> Result<bool, ValidateError> {
        let Some(message) = self.find_message(key) else {
            tracing::debug!(key, "no message matches key");
            return Err(ValidateError::MessageNotFound { key: key.to_string() });
        };

        let empty = Value::Object(serde_json::Map::new());
        let schema = message.payload().unwrap_or(&empty);

        let compiled = self
            .engine
            .compile(schema, self.document.json())
            .map_err(|reason| ValidateError::SchemaCompile {
                key: key.to_string(),
                reason,
            })?;

        let errors = self.engine.check(&compiled, schema, payload);
        if errors.is_empty() {
            return Ok(true);
        }

        Err(ValidateError::Invalid {
            key: key.to_string(),
            summary: errors_text(&errors),
            errors,
        })
    }

    /// [`validate`](Self::validate) for any serializable payload.
    ///
    /// # Errors
    ///
    /// As [`validate`](Self::validate); a payload that cannot be
    /// represented as JSON is reported as [`ValidateError::Invalid`] at the
    /// root.
    pub fn validate_serialized<T: serde::Serialize>(&self, key: &str, payload: &T) -> Result<bool, ValidateError> {
        match serde_json::to_value(payload) {
            Ok(value) => self.validate(key, &value),
            Err(e) => {
                let record = crate::error::ValidationRecord {
                    instance_path: String::new(),
                    schema_path: String::new(),
                    keyword: "serialize".to_string(),
                    message: format!("cannot be represented as JSON: {e}"),
                };
                Err(ValidateError::Invalid {
                    key: key.to_string(),
                    summary: record.to_string(),
                    errors: vec![record],
                })
            }
        }
    }
}
