//! # Rulesets
//!
//! Structural checks run over the dereferenced document.
//!
//! The core ruleset covers what the validator needs to trust the document:
//! a supported `asyncapi` version, well-formed `info`, `channels` and
//! `components`, and message payloads that convert and compile as JSON
//! Schema. The recommended ruleset adds style warnings and is off by
//! default.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::diagnostic::{child_path, Diagnostic, DiagnosticCode};
use crate::document::{AsyncApiVersion, Message};
use crate::formats::{default_schema_format, SchemaFormats};
use crate::schema::compile_payload;

/// Which rule families run during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesetConfig {
    /// Structural rules; failures are errors.
    pub core: bool,
    /// Style rules; failures are warnings.
    pub recommended: bool,
}

impl Default for RulesetConfig {
    fn default() -> Self {
        Self {
            core: true,
            recommended: false,
        }
    }
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| (*s).to_string()).collect()
}

/// Read and validate the `asyncapi` field. Runs regardless of configuration.
pub(crate) fn check_asyncapi_field(doc: &Value) -> Result<AsyncApiVersion, Diagnostic> {
    match doc.get("asyncapi") {
        Some(Value::String(version)) => version.parse().map_err(|reason: String| {
            Diagnostic::error(DiagnosticCode::IsAsyncApi, reason, &path(&["asyncapi"]))
        }),
        Some(_) => Err(Diagnostic::error(
            DiagnosticCode::IsAsyncApi,
            "The \"asyncapi\" field must be a string.",
            &path(&["asyncapi"]),
        )),
        None => Err(Diagnostic::error(
            DiagnosticCode::IsAsyncApi,
            "This is not an AsyncAPI document. The \"asyncapi\" field as string is missing.",
            &[],
        )),
    }
}

/// Run the core structural rules.
pub(crate) fn run_core(doc: &Value, version: AsyncApiVersion) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_info(doc, &mut diagnostics);
    check_channels(doc, version, &mut diagnostics);
    if let Some(messages) = check_components(doc, &mut diagnostics) {
        check_message_shapes(messages, &mut diagnostics);
        if version.is_v2() {
            check_message_id_uniqueness(messages, &mut diagnostics);
        }
    }
    diagnostics
}

fn check_info(doc: &Value, diagnostics: &mut Vec<Diagnostic>) {
    let info = match doc.get("info") {
        Some(Value::Object(info)) => info,
        Some(_) => {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::Info,
                "\"info\" must be an object.",
                &path(&["info"]),
            ));
            return;
        }
        None => {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::Info,
                "\"info\" property is required.",
                &[],
            ));
            return;
        }
    };
    for field in ["title", "version"] {
        if !info.get(field).is_some_and(Value::is_string) {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::Info,
                format!("\"info.{field}\" is required and must be a string."),
                &path(&["info", field]),
            ));
        }
    }
}

fn check_channels(doc: &Value, version: AsyncApiVersion, diagnostics: &mut Vec<Diagnostic>) {
    match doc.get("channels") {
        Some(Value::Object(_)) => {}
        Some(_) => diagnostics.push(Diagnostic::error(
            DiagnosticCode::Channels,
            "\"channels\" must be an object.",
            &path(&["channels"]),
        )),
        None if version.is_v2() => diagnostics.push(Diagnostic::error(
            DiagnosticCode::Channels,
            "\"channels\" property is required.",
            &[],
        )),
        None => {}
    }
}

/// Returns `components.messages` when it is well-formed.
fn check_components<'a>(doc: &'a Value, diagnostics: &mut Vec<Diagnostic>) -> Option<&'a Map<String, Value>> {
    let components = match doc.get("components")? {
        Value::Object(components) => components,
        _ => {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::Components,
                "\"components\" must be an object.",
                &path(&["components"]),
            ));
            return None;
        }
    };
    match components.get("messages")? {
        Value::Object(messages) => Some(messages),
        _ => {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::Components,
                "\"components.messages\" must be an object.",
                &path(&["components", "messages"]),
            ));
            None
        }
    }
}

fn check_message_shapes(messages: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    for (key, message) in messages {
        let message_path = path(&["components", "messages", key]);
        let Value::Object(message) = message else {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::Components,
                format!("Message \"{key}\" must be an object."),
                &message_path,
            ));
            continue;
        };
        if let Some(payload) = message.get("payload") {
            if !(payload.is_object() || payload.is_boolean()) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::MessagePayload,
                    format!("Payload of message \"{key}\" must be a schema object or boolean."),
                    &child_path(&message_path, "payload"),
                ));
            }
        }
    }
}

fn check_message_id_uniqueness(messages: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    let mut first_seen: HashMap<&str, &str> = HashMap::new();
    for (key, message) in messages {
        let Some(message_id) = message.get("messageId").and_then(Value::as_str) else {
            continue;
        };
        if let Some(previous) = first_seen.insert(message_id, key) {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::MessageIdUniqueness,
                format!(
                    "\"messageId\" must be unique across all the messages: \"{message_id}\" is also used by \"{previous}\"."
                ),
                &path(&["components", "messages", key, "messageId"]),
            ));
        }
    }
}

/// Run the recommended style rules. Findings are warnings.
pub(crate) fn run_recommended(doc: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let Some(info) = doc.get("info").and_then(Value::as_object) else {
        return diagnostics;
    };
    if !info.get("description").is_some_and(Value::is_string) {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::InfoDescription,
            "Info \"description\" should be present and non-empty string.",
            &path(&["info"]),
        ));
    }
    if !info.contains_key("contact") {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::InfoContact,
            "Info object should contain \"contact\" object.",
            &path(&["info"]),
        ));
    }
    diagnostics
}

/// Build [`Message`]s from `components.messages`, converting payloads
/// through the registered schema formats.
///
/// With `check_payloads`, each converted payload must also compile as a
/// JSON Schema (`asyncapi-payload`). Messages whose payload cannot be
/// converted are omitted and reported.
pub(crate) fn extract_messages(
    doc: &Value,
    version: AsyncApiVersion,
    formats: &SchemaFormats,
    check_payloads: bool,
) -> (Vec<Message>, Vec<Diagnostic>) {
    let mut messages = Vec::new();
    let mut diagnostics = Vec::new();
    let Some(declared) = doc.pointer("/components/messages").and_then(Value::as_object) else {
        return (messages, diagnostics);
    };

    for (key, value) in declared {
        let Value::Object(message) = value else {
            continue;
        };
        let message_path = path(&["components", "messages", key]);
        match build_message(doc, key, message, version, formats, &message_path, check_payloads) {
            Ok(built) => messages.push(built),
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    (messages, diagnostics)
}

fn build_message(
    doc: &Value,
    key: &str,
    message: &Map<String, Value>,
    version: AsyncApiVersion,
    formats: &SchemaFormats,
    message_path: &[String],
    check_payloads: bool,
) -> Result<Message, Diagnostic> {
    let id = if version.is_v2() {
        message
            .get("messageId")
            .and_then(Value::as_str)
            .unwrap_or(key)
    } else {
        key
    };
    let name = message.get("name").and_then(Value::as_str).map(str::to_string);

    let (schema_format, raw_payload, format_path) = declared_payload(message, version, message_path);
    let schema_format = schema_format.unwrap_or_else(|| default_schema_format(&version.to_string()));

    let payload = match raw_payload {
        None => None,
        Some(raw) => {
            let plugin = formats.find(&schema_format).ok_or_else(|| {
                Diagnostic::error(
                    DiagnosticCode::SchemaFormat,
                    format!("Unknown schema format: \"{schema_format}\"."),
                    &format_path,
                )
            })?;
            let converted = plugin.to_json_schema(raw).map_err(|reason| {
                Diagnostic::error(
                    DiagnosticCode::SchemaFormat,
                    format!("Payload of message \"{key}\" could not be converted from {}: {reason}", plugin.name()),
                    &child_path(message_path, "payload"),
                )
            })?;
            if check_payloads {
                compile_check(key, &converted, doc, message_path)?;
            }
            Some(converted)
        }
    };

    Ok(Message {
        key: key.to_string(),
        id: Some(id.to_string()),
        name,
        schema_format,
        payload,
    })
}

/// Splits a message into (declared format, raw payload, path of the format
/// declaration). 3.x payloads may be multi-format schema objects.
fn declared_payload<'a>(
    message: &'a Map<String, Value>,
    version: AsyncApiVersion,
    message_path: &[String],
) -> (Option<String>, Option<&'a Value>, Vec<String>) {
    let payload = message.get("payload");
    if version.is_v3() {
        if let Some(Value::Object(multi)) = payload {
            if let (Some(Value::String(format)), Some(schema)) = (multi.get("schemaFormat"), multi.get("schema")) {
                let format_path = child_path(&child_path(message_path, "payload"), "schemaFormat");
                return (Some(format.clone()), Some(schema), format_path);
            }
        }
        return (None, payload, child_path(message_path, "payload"));
    }
    let format = message.get("schemaFormat").and_then(Value::as_str).map(str::to_string);
    (format, payload, child_path(message_path, "schemaFormat"))
}

fn compile_check(key: &str, schema: &Value, document: &Value, message_path: &[String]) -> Result<(), Diagnostic> {
    compile_payload(schema, document).map(|_| ()).map_err(|reason| {
        Diagnostic::error(
            DiagnosticCode::Payload,
            format!("Payload of message \"{key}\" is not a valid JSON Schema: {reason}"),
            &child_path(message_path, "payload"),
        )
    })
}
