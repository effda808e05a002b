//! # Schema Formats
//!
//! Message payloads may be written in dialects other than the native
//! AsyncAPI schema. A [`SchemaFormat`] plugin recognises one family of
//! `schemaFormat` identifiers and converts payloads into plain JSON Schema.
//!
//! Built in:
//! - [`AsyncApiSchemaFormat`]: native AsyncAPI / JSON Schema, passed through.
//! - [`OpenApiSchemaFormat`]: OpenAPI 3.0 schema objects.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Converts payload schemas of one dialect into JSON Schema.
pub trait SchemaFormat: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this plugin handles the (normalised, lowercase, no
    /// whitespace) `schemaFormat` identifier.
    fn supports(&self, schema_format: &str) -> bool;

    /// Convert `schema` into a JSON Schema value.
    fn to_json_schema(&self, schema: &Value) -> Result<Value, String>;
}

/// Native AsyncAPI schema objects and raw JSON Schema draft-07.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncApiSchemaFormat;

impl SchemaFormat for AsyncApiSchemaFormat {
    fn name(&self) -> &'static str {
        "asyncapi"
    }

    fn supports(&self, schema_format: &str) -> bool {
        ["application/vnd.aai.asyncapi", "application/schema"]
            .iter()
            .any(|prefix| {
                schema_format
                    .strip_prefix(prefix)
                    .is_some_and(|rest| matches!(rest.split(';').next(), Some("" | "+json" | "+yaml")))
            })
    }

    fn to_json_schema(&self, schema: &Value) -> Result<Value, String> {
        Ok(schema.clone())
    }
}

/// OpenAPI 3.0.x schema objects.
///
/// `nullable: true` becomes a `"null"` member of `type` (and of `enum`, when
/// present). Boolean `exclusiveMinimum`/`exclusiveMaximum` flags become
/// Draft 7 numeric limits. OpenAPI-only annotations are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenApiSchemaFormat;

const OPENAPI_ONLY_KEYWORDS: [&str; 6] = [
    "nullable",
    "discriminator",
    "xml",
    "externalDocs",
    "example",
    "deprecated",
];

impl SchemaFormat for OpenApiSchemaFormat {
    fn name(&self) -> &'static str {
        "openapi"
    }

    fn supports(&self, schema_format: &str) -> bool {
        schema_format
            .strip_prefix("application/vnd.oai.openapi")
            .is_some_and(|rest| {
                let (media, version) = rest.split_once(";version=").unwrap_or((rest, "3.0.0"));
                matches!(media, "" | "+json" | "+yaml") && version.starts_with("3.0")
            })
    }

    fn to_json_schema(&self, schema: &Value) -> Result<Value, String> {
        Ok(convert_openapi(schema))
    }
}

fn convert_openapi(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        if OPENAPI_ONLY_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        let converted = match key.as_str() {
            "exclusiveMinimum" | "exclusiveMaximum" => continue,
            "properties" | "patternProperties" | "definitions" | "$defs" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, sub)| (name.clone(), convert_openapi(sub)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" | "additionalProperties" | "not" => convert_openapi(value),
            "allOf" | "anyOf" | "oneOf" => match value {
                Value::Array(subs) => Value::Array(subs.iter().map(convert_openapi).collect()),
                other => other.clone(),
            },
            _ => value.clone(),
        };
        out.insert(key.clone(), converted);
    }

    exclusive_bound(map, &mut out, "minimum", "exclusiveMinimum");
    exclusive_bound(map, &mut out, "maximum", "exclusiveMaximum");

    if map.get("nullable") == Some(&Value::Bool(true)) {
        if let Some(Value::String(ty)) = out.get("type").cloned() {
            out.insert("type".into(), Value::Array(vec![Value::String(ty), "null".into()]));
        }
        if let Some(Value::Array(options)) = out.get_mut("enum") {
            if !options.contains(&Value::Null) {
                options.push(Value::Null);
            }
        }
    }

    Value::Object(out)
}

/// OpenAPI 3.0 flags an inclusive bound as exclusive with a boolean;
/// Draft 7 wants the limit itself under the exclusive keyword.
fn exclusive_bound(source: &Map<String, Value>, out: &mut Map<String, Value>, bound: &str, exclusive: &str) {
    match source.get(exclusive) {
        Some(Value::Bool(true)) => {
            if let Some(limit) = out.remove(bound) {
                out.insert(exclusive.to_string(), limit);
            }
        }
        Some(Value::Bool(false)) | None => {}
        // Already a Draft 6+ numeric limit.
        Some(other) => {
            out.insert(exclusive.to_string(), other.clone());
        }
    }
}

/// Registered schema-format plugins, consulted in registration order.
#[derive(Debug, Clone)]
pub struct SchemaFormats {
    plugins: Vec<Arc<dyn SchemaFormat>>,
}

impl Default for SchemaFormats {
    /// Native formats plus the OpenAPI plugin.
    fn default() -> Self {
        Self::native().with(OpenApiSchemaFormat)
    }
}

impl SchemaFormats {
    /// Only the native AsyncAPI / JSON Schema formats.
    pub fn native() -> Self {
        Self {
            plugins: vec![Arc::new(AsyncApiSchemaFormat)],
        }
    }

    /// Register an additional plugin.
    #[must_use]
    pub fn with(mut self, plugin: impl SchemaFormat + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Find the plugin for a raw `schemaFormat` value.
    pub fn find(&self, schema_format: &str) -> Option<&dyn SchemaFormat> {
        let normalized = normalize_format(schema_format);
        self.plugins
            .iter()
            .find(|plugin| plugin.supports(&normalized))
            .map(|plugin| plugin.as_ref())
    }
}

fn normalize_format(schema_format: &str) -> String {
    schema_format
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// The format assumed when a message does not declare one.
pub fn default_schema_format(asyncapi_version: &str) -> String {
    format!("application/vnd.aai.asyncapi;version={asyncapi_version}")
}
