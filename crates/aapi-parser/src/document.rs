//! # Parsed Documents
//!
//! [`AsyncApiDocument`] is the read-only result of a successful parse: the
//! fully dereferenced document tree plus the messages declared under
//! `components.messages`, in declaration order.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Versions this parser accepts.
pub const SUPPORTED_VERSIONS: [&str; 8] = [
    "2.0.0", "2.1.0", "2.2.0", "2.3.0", "2.4.0", "2.5.0", "2.6.0", "3.0.0",
];

/// A supported AsyncAPI specification version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AsyncApiVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl AsyncApiVersion {
    pub fn is_v2(&self) -> bool {
        self.major == 2
    }

    pub fn is_v3(&self) -> bool {
        self.major == 3
    }
}

impl FromStr for AsyncApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !SUPPORTED_VERSIONS.contains(&s) {
            return Err(format!(
                "version \"{s}\" is not supported; supported versions are {}",
                SUPPORTED_VERSIONS.join(", ")
            ));
        }
        let mut parts = s.split('.').map(str::parse::<u8>);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch))) => Ok(Self { major, minor, patch }),
            _ => Err(format!("malformed version \"{s}\"")),
        }
    }
}

impl fmt::Display for AsyncApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A message declared under `components.messages`.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub(crate) key: String,
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) schema_format: String,
    pub(crate) payload: Option<Value>,
}

impl Message {
    /// Key under `components.messages`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `messageId` for 2.x documents that declare one, otherwise the
    /// component key.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The message's `name` field.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `schemaFormat` the payload was declared in.
    pub fn schema_format(&self) -> &str {
        &self.schema_format
    }

    /// Payload as plain JSON Schema, already converted from its declared
    /// format. `None` when the message declares no payload.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// True when `key` equals this message's id or name.
    pub fn matches(&self, key: &str) -> bool {
        self.id() == Some(key) || self.name() == Some(key)
    }
}

/// A successfully parsed AsyncAPI document. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncApiDocument {
    pub(crate) version: AsyncApiVersion,
    pub(crate) json: Value,
    pub(crate) messages: Vec<Message>,
}

impl AsyncApiDocument {
    pub fn version(&self) -> AsyncApiVersion {
        self.version
    }

    /// The dereferenced document tree.
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// `info.title`, when present.
    pub fn title(&self) -> Option<&str> {
        self.json.pointer("/info/title").and_then(Value::as_str)
    }

    /// Messages from `components.messages` in declaration order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
