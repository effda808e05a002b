//! Text decoding for YAML and JSON documents.
//!
//! Both syntaxes decode into a `serde_json::Value` tree with mapping order
//! preserved, so message declaration order survives into the document.

use serde_json::Value;

/// Decode YAML or JSON text into a JSON value tree.
///
/// Text whose first non-blank character is `{` or `[` is read as JSON,
/// everything else as YAML.
pub(crate) fn decode_text(text: &str) -> Result<Value, String> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| format!("invalid JSON: {e}"))
    } else {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| format!("invalid YAML: {e}"))?;
        yaml_to_json(&yaml, &mut String::new()).map_err(|e| format!("invalid YAML: {e}"))
    }
}

/// Convert a YAML tree into a JSON tree.
///
/// AsyncAPI documents use only the JSON-compatible subset of YAML. Tags
/// are dropped, scalar keys are stringified, and anything else is refused
/// with the JSON Pointer of the offending node.
fn yaml_to_json(yaml: &serde_yaml::Value, pointer: &mut String) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Number(n) => {
            let number = match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => Some(i.into()),
                (None, Some(u), _) => Some(u.into()),
                (None, None, Some(f)) => serde_json::Number::from_f64(f),
                _ => None,
            };
            let number = number.ok_or_else(|| format!("{}: {n} has no JSON representation", location(pointer)))?;
            Value::Number(number)
        }
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push_str(&format!("/{index}"));
                out.push(yaml_to_json(item, pointer)?);
                pointer.truncate(len);
            }
            Value::Array(out)
        }
        Yaml::Mapping(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => return Err(format!("{}: mapping keys must be scalars", location(pointer))),
                };
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                out.insert(key, yaml_to_json(value, pointer)?);
                pointer.truncate(len);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value, pointer)?,
    })
}

fn location(pointer: &str) -> &str {
    if pointer.is_empty() {
        "(root)"
    } else {
        pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_keeps_mapping_order() {
        let value = decode_text("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn json_is_detected_by_leading_brace() {
        let value = decode_text("  {\"asyncapi\": \"3.0.0\", \"n\": 1.5}").unwrap();
        assert_eq!(value["asyncapi"], "3.0.0");
        assert_eq!(value["n"], 1.5);
    }

    #[test]
    fn yaml_scalars_convert() {
        let value = decode_text("count: 42\nenabled: true\nitems:\n  - one\n  - two\n").unwrap();
        assert_eq!(value["count"], 42);
        assert_eq!(value["enabled"], true);
        assert_eq!(value["items"][1], "two");
    }

    #[test]
    fn numeric_keys_are_stringified() {
        let value = decode_text("responses:\n  200: ok\n").unwrap();
        assert_eq!(value["responses"]["200"], "ok");
    }

    #[test]
    fn non_scalar_key_names_its_location() {
        let err = decode_text("components:\n  messages:\n    ? [a, b]\n    : {}\n").unwrap_err();
        assert_eq!(
            err,
            "invalid YAML: /components/messages: mapping keys must be scalars"
        );
    }

    #[test]
    fn pointer_segments_are_escaped() {
        let err = decode_text("channels:\n  a/b:\n    - ? {x: 1}\n      : y\n").unwrap_err();
        assert!(err.contains("/channels/a~1b/0:"), "{err}");
    }

    #[test]
    fn tags_are_dropped() {
        let value = decode_text("payload: !schema\n  type: string\n").unwrap();
        assert_eq!(value["payload"]["type"], "string");
    }

    #[test]
    fn broken_json_reports_json_error() {
        let err = decode_text("{\"asyncapi\": ").unwrap_err();
        assert!(err.starts_with("invalid JSON"));
    }

    #[test]
    fn broken_yaml_reports_yaml_error() {
        let err = decode_text("info: [unclosed").unwrap_err();
        assert!(err.starts_with("invalid YAML"));
    }
}
