//! Shared fixtures for the resolver integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::{json, Value};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}

pub const VALID_FIXTURES: [&str; 4] = [
    "valid-schema-3.0.0.yaml",
    "valid-schema-3.0.0.json",
    "valid-schema-2.0.0.yaml",
    "valid-schema-2.0.0.json",
];

pub const INVALID_FIXTURES: [&str; 2] = ["invalid-schema-3.0.0.yaml", "invalid-schema-3.0.0.json"];

pub fn valid_light_payload() -> Value {
    json!({"lumens": 500, "sendAt": "2020-08-06T15:00:00+00:00"})
}

pub fn negative_light_payload() -> Value {
    json!({"lumens": -100, "sendAt": "2020-08-06T15:00:00+00:00"})
}
