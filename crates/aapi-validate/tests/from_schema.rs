//! Resolving documents from memory.

mod common;

use aapi_validate::{DiagnosticCode, ResolveError, ValidateError};
use common::*;

#[tokio::test]
async fn parses_every_valid_fixture_text() {
    for name in VALID_FIXTURES {
        let validator = aapi_validate::from_schema(read_fixture(name)).await;
        assert!(validator.is_ok(), "{name}: {:?}", validator.err());
    }
}

#[tokio::test]
async fn parses_a_decoded_value() {
    let value: serde_json::Value =
        serde_json::from_str(&read_fixture("valid-schema-3.0.0.json")).unwrap();
    let validator = aapi_validate::from_schema(value).await.unwrap();
    assert!(validator
        .validate("lightMeasured", &valid_light_payload())
        .unwrap());
}

#[tokio::test]
async fn invalid_text_has_governance_issues() {
    for name in INVALID_FIXTURES {
        let err = aapi_validate::from_schema(read_fixture(name))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Governance { .. }), "{name}: {err:?}");
    }
}

#[tokio::test]
async fn plain_text_is_not_an_asyncapi_schema() {
    let err = aapi_validate::from_schema("Not a valid schema")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Your schema is not an AsyncAPI schema.");
    assert_eq!(err.diagnostics()[0].code, DiagnosticCode::UncaughtException);
}

#[tokio::test]
async fn unreadable_json_is_not_an_asyncapi_schema() {
    let err = aapi_validate::from_schema("{\"asyncapi\": \"3.0.0\",")
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotAsyncApi { .. }));
}

#[tokio::test]
async fn unsupported_version_is_a_governance_issue() {
    let err = aapi_validate::from_schema("asyncapi: 1.2.0\ninfo:\n  title: Old\n  version: 1.0.0\n")
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Governance { .. }));
    assert_eq!(err.diagnostics()[0].code, DiagnosticCode::IsAsyncApi);
}

#[tokio::test]
async fn validates_payloads_from_text() {
    for name in VALID_FIXTURES {
        let validator = aapi_validate::from_schema(read_fixture(name)).await.unwrap();
        assert!(validator
            .validate("lightMeasured", &valid_light_payload())
            .unwrap());
        let err = validator
            .validate("lightMeasured", &negative_light_payload())
            .unwrap_err();
        assert_eq!(err.to_string(), "data/lumens must be >= 0");
        let err = validator
            .validate("wrong-key", &valid_light_payload())
            .unwrap_err();
        assert!(matches!(err, ValidateError::MessageNotFound { .. }));
    }
}

#[tokio::test]
async fn resolving_twice_behaves_identically() {
    let text = read_fixture("valid-schema-3.0.0.yaml");
    let a = aapi_validate::from_schema(text.as_str()).await.unwrap();
    let b = aapi_validate::from_schema(text.as_str()).await.unwrap();
    for payload in [valid_light_payload(), negative_light_payload(), serde_json::json!("x")] {
        for key in ["lightMeasured", "turnOnOff", "heartbeat", "wrong-key"] {
            assert_eq!(a.validate(key, &payload), b.validate(key, &payload), "{key}");
        }
    }
}
