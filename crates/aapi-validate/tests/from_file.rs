//! Resolving documents from disk.

mod common;

use aapi_validate::{ResolveError, ValidateError};
use common::*;

#[tokio::test]
async fn parses_every_valid_fixture() {
    for name in VALID_FIXTURES {
        let validator = aapi_validate::from_file(fixture(name)).await;
        assert!(validator.is_ok(), "{name}: {:?}", validator.err());
    }
}

#[tokio::test]
async fn invalid_documents_have_governance_issues() {
    for name in INVALID_FIXTURES {
        let err = aapi_validate::from_file(fixture(name)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your schema and/or referenced documents have governance issues.",
            "{name}"
        );
        assert!(!err.diagnostics().is_empty());
    }
}

#[tokio::test]
async fn missing_file_is_raw_io_error() {
    let path = fixture("not-existing-schema.yaml");
    let err = aapi_validate::from_file(&path).await.unwrap_err();
    match err {
        ResolveError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[tokio::test]
async fn validates_a_conforming_payload() {
    for name in VALID_FIXTURES {
        let validator = aapi_validate::from_file(fixture(name)).await.unwrap();
        assert!(
            validator.validate("lightMeasured", &valid_light_payload()).unwrap(),
            "{name}"
        );
    }
}

#[tokio::test]
async fn rejects_a_negative_lumens_payload() {
    for name in VALID_FIXTURES {
        let validator = aapi_validate::from_file(fixture(name)).await.unwrap();
        let err = validator
            .validate("lightMeasured", &negative_light_payload())
            .unwrap_err();
        assert_eq!(err.to_string(), "data/lumens must be >= 0", "{name}");
        match err {
            ValidateError::Invalid { key, errors, .. } => {
                assert_eq!(key, "lightMeasured");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].instance_path, "/lumens");
                assert_eq!(errors[0].keyword, "minimum");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn unknown_key_is_a_lookup_failure() {
    for name in VALID_FIXTURES {
        let validator = aapi_validate::from_file(fixture(name)).await.unwrap();
        let err = validator
            .validate("wrong-key", &valid_light_payload())
            .unwrap_err();
        assert!(matches!(err, ValidateError::MessageNotFound { .. }), "{name}");
        assert_eq!(err.to_string(), "No messages found for the given key");
    }
}

#[tokio::test]
async fn openapi_payloads_are_converted() {
    let validator = aapi_validate::from_file(fixture("openapi-payload-2.6.0.yaml"))
        .await
        .unwrap();
    let ok = serde_json::json!({"displayName": null, "email": "alice@example.com"});
    assert!(validator.validate("user.signedup", &ok).unwrap());
    assert!(validator.validate("UserSignedUp", &ok).unwrap());

    let err = validator
        .validate("user.signedup", &serde_json::json!({"email": "not-an-email"}))
        .unwrap_err();
    assert_eq!(err.to_string(), "data/email must match format \"email\"");
}

#[tokio::test]
async fn openapi_exclusive_bounds_are_enforced() {
    let validator = aapi_validate::from_file(fixture("openapi-payload-2.6.0.yaml"))
        .await
        .unwrap();
    assert!(validator
        .validate("light.reading", &serde_json::json!({"lumens": 1}))
        .unwrap());
    assert!(validator
        .validate("light.reading", &serde_json::json!({"lumens": 100000}))
        .unwrap());

    let err = validator
        .validate("light.reading", &serde_json::json!({"lumens": 0}))
        .unwrap_err();
    assert_eq!(err.to_string(), "data/lumens must be > 0");
}
