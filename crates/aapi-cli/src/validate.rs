//! # Validate Subcommand
//!
//! `aapi validate --file asyncapi.yaml --message lightMeasured payload.json`
//!
//! The payload is read from a file, or from stdin when given as `-` or
//! omitted.

use std::io::Read;
use std::path::{Path, PathBuf};

use aapi_validate::{ValidateError, ValidationRecord};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::source::{rejection, Rejection, RulesetArgs, SourceArgs};

/// Arguments for the `aapi validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub rules: RulesetArgs,

    /// Message id or name to validate against.
    #[arg(short, long, value_name = "KEY")]
    pub message: String,

    /// JSON payload file, or `-` for stdin.
    #[arg(value_name = "PAYLOAD", default_value = "-")]
    pub payload: PathBuf,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one `validate` run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidateReport {
    Valid {
        message: String,
    },
    Invalid {
        message: String,
        summary: String,
        errors: Vec<ValidationRecord>,
    },
    MessageNotFound {
        message: String,
        error: String,
    },
    SchemaError {
        message: String,
        error: String,
    },
    Rejected(Rejection),
}

impl ValidateReport {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Valid { .. } => 0,
            _ => 1,
        }
    }

    fn print_text(&self) {
        match self {
            Self::Valid { message } => println!("valid: payload conforms to message '{message}'"),
            Self::Invalid { message, summary, .. } => {
                println!("INVALID ({message}): {summary}");
            }
            Self::MessageNotFound { message, error } | Self::SchemaError { message, error } => {
                println!("ERROR ({message}): {error}");
            }
            Self::Rejected(rejected) => rejected.print_text(),
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the payload is valid, 1 otherwise.
pub async fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let payload = read_payload(&args.payload)?;
    let report = validate_report(args, &payload).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text();
    }
    Ok(report.exit_code())
}

/// Resolve the document and validate `payload` against `args.message`.
pub async fn validate_report(args: &ValidateArgs, payload: &Value) -> Result<ValidateReport> {
    tracing::debug!(source = %args.source.describe(), message = %args.message, "validating payload");

    let validator = match args.source.resolve(&args.rules).await {
        Ok(validator) => validator,
        Err(err) => return Ok(ValidateReport::Rejected(rejection(err)?)),
    };

    let message = args.message.clone();
    let report = match validator.validate(&args.message, payload) {
        Ok(_) => ValidateReport::Valid { message },
        Err(ValidateError::Invalid { summary, errors, .. }) => ValidateReport::Invalid {
            message,
            summary,
            errors,
        },
        Err(err @ ValidateError::MessageNotFound { .. }) => ValidateReport::MessageNotFound {
            message,
            error: err.to_string(),
        },
        Err(err @ ValidateError::SchemaCompile { .. }) => ValidateReport::SchemaError {
            message,
            error: err.to_string(),
        },
    };
    Ok(report)
}

fn read_payload(path: &Path) -> Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display()))?
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STREETLIGHTS: &str = r#"
asyncapi: 3.0.0
info:
  title: Streetlights
  version: 1.0.0
components:
  messages:
    lightMeasured:
      name: lightMeasured
      payload:
        type: object
        properties:
          lumens:
            type: integer
            minimum: 0
"#;

    fn args(file: PathBuf, message: &str) -> ValidateArgs {
        ValidateArgs {
            source: SourceArgs {
                file: Some(file),
                url: None,
            },
            rules: RulesetArgs::default(),
            message: message.to_string(),
            payload: PathBuf::from("-"),
            json: false,
        }
    }

    fn write_doc(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("asyncapi.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn valid_payload_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_doc(&dir, STREETLIGHTS);
        let report = validate_report(&args(file, "lightMeasured"), &json!({"lumens": 5}))
            .await
            .unwrap();
        assert!(matches!(report, ValidateReport::Valid { .. }));
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn invalid_payload_reports_summary() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_doc(&dir, STREETLIGHTS);
        let report = validate_report(&args(file, "lightMeasured"), &json!({"lumens": -100}))
            .await
            .unwrap();
        let ValidateReport::Invalid { summary, errors, .. } = &report else {
            panic!("expected Invalid, got {report:?}");
        };
        assert_eq!(summary, "data/lumens must be >= 0");
        assert_eq!(errors.len(), 1);
        assert_eq!(report.exit_code(), 1);

        let rendered = serde_json::to_value(&report).unwrap();
        assert_eq!(rendered["status"], "invalid");
        assert_eq!(rendered["errors"][0]["keyword"], "minimum");
    }

    #[tokio::test]
    async fn unknown_message_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_doc(&dir, STREETLIGHTS);
        let report = validate_report(&args(file, "wrong-key"), &json!({}))
            .await
            .unwrap();
        assert!(matches!(report, ValidateReport::MessageNotFound { .. }));
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn rejected_document_carries_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_doc(&dir, "asyncapi: 3.0.0\ninfo:\n  title: No version\n");
        let report = validate_report(&args(file, "lightMeasured"), &json!({}))
            .await
            .unwrap();
        let ValidateReport::Rejected(rejected) = &report else {
            panic!("expected Rejected, got {report:?}");
        };
        assert!(!rejected.diagnostics.is_empty());
        let rendered = serde_json::to_value(&report).unwrap();
        assert_eq!(rendered["status"], "rejected");
        assert_eq!(rendered["diagnostics"][0]["code"], "asyncapi-info");
    }

    #[tokio::test]
    async fn missing_document_is_operational_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_report(&args(dir.path().join("absent.yaml"), "x"), &json!({})).await;
        assert!(result.is_err());
    }

    #[test]
    fn payload_must_be_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, "lumens: 5").unwrap();
        assert!(read_payload(&path).is_err());
        std::fs::write(&path, r#"{"lumens": 5}"#).unwrap();
        assert_eq!(read_payload(&path).unwrap(), json!({"lumens": 5}));
    }
}
