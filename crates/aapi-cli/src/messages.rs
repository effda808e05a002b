//! # Messages Subcommand
//!
//! Lists the messages of a document in declaration order, with the keys a
//! payload can be validated under.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::source::{rejection, Rejection, RulesetArgs, SourceArgs};

/// Arguments for the `aapi messages` subcommand.
#[derive(Args, Debug)]
pub struct MessagesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub rules: RulesetArgs,

    /// Emit the listing as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One message row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    pub key: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub schema_format: String,
    pub has_payload: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessagesReport {
    Resolved {
        version: String,
        title: Option<String>,
        messages: Vec<MessageSummary>,
    },
    Rejected(Rejection),
}

impl MessagesReport {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Resolved { .. } => 0,
            Self::Rejected(_) => 1,
        }
    }

    fn print_text(&self) {
        match self {
            Self::Resolved {
                version,
                title,
                messages,
            } => {
                println!(
                    "{} (AsyncAPI {version}): {} message(s)",
                    title.as_deref().unwrap_or("untitled"),
                    messages.len()
                );
                for m in messages {
                    println!(
                        "  {:<24} id={:<24} name={:<24} {}",
                        m.key,
                        m.id.as_deref().unwrap_or("-"),
                        m.name.as_deref().unwrap_or("-"),
                        if m.has_payload { m.schema_format.as_str() } else { "(no payload)" },
                    );
                }
            }
            Self::Rejected(rejected) => rejected.print_text(),
        }
    }
}

/// Execute the messages subcommand.
pub async fn run_messages(args: &MessagesArgs) -> Result<u8> {
    let report = messages_report(args).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text();
    }
    Ok(report.exit_code())
}

pub async fn messages_report(args: &MessagesArgs) -> Result<MessagesReport> {
    let validator = match args.source.resolve(&args.rules).await {
        Ok(validator) => validator,
        Err(err) => return Ok(MessagesReport::Rejected(rejection(err)?)),
    };
    let document = validator.document();
    let messages = document
        .messages()
        .iter()
        .map(|m| MessageSummary {
            key: m.key().to_string(),
            id: m.id().map(str::to_string),
            name: m.name().map(str::to_string),
            schema_format: m.schema_format().to_string(),
            has_payload: m.payload().is_some(),
        })
        .collect();
    Ok(MessagesReport::Resolved {
        version: document.version().to_string(),
        title: document.title().map(str::to_string),
        messages,
    })
}
