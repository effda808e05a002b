//! # Document Source Arguments
//!
//! `--file` / `--url` selection shared by every subcommand, and the
//! rendering of resolution failures.

use std::path::PathBuf;

use aapi_parser::{Diagnostic, FetchConfig, ParserOptions, RulesetConfig};
use aapi_validate::{MessageValidator, ResolveError, Resolver};
use clap::Args;
use serde::Serialize;

/// Where to read the AsyncAPI document from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// AsyncAPI document on disk (YAML or JSON).
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// AsyncAPI document URL (http, https or file).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

/// Parser settings exposed on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct RulesetArgs {
    /// Also run the recommended rules and report their warnings.
    #[arg(long)]
    pub recommended: bool,
}

impl RulesetArgs {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            ruleset: RulesetConfig {
                core: true,
                recommended: self.recommended,
            },
            ..ParserOptions::default()
        }
    }
}

impl SourceArgs {
    /// Resolve the selected document.
    pub async fn resolve(&self, rules: &RulesetArgs) -> Result<MessageValidator, ResolveError> {
        let resolver = Resolver::new(rules.parser_options(), &FetchConfig::from_env())?;
        match (&self.file, &self.url) {
            (Some(path), _) => resolver.resolve_file(path).await,
            (None, Some(url)) => resolver.resolve_url(url).await,
            (None, None) => Err(ResolveError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "either --file or --url is required",
            ))),
        }
    }

    /// Human-readable description of the source, for log lines.
    pub fn describe(&self) -> String {
        match (&self.file, &self.url) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(url)) => url.clone(),
            (None, None) => "<none>".to_string(),
        }
    }
}

/// A document the parser refused, with everything it found.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub error: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Split resolution failures into rejections (exit 1) and operational
/// errors (exit 2).
pub fn rejection(err: ResolveError) -> anyhow::Result<Rejection> {
    match err {
        ResolveError::NotAsyncApi { .. } | ResolveError::Governance { .. } => Ok(Rejection {
            error: err.to_string(),
            diagnostics: err.diagnostics().to_vec(),
        }),
        other => Err(anyhow::Error::new(other).context("failed to read AsyncAPI document")),
    }
}

impl Rejection {
    pub fn print_text(&self) {
        println!("REJECTED: {}", self.error);
        for diagnostic in &self.diagnostics {
            println!("  {diagnostic}");
        }
    }
}
