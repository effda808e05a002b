//! # Document Sources
//!
//! Where documents come from and how their bytes are retrieved.
//!
//! Root documents are read through [`DocumentFetcher`] and any failure is
//! returned to the caller as a raw [`FetchError`]. Documents reached through
//! `$ref` use the same fetcher, but the parser turns their failures into
//! `invalid-ref` diagnostics instead.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::config::FetchConfig;

/// Raw document content handed to the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// YAML or JSON text.
    Text(String),
    /// An already-decoded document tree.
    Json(Value),
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Where a document lives. Used as the base for relative `$ref`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentLocation {
    File(PathBuf),
    Url(Url),
    /// Content supplied in memory; only absolute references can be followed.
    Inline,
}

impl DocumentLocation {
    /// File location with `.` and `..` segments collapsed.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(normalize(path.as_ref()))
    }

    /// Resolve the document part of a `$ref` (everything before `#`)
    /// against this location.
    pub fn join(&self, reference: &str) -> Result<DocumentLocation, String> {
        if let Some(absolute) = absolute_location(reference) {
            return Ok(absolute);
        }
        match self {
            Self::File(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::File(normalize(&dir.join(reference))))
            }
            Self::Url(base) => base
                .join(reference)
                .map(Self::Url)
                .map_err(|e| format!("cannot resolve '{reference}' against {base}: {e}")),
            Self::Inline => Err(format!(
                "relative reference '{reference}' cannot be resolved from an in-memory document"
            )),
        }
    }
}

fn absolute_location(reference: &str) -> Option<DocumentLocation> {
    if let Ok(url) = Url::parse(reference) {
        match url.scheme() {
            "http" | "https" => return Some(DocumentLocation::Url(url)),
            "file" => return url.to_file_path().ok().map(DocumentLocation::File),
            _ => {}
        }
    }
    let path = Path::new(reference);
    path.is_absolute()
        .then(|| DocumentLocation::File(normalize(path)))
}

/// Lexically collapse `.` and `..` so the same file is recognised under
/// different spellings.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
            Self::Inline => f.write_str("<inline>"),
        }
    }
}

/// Failure to retrieve document bytes. Each variant is the underlying
/// error, untouched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

/// Reads documents from disk or over HTTP.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    http: reqwest::Client,
}

impl DocumentFetcher {
    /// Build a fetcher with the given HTTP settings.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }

    /// Load the text behind `location`.
    pub async fn load(&self, location: &DocumentLocation) -> Result<String, FetchError> {
        match location {
            DocumentLocation::File(path) => self.read_file(path).await,
            DocumentLocation::Url(url) => self.fetch_url(url).await,
            DocumentLocation::Inline => Err(FetchError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "in-memory documents have no location to load from",
            ))),
        }
    }

    /// Read a UTF-8 document from disk.
    pub async fn read_file(&self, path: &Path) -> Result<String, FetchError> {
        tracing::debug!(path = %path.display(), "reading document");
        Ok(tokio::fs::read_to_string(path).await?)
    }

    /// Fetch a document over HTTP(S). `file://` URLs are read from disk.
    ///
    /// Non-success status codes are returned as [`FetchError::Http`].
    pub async fn fetch_url(&self, url: &Url) -> Result<String, FetchError> {
        if url.scheme() == "file" {
            let path = url.to_file_path().map_err(|()| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("not a local file URL: {url}"))
            })?;
            return self.read_file(&path).await;
        }
        tracing::debug!(%url, "fetching document");
        let response = self.http.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
