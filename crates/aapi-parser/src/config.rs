//! Fetch configuration.
//!
//! Controls how root and referenced documents are retrieved over HTTP.
//! Defaults are suitable for most callers. Override via environment
//! variables or explicit construction.

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP settings used by [`DocumentFetcher`](crate::source::DocumentFetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AAPI_FETCH_TIMEOUT_SECS` (default: 30)
    /// - `AAPI_USER_AGENT` (default: `aapi-parser/<version>`)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            timeout_secs: std::env::var("AAPI_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            user_agent: std::env::var("AAPI_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
        }
    }
}

fn default_user_agent() -> String {
    format!("aapi-parser/{}", env!("CARGO_PKG_VERSION"))
}
