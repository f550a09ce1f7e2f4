//! Typed errors for the verification library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can map
//! each failure class to the right user-visible behavior:
//!
//! - [`VerifyError::InvalidQuery`] is an input error, surfaced immediately.
//! - [`SearchError`] is fatal to a crawl session.
//! - [`FetchError`] never leaves a fetcher; it is logged and the page skipped.

use thiserror::Error;

/// Errors surfaced by the verification and research pipelines.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Query missing or too short
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Search engine call failed, nothing to seed the crawl from
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// Operation was cancelled before any result was produced
    #[error("operation cancelled")]
    Cancelled,

    /// Summarizer collaborator failed
    #[error("summarizer error: {0}")]
    Summarizer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl VerifyError {
    /// Shorthand for an input validation failure.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidQuery { .. })
    }
}

/// Errors from the external search engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Search API answered with a non-success status
    #[error("search API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Search call exceeded its timeout
    #[error("search timed out")]
    Timeout,
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Http(Box::new(e))
        }
    }
}

/// Errors while fetching a single page.
///
/// Fetchers log these and report an empty result to the crawler.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the per-fetch timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Non-2xx response
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Transport or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// URL rejected by the SSRF validator
    #[error("blocked: {0}")]
    Blocked(#[from] SecurityError),

    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http(Box::new(e))
        }
    }
}

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, metadata endpoints)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    #[error("URL carries embedded credentials")]
    EmbeddedCredentials,

    #[error("URL is {0} bytes long")]
    UrlTooLong(usize),

    #[error("too many redirects")]
    TooManyRedirects,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
