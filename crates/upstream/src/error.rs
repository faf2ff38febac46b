//! Typed error enum for upstream calls.

use thiserror::Error;

/// Failures talking to SeaDex or AniList.
///
/// A well-formed empty answer is not an error; catalog lookups report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("upstream request timed out")]
    Timeout,
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("malformed upstream response in {context}: {source}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl UpstreamError {
    /// Whether a later attempt could succeed. Nothing retries on this; it
    /// only picks the log level.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::Malformed { .. } | Self::ClientInit(_) => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Unreachable(err) }
    }
}
