//! Error types for the extractor.

use std::fmt;

use comext_arrow::ArrowConvertError;
use comext_core::DecodeError;

/// Number of characters of a response body kept in [`ExtractError`].
pub const BODY_EXCERPT_CHARS: usize = 200;

/// No response was obtained from the server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived in time.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The response arrived but its body could not be read.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one failed endpoint attempt.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The endpoint does not serve the dataset in the requested format
    /// (HTTP 404 or 406).
    #[error("endpoint does not serve the dataset (HTTP {status})")]
    Rejected { status: u16 },

    /// The endpoint refused the request with a status no fallback can fix.
    #[error("endpoint rejected the request (HTTP {status})")]
    UpstreamRejected { status: u16 },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("delimited response could not be parsed: {0}")]
    InvalidCsv(#[from] ArrowConvertError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AttemptError {
    /// Whether the secondary endpoint should be tried after this failure on
    /// the primary endpoint.
    pub fn allows_fallback(&self) -> bool {
        match self {
            Self::Rejected { .. } | Self::InvalidJson(_) => true,
            Self::Decode(err) => err.is_fallback_signal(),
            Self::UpstreamRejected { .. } | Self::InvalidCsv(_) | Self::Transport(_) => false,
        }
    }
}

/// Endpoint attempt an [`ExtractError`] comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Primary,
    Secondary,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        })
    }
}

/// Terminal failure of [`Extractor::fetch`](crate::Extractor::fetch).
///
/// Wraps the last [`AttemptError`] together with the HTTP status and the
/// start of the body of the last response, when there was one.
#[derive(Debug, thiserror::Error)]
#[error("{stage} endpoint failed for dataset '{dataset}': {message}")]
pub struct ExtractError {
    pub stage: Stage,
    pub dataset: String,
    pub status: Option<u16>,
    pub message: String,
    pub body_excerpt: Option<String>,
    #[source]
    pub source: AttemptError,
}

impl ExtractError {
    pub(crate) fn new(
        stage: Stage,
        dataset: &str,
        status: Option<u16>,
        body: Option<&str>,
        source: AttemptError,
    ) -> Self {
        Self {
            stage,
            dataset: dataset.to_string(),
            status,
            message: source.to_string(),
            body_excerpt: body.and_then(excerpt),
            source,
        }
    }
}

fn excerpt(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    Some(body.chars().take(BODY_EXCERPT_CHARS).collect())
}
