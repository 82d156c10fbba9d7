//! Boundary to the HTTP client.

use std::time::Duration;

use crate::error::TransportError;

/// Payload shape requested from an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    Json,
    DelimitedText,
}

impl ResponseFormat {
    /// Value of the `Accept` header for this format.
    pub fn accept(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::DelimitedText => "text/csv",
        }
    }
}

/// A fully resolved GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Query parameters in the order they were configured.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub format: ResponseFormat,
}

impl HttpRequest {
    /// Last value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a response. Non-2xx statuses are responses too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs HTTP GET requests for the [`Extractor`](crate::Extractor).
///
/// Implementations return `Ok` for every response the server sent, whatever
/// its status, and `Err` only when no response was obtained.
pub trait Transport: Send + Sync {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
