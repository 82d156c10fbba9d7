//! Client configuration threaded into every request.

use std::time::Duration;

use indexmap::IndexMap;

/// Statistics dissemination API serving JSON-stat.
pub const DEFAULT_PRIMARY_BASE_URL: &str =
    "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data/";

/// Comext SDMX 2.1 API, queried for CSV when the primary endpoint cannot
/// serve a dataset.
pub const DEFAULT_SECONDARY_BASE_URL: &str =
    "https://ec.europa.eu/eurostat/api/comext/dissemination/sdmx/2.1/data/";

/// Endpoints and request settings used by [`Extractor`](crate::Extractor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub primary_base_url: String,
    pub secondary_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Sent after `Accept` and `User-Agent`; a header with the same name
    /// replaces the built-in one.
    pub headers: IndexMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_base_url: DEFAULT_PRIMARY_BASE_URL.to_string(),
            secondary_base_url: DEFAULT_SECONDARY_BASE_URL.to_string(),
            user_agent: concat!("comext/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            headers: IndexMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn with_primary_base_url(mut self, url: impl Into<String>) -> Self {
        self.primary_base_url = url.into();
        self
    }

    pub fn with_secondary_base_url(mut self, url: impl Into<String>) -> Self {
        self.secondary_base_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
