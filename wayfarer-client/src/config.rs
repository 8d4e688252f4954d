//! Client configuration.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Backend base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default user agent for backend requests.
pub const DEFAULT_USER_AGENT: &str = "wayfarer-client/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for [`crate::ApiClient`] construction failures.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The base URL is not an absolute URL.
    #[error("invalid API base URL {url}: {source}")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Configuration for [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the REST API, including its `/api` prefix.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL without a trailing `/api` segment.
    ///
    /// Relative image paths stored by the backend resolve against it.
    #[must_use]
    pub fn api_origin(&self) -> &str {
        let trimmed = self.base_url.trim_end_matches('/');
        trimmed.strip_suffix("/api").unwrap_or(trimmed)
    }

    /// Parsed base URL with a trailing slash, ready for joining.
    pub(crate) fn parsed_base(&self) -> Result<Url, ClientBuildError> {
        let normalised = format!("{}/", self.base_url.trim_end_matches('/'));
        Url::parse(&normalised).map_err(|source| ClientBuildError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }
}
