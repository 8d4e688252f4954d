//! Request dispatch and response classification.

use std::sync::Arc;

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use url::Url;
use wayfarer_core::navigation::LOGIN_ROUTE;
use wayfarer_core::entity::resolve_image_url;
use wayfarer_core::{EntityKind, FormPayload, ListParams, Navigator, ServiceError, TokenStore};

use crate::config::{ApiClientConfig, ClientBuildError};
use crate::multipart;

/// Legacy header carrying the raw token next to `Authorization`.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// Multipart form.
    Multipart(FormPayload),
}

/// One call against the REST API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: ListParams,
    body: RequestBody,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: ListParams::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: &ListParams) -> Self {
        self.query = query.clone();
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Decode`] when `body` cannot be represented as
    /// JSON.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ServiceError> {
        let value = serde_json::to_value(body).map_err(|err| ServiceError::Decode {
            message: format!("failed to encode request body: {err}"),
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart body.
    #[must_use]
    pub fn with_multipart(mut self, payload: FormPayload) -> Self {
        self.body = RequestBody::Multipart(payload);
        self
    }

    /// Path below the API base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Backend message carried in a JSON error body, if any.
#[must_use]
pub fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}

/// Map a non-success status to its [`ServiceError`]; `None` for 2xx and 3xx.
#[must_use]
pub fn status_error(status: u16, body: &str) -> Option<ServiceError> {
    let message = backend_message(body);
    match status {
        0..=399 => None,
        401 => Some(ServiceError::Unauthorized),
        403 => Some(ServiceError::Forbidden { message }),
        404 => Some(ServiceError::NotFound { message }),
        500.. => Some(ServiceError::Server { status, message }),
        _ => Some(ServiceError::Rejected { status, message }),
    }
}

/// HTTP client for the marketplace REST API.
///
/// Every request carries the stored token as `Authorization: Bearer` and
/// as [`AUTH_TOKEN_HEADER`]. A 401 response clears the stored token and
/// redirects to the login page unless the front end is already there.
/// Nothing is retried.
pub struct ApiClient {
    http: Client,
    base: Url,
    config: ApiClientConfig,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to
    /// build.
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientBuildError> {
        Self::with_config(ApiClientConfig::new(base_url), tokens, navigator)
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to
    /// build.
    pub fn with_config(
        config: ApiClientConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientBuildError> {
        let base = config.parsed_base()?;
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        Ok(Self {
            http,
            base,
            config,
            tokens,
            navigator,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Token store consulted for every request.
    #[must_use]
    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    /// Displayable URL of a stored image, or the kind's placeholder.
    #[must_use]
    pub fn image_url(&self, path: Option<&str>, kind: EntityKind) -> String {
        resolve_image_url(path, self.config.api_origin(), kind)
    }

    /// Absolute URL of `path` with `query` appended.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Network`] when `path` cannot be joined onto
    /// the base URL.
    pub fn endpoint(&self, path: &str, query: &ListParams) -> Result<Url, ServiceError> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ServiceError::Network {
                url: path.to_owned(),
                message: err.to_string(),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// Send `request` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ServiceError`] for transport failures,
    /// non-success statuses and undecodable bodies.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ServiceError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|err| ServiceError::Decode {
            message: err.to_string(),
        })
    }

    /// Send `request`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ServiceError`] for transport failures and
    /// non-success statuses.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ServiceError> {
        self.execute(request).await.map(|_| ())
    }

    async fn execute(&self, request: ApiRequest) -> Result<String, ServiceError> {
        let url = self.endpoint(&request.path, &request.query)?;
        log::debug!("{} {url}", request.method);

        let mut builder = self.http.request(request.method, url.clone());
        if let Some(token) = self.tokens.token() {
            builder = builder
                .bearer_auth(&token)
                .header(AUTH_TOKEN_HEADER, token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(payload) => {
                let form = multipart::to_form(&payload)
                    .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;
        self.check_status(status, url.as_str(), &body)?;
        Ok(body)
    }

    /// Apply the client's status policy to a received response.
    ///
    /// On 401 the stored token is cleared and the navigator is sent to the
    /// login page unless it is already there. Forbidden, not-found and
    /// server failures are logged.
    ///
    /// # Errors
    ///
    /// Returns the [`ServiceError`] matching `status`.
    pub fn check_status(&self, status: u16, url: &str, body: &str) -> Result<(), ServiceError> {
        let Some(err) = status_error(status, body) else {
            return Ok(());
        };
        match &err {
            ServiceError::Unauthorized => {
                log::warn!("session rejected by {url}; clearing stored token");
                self.tokens.clear();
                if self.navigator.current_route() != LOGIN_ROUTE {
                    self.navigator.redirect(LOGIN_ROUTE);
                }
            }
            ServiceError::Forbidden { .. } => log::warn!("permission denied: {url}: {err}"),
            ServiceError::NotFound { .. } => log::warn!("resource not found: {url}: {err}"),
            ServiceError::Server { .. } => log::error!("server error: {url}: {err}"),
            _ => log::debug!("request rejected: {url}: {err}"),
        }
        Err(err)
    }

    /// Convert a reqwest error to a [`ServiceError`].
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ServiceError {
        if error.is_timeout() {
            return ServiceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        log::warn!("no response from {url}: {error}");
        ServiceError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}
