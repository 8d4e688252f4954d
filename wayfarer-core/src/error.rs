//! Failures reported by backend-facing services.

use thiserror::Error;

/// Fallback shown when the backend did not supply a message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors returned by the service traits in [`crate::service`].
///
/// The variants follow the categories a caller reacts to differently:
/// authentication is handled once by the API client, authorization and
/// not-found are surfaced per operation, and everything else is reported
/// with the backend's message when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The session token was missing, expired or rejected (HTTP 401).
    #[error("authentication required")]
    Unauthorized,
    /// The signed-in user may not perform the operation (HTTP 403).
    #[error("permission denied: {}", .message.as_deref().unwrap_or("no details"))]
    Forbidden {
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {}", .message.as_deref().unwrap_or("no details"))]
    NotFound {
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
    /// The backend failed while handling the request (HTTP 5xx).
    #[error("server error {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
    /// The backend rejected the request for another reason (other 4xx).
    #[error("request rejected with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the backend, if any.
        message: Option<String>,
    },
    /// No response was received.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout applied to the request.
        timeout_secs: u64,
    },
    /// The response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },
}

impl ServiceError {
    /// Message supplied by the backend, when the failure carried one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Server { message, .. }
            | Self::Rejected { message, .. } => message.as_deref(),
            Self::Unauthorized
            | Self::Network { .. }
            | Self::Timeout { .. }
            | Self::Decode { .. } => None,
        }
    }

    /// Backend message if present, else `fallback`.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.backend_message().unwrap_or(fallback)
    }

    /// Whether the failure should be shown as a "not found" state.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the failure is an authorization problem.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}
