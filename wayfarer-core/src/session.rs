//! Signed-in session: current user and token lifecycle.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::error::ServiceError;
use crate::navigation::{LOGIN_ROUTE, Navigator};
use crate::service::{AuthService, TokenStore, TokenStoreError};
use crate::user::{AuthGrant, Credentials, Registration, Role, User};

/// Fallback shown when a login fails without a backend message.
pub const LOGIN_FAILURE: &str = "Login failed";
/// Fallback shown when a registration fails without a backend message.
pub const REGISTRATION_FAILURE: &str = "Registration failed";

/// Errors raised by [`Session`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The backend rejected the call.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The token could not be persisted.
    #[error(transparent)]
    Token(#[from] TokenStoreError),
}

/// What a stored token looks like before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// Worth presenting to the backend.
    Usable,
    /// A JWT whose `exp` claim has passed.
    Expired,
    /// Shaped like a JWT but its claims cannot be read.
    Malformed,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Classify `token` at `now`.
///
/// Tokens that are not three dot-separated segments are treated as opaque
/// and left for the backend to judge.
#[must_use]
pub fn inspect_token(token: &str, now: DateTime<Utc>) -> TokenStatus {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return TokenStatus::Usable;
    };
    let claims = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Claims>(&bytes).ok());
    match claims {
        None => TokenStatus::Malformed,
        Some(Claims { exp: Some(exp) }) if exp <= now.timestamp() => TokenStatus::Expired,
        Some(_) => TokenStatus::Usable,
    }
}

/// Session state shared by a front end.
pub struct Session<A> {
    auth: A,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    user: Option<User>,
    loading: bool,
    last_error: Option<String>,
}

impl<A> std::fmt::Debug for Session<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("loading", &self.loading)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<A: AuthService> Session<A> {
    /// Session that has not yet read its token.
    pub fn new(auth: A, tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            tokens,
            navigator,
            user: None,
            loading: true,
            last_error: None,
        }
    }

    /// Restore the session from the stored token.
    pub async fn init(&mut self) -> Option<&User> {
        self.init_at(Utc::now()).await
    }

    /// [`Self::init`] with an explicit clock.
    ///
    /// Any failure clears the token and leaves the session signed out.
    pub async fn init_at(&mut self, now: DateTime<Utc>) -> Option<&User> {
        self.loading = true;
        self.user = None;
        if let Some(token) = self.tokens.token() {
            match inspect_token(&token, now) {
                TokenStatus::Usable => match self.auth.current_user().await {
                    Ok(user) => {
                        log::debug!("restored session for {}", user.id);
                        self.user = Some(user);
                    }
                    Err(err) => {
                        log::warn!("stored token rejected: {err}");
                        self.tokens.clear();
                    }
                },
                status => {
                    log::info!("discarding stored token: {status:?}");
                    self.tokens.clear();
                }
            }
        }
        self.loading = false;
        self.user.as_ref()
    }

    /// Signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Canonical role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|user| user.role)
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether [`Self::init`] has not finished.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-facing message of the last failed login or registration.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Exchange credentials for a session.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<User, SessionError> {
        let grant = self.auth.login(credentials).await;
        self.establish(grant, LOGIN_FAILURE).await
    }

    /// Create an account and sign in.
    pub async fn register(&mut self, registration: &Registration) -> Result<User, SessionError> {
        let grant = self.auth.register(registration).await;
        self.establish(grant, REGISTRATION_FAILURE).await
    }

    async fn establish(
        &mut self,
        grant: Result<AuthGrant, ServiceError>,
        fallback: &str,
    ) -> Result<User, SessionError> {
        self.last_error = None;
        let outcome = match grant {
            Ok(grant) => self.adopt(&grant).await,
            Err(err) => Err(SessionError::Service(err)),
        };
        match outcome {
            Ok(user) => {
                log::info!("signed in as {}", user.id);
                self.user = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                let message = match &err {
                    SessionError::Service(service) => service.message_or(fallback).to_owned(),
                    SessionError::Token(_) => fallback.to_owned(),
                };
                self.last_error = Some(message);
                Err(err)
            }
        }
    }

    async fn adopt(&self, grant: &AuthGrant) -> Result<User, SessionError> {
        self.tokens.store(&grant.token)?;
        match self.auth.current_user().await {
            Ok(user) => Ok(user),
            Err(err) => {
                log::warn!("signed in but could not load the user: {err}");
                self.tokens.clear();
                Err(SessionError::Service(err))
            }
        }
    }

    /// Forget the token and user, then go to the login page.
    pub fn logout(&mut self) {
        self.tokens.clear();
        self.user = None;
        self.last_error = None;
        self.navigator.redirect(LOGIN_ROUTE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn jwt(claims: &str) -> String {
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(claims))
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).expect("valid timestamp")
    }

    #[rstest]
    #[case(jwt(r#"{"exp":100}"#), 200, TokenStatus::Expired)]
    #[case(jwt(r#"{"exp":300}"#), 200, TokenStatus::Usable)]
    #[case(jwt(r#"{"id":"u1"}"#), 200, TokenStatus::Usable)]
    #[case("a.!!!.c".to_owned(), 200, TokenStatus::Malformed)]
    #[case("opaque-token".to_owned(), 200, TokenStatus::Usable)]
    fn classifies_tokens(#[case] token: String, #[case] now: i64, #[case] expected: TokenStatus) {
        assert_eq!(inspect_token(&token, at(now)), expected);
    }
}
