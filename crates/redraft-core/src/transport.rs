//! Authenticated HTTP transport with transparent token refresh.
//!
//! Every backend call that needs a session goes through
//! [`AuthTransport::fetch_authenticated`]: it attaches the current access
//! token and, on a 401, exchanges the refresh token for a new access token
//! and retries the original request exactly once. A failed refresh tears the
//! session down (clear store, notify, navigate to login with a returnUrl)
//! and surfaces a distinguishable session-expired error so callers can skip
//! duplicate notifications.
//!
//! Responses with any status other than 401 are returned untouched;
//! interpreting them is the caller's job.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::session::SessionStore;

/// Path of the backend token-refresh endpoint.
pub const TOKEN_REFRESH_PATH: &str = "/api/users/token/refresh/";

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Destructive,
}

/// User-facing notification sink (toast, stderr line, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Client-side navigation collaborator (router, terminal hint, ...).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, params: &[(&str, &str)]);
}

/// Error surfaced by the authenticated transport.
#[derive(Debug)]
pub enum TransportError {
    /// No session present; raised before any network I/O.
    Unauthenticated,
    /// Token refresh failed; the store has been cleared and the login
    /// navigation already triggered.
    SessionExpired,
    /// The underlying request failed (DNS, connection refused, ...).
    Network(reqwest::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Unauthenticated => write!(f, "no authentication token found"),
            TransportError::SessionExpired => write!(f, "session expired"),
            TransportError::Network(err) => write!(f, "request failed: {err}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err)
    }
}

/// A request captured before dispatch.
///
/// Holding the full description (rather than a built `reqwest::Request`)
/// is what lets the transport rebuild and reissue it exactly once after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    /// Adds a header; invalid names or values are ignored.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::try_from(name),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }
}

/// Progress of a single authenticated fetch.
///
/// Each call walks Requesting → AuthFailed → Refreshing →
/// RefreshedRetrying and then terminates; the retry being a distinct state
/// (rather than a recursive call) is what makes "retry at most once"
/// structural. Nothing is retained between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Requesting,
    AuthFailed,
    Refreshing,
    RefreshedRetrying,
}

/// Authenticated request transport.
pub struct AuthTransport {
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    refresh_url: String,
    login_path: String,
    return_path: Option<String>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl AuthTransport {
    pub fn new(
        base_url: &str,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            store,
            refresh_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_REFRESH_PATH),
            login_path: "/auth/login".to_string(),
            return_path: None,
            navigator,
            notifier,
        }
    }

    /// Overrides the login destination used on session expiry.
    pub fn with_login_path(mut self, path: &str) -> Self {
        self.login_path = path.to_string();
        self
    }

    /// Sets the location encoded as returnUrl on session expiry.
    /// Defaults to the path of the failing request's URL.
    pub fn with_return_path(mut self, path: &str) -> Self {
        self.return_path = Some(path.to_string());
        self
    }

    /// Performs one HTTP call on behalf of the caller, transparently
    /// handling authentication.
    ///
    /// # Errors
    /// - [`TransportError::Unauthenticated`] when no session is present
    ///   (no network call is made).
    /// - [`TransportError::SessionExpired`] when a 401 could not be
    ///   recovered by a token refresh; the store is cleared and the login
    ///   navigation has already happened.
    /// - [`TransportError::Network`] when the underlying request fails.
    ///
    /// Every response status except 401 is returned as-is.
    pub async fn fetch_authenticated(
        &self,
        request: ApiRequest,
    ) -> Result<Response, TransportError> {
        let Some(session) = self.store.get() else {
            return Err(TransportError::Unauthenticated);
        };

        let mut access = session.access;
        let mut state = CallState::Requesting;

        loop {
            match state {
                CallState::Requesting | CallState::RefreshedRetrying => {
                    let response = self.dispatch(&request, &access).await?;
                    if response.status() != StatusCode::UNAUTHORIZED
                        || state == CallState::RefreshedRetrying
                    {
                        // Done. A second 401 is returned, never re-refreshed.
                        return Ok(response);
                    }
                    state = CallState::AuthFailed;
                }
                CallState::AuthFailed => {
                    debug!(url = %request.url, "access token rejected, attempting refresh");
                    state = CallState::Refreshing;
                }
                CallState::Refreshing => {
                    if self.refresh().await {
                        if let Some(session) = self.store.get() {
                            access = session.access;
                        }
                        state = CallState::RefreshedRetrying;
                    } else {
                        self.terminate_session(&request);
                        return Err(TransportError::SessionExpired);
                    }
                }
            }
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// Returns true when a new access token was installed in the store.
    /// At most one attempt is made; any failure (missing refresh token,
    /// non-2xx response, missing token field, transport error) returns
    /// false without retrying.
    pub async fn refresh(&self) -> bool {
        let Some(session) = self.store.get() else {
            return false;
        };
        if session.refresh.is_empty() {
            return false;
        }

        let response = match self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh": session.refresh }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "token refresh request failed");
                return false;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "token refresh rejected");
            return false;
        }

        let payload: RefreshResponse = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(error = %err, "unreadable token refresh payload");
                return false;
            }
        };

        let Some(access) = payload.access.filter(|access| !access.is_empty()) else {
            debug!("token refresh payload missing access token");
            return false;
        };

        if let Err(err) = self.store.set_access(&access) {
            warn!(error = %err, "failed to persist refreshed access token");
            return false;
        }

        true
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access: &str,
    ) -> Result<Response, TransportError> {
        let mut headers = request.headers.clone();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access}"))
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );

        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// Session-expiry teardown: clear the store, tell the user, and send
    /// them to login with the current location as the return target.
    fn terminate_session(&self, request: &ApiRequest) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear session store");
        }

        self.notifier.notify(
            "Session expired",
            "Your session has expired. Please log in again.",
            Severity::Destructive,
        );

        let return_url = self
            .return_path
            .clone()
            .unwrap_or_else(|| location_of(&request.url));
        self.navigator
            .navigate(&self.login_path, &[("returnUrl", return_url.as_str())]);

        warn!(return_url = %return_url, "session terminated after failed token refresh");
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

/// Path-and-query of a URL, used as the default return target.
fn location_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let mut location = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                location.push('?');
                location.push_str(query);
            }
            location
        }
        Err(_) => "/".to_string(),
    }
}
