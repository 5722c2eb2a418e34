//! Authenticated quote client with retry and token refresh.
//!
//! `QuoteClient` owns the HTTP transport and the `Session` token. Callers only
//! ever see a parsed payload or a terminal error; transient statuses and stale
//! tokens are handled inside `fetch`.
//!
//! Two policies drive the retry loop and are kept separate so their coupling
//! is visible:
//! - `RetryPolicy`: attempt cap, backoff schedule, retryable-status predicate.
//! - `AuthPolicy`: when a failed attempt invalidates the token.
//!
//! The default `AuthPolicy` invalidates the token on 401/403 and also on the
//! first failed attempt whatever its status, so a transient 503 on attempt one
//! still costs a token refresh.
//!
//! Session state machine: `Unauthenticated -> Authenticated` on a successful
//! token acquisition; `Authenticated -> Unauthenticated` when the auth policy
//! fires. The next attempt re-acquires lazily. `fetch` takes `&mut self`, so a
//! refresh can never race another fetch on the same client.
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::FundamentalsError;
use crate::net;
use crate::result::Result;
use crate::symbols::validate_symbol;

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase, may be empty.
    pub reason: String,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Build a response with the canonical reason for `status`.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self { status, reason, body: body.into() }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `"503 Service Unavailable"`.
    pub fn status_line(&self) -> String {
        format!("{} {}", self.status, self.reason).trim_end().to_string()
    }
}

/// Blocking GET transport used by `QuoteClient`.
///
/// Implementations report failures below HTTP as `FundamentalsError::Transport`;
/// non-success statuses are returned as responses, never as errors.
pub trait HttpTransport {
    /// Issue a GET request to `url` with the given query parameters.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// `reqwest` blocking transport with browser headers and a cookie store.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests each time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(net::USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static(net::ACCEPT));

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let response = self.client.get(url).query(query).send()?;
        let status = response.status();
        let body = response.text()?;
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// Attempt cap, backoff schedule and retryable statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included.
    pub max_attempts: u32,
    /// Length of one backoff unit.
    pub backoff_unit: Duration,
    /// The wait after attempt `n` is `min(n, backoff_cap)` units.
    pub backoff_cap: u32,
    /// Statuses retried instead of failing immediately.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: net::MAX_ATTEMPTS,
            backoff_unit: net::BACKOFF_UNIT,
            backoff_cap: net::BACKOFF_CAP,
            retry_statuses: net::RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Same policy without waiting between attempts.
    pub fn without_backoff(self) -> Self {
        Self { backoff_unit: Duration::ZERO, ..self }
    }

    /// `true` when `status` should be retried.
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Wait after the failed `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt.min(self.backoff_cap)
    }
}

/// Decides when a failed attempt invalidates the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Statuses meaning the token is stale.
    pub auth_statuses: Vec<u16>,
    /// Also refresh after the first failed attempt, whatever its status.
    pub refresh_on_first_failure: bool,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            auth_statuses: net::AUTH_STATUSES.to_vec(),
            refresh_on_first_failure: true,
        }
    }
}

impl AuthPolicy {
    /// `true` when a retryable `status` seen on `attempt` must force a refresh.
    pub fn should_refresh(&self, status: u16, attempt: u32) -> bool {
        self.auth_statuses.contains(&status) || (self.refresh_on_first_failure && attempt == 1)
    }
}

/// Process-scoped authentication state of one client.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    acquisitions: u32,
}

impl Session {
    /// Current token, if authenticated.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Number of successful token acquisitions so far.
    pub fn acquisitions(&self) -> u32 {
        self.acquisitions
    }

    fn store(&mut self, token: String) {
        self.token = Some(token);
        self.acquisitions += 1;
    }

    fn invalidate(&mut self) {
        self.token = None;
    }
}

/// Quote summary client; see the module docs for the retry and auth policy.
pub struct QuoteClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    session: Session,
    retry: RetryPolicy,
    auth: AuthPolicy,
}

impl QuoteClient<ReqwestTransport> {
    /// Client over a `reqwest` transport with the given per-request timeout.
    pub fn connect(timeout: Duration) -> Result<Self> {
        Ok(Self::new(ReqwestTransport::new(timeout)?))
    }
}

impl<T: HttpTransport> QuoteClient<T> {
    /// Unauthenticated client with default policies. No request is made here.
    pub fn new(transport: T) -> Self {
        Self::with_policies(transport, RetryPolicy::default(), AuthPolicy::default())
    }

    /// Unauthenticated client with explicit policies.
    pub fn with_policies(transport: T, retry: RetryPolicy, auth: AuthPolicy) -> Self {
        Self { transport, session: Session::default(), retry, auth }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Authentication state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `true` once any token acquisition has succeeded.
    pub fn has_authenticated(&self) -> bool {
        self.session.acquisitions > 0
    }

    /// Fetch a fresh token from the token endpoint and store it.
    pub fn acquire_token(&mut self) -> Result<&str> {
        let response = self
            .transport
            .get(net::TOKEN_URL, &[])
            .map_err(|e| FundamentalsError::Auth(format!("token endpoint unreachable: {e}")))?;
        if !response.is_success() {
            return Err(FundamentalsError::Auth(format!(
                "token endpoint returned {}",
                response.status_line()
            )));
        }
        let token = response.body.trim();
        if token.is_empty() {
            return Err(FundamentalsError::Auth("Received empty token".to_string()));
        }
        self.session.store(token.to_string());
        debug!("Token acquired (#{})", self.session.acquisitions);
        Ok(self.session.token().unwrap_or_default())
    }

    fn ensure_token(&mut self) -> Result<String> {
        if let Some(token) = self.session.token() {
            return Ok(token.to_string());
        }
        Ok(self.acquire_token()?.to_string())
    }

    /// Return the quote summary payload for `symbol`.
    ///
    /// Invalid symbols fail before any request. Retryable statuses and
    /// transport errors are retried up to `RetryPolicy::max_attempts` times;
    /// any other non-success status fails immediately.
    pub fn fetch(&mut self, symbol: &str) -> Result<Value> {
        let symbol = validate_symbol(symbol)?;
        let url = net::quote_url(symbol);
        let modules = net::modules_param();
        let mut last_failure: (Option<u16>, String) = (None, String::from("no attempt made"));

        for attempt in 1..=self.retry.max_attempts {
            let token = self.ensure_token()?;
            let query = [("modules", modules.as_str()), ("crumb", token.as_str())];

            match self.transport.get(&url, &query) {
                Ok(response) if response.is_success() => {
                    if attempt > 1 {
                        info!("{symbol}: succeeded on attempt {attempt}");
                    }
                    return Ok(serde_json::from_str(&response.body)?);
                }
                Ok(response) if self.retry.is_retryable(response.status) => {
                    warn!(
                        "{symbol}: attempt {attempt}/{} got {}",
                        self.retry.max_attempts,
                        response.status_line()
                    );
                    if self.auth.should_refresh(response.status, attempt) {
                        debug!("{symbol}: invalidating token after {}", response.status);
                        self.session.invalidate();
                    }
                    last_failure = (Some(response.status), response.status_line());
                }
                Ok(response) => {
                    return Err(FundamentalsError::Fetch {
                        symbol: symbol.to_string(),
                        status: Some(response.status),
                        reason: response.status_line(),
                    });
                }
                Err(FundamentalsError::Transport(reason)) => {
                    warn!("{symbol}: attempt {attempt}/{} failed: {reason}", self.retry.max_attempts);
                    last_failure = (None, reason);
                }
                Err(e) => return Err(e),
            }

            if attempt < self.retry.max_attempts {
                thread::sleep(self.retry.backoff(attempt));
            }
        }

        let (status, reason) = last_failure;
        Err(FundamentalsError::Fetch {
            symbol: symbol.to_string(),
            status,
            reason: format!("{reason} after {} attempts", self.retry.max_attempts),
        })
    }
}
