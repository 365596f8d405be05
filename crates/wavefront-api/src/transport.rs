//! Request transport pipeline.
//!
//! Outbound requests flow through an ordered chain of stages, each of which
//! transforms the request and forwards it to its delegate, ending in a
//! terminal stage that actually performs the HTTP round trip:
//!
//! ```text
//! AuthTransport        ← bearer token + standard headers
//!     │
//!     ▼
//! RetryTransport       ← bounded attempts with exponential backoff
//!     │
//!     ▼
//! HttpTransport        ← reqwest::blocking round trip
//! ```
//!
//! Each stage is an independent [`Transport`], so tests can swap the terminal
//! stage for a fake and exercise the others in isolation.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};

use crate::error::{EventApiError, Result};

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// An outbound API request, cloneable so retry stages can re-send it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(method: Method, url: Url, body: Vec<u8>) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }
}

/// The raw outcome of a round trip: status plus undecoded body bytes.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// One stage of the outbound pipeline.
///
/// A stage either transforms the request and forwards it to a delegate, or
/// terminates the chain by performing the round trip itself.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request)
    }
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Terminal stage: performs the round trip with a blocking reqwest client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.bytes()?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// AuthTransport
// ---------------------------------------------------------------------------

/// Stage that stamps `Authorization: Bearer <token>` and the standard
/// JSON content headers onto every request before forwarding it.
pub struct AuthTransport<T> {
    token: String,
    delegate: T,
}

impl<T> AuthTransport<T> {
    pub fn new(token: impl Into<String>, delegate: T) -> Self {
        Self {
            token: token.into(),
            delegate,
        }
    }

    /// The next stage in the chain, exposed for composition and tests.
    pub fn delegate(&self) -> &T {
        &self.delegate
    }
}

impl<T: Transport> Transport for AuthTransport<T> {
    fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| EventApiError::InvalidAuthToken)?;
        bearer.set_sensitive(true);

        request.headers.insert(AUTHORIZATION, bearer);
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        self.delegate.send(request)
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy / RetryTransport
// ---------------------------------------------------------------------------

/// Bounded-attempt retry with exponential backoff.
///
/// The status list covers responses the event API returns while it is not
/// yet consistent (406 shortly after a write) alongside the usual transient
/// server statuses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    pub retry_statuses: Vec<StatusCode>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            retry_statuses: vec![
                StatusCode::NOT_ACCEPTABLE,
                StatusCode::REQUEST_TIMEOUT,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }

    /// A policy that sends each request exactly once.
    pub fn disabled() -> Self {
        Self::new(1)
    }

    pub fn is_transient(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Backoff before attempt `attempt + 1`, growing by `multiplier` per
    /// attempt and capped at `max_backoff`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let backoff = self.initial_backoff.as_millis() as f64
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = backoff.min(self.max_backoff.as_millis() as f64) as u64;
        Duration::from_millis(capped)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Stage that re-sends the request on transient failures.
///
/// A response with a non-transient status is returned as-is; deciding
/// whether that status is acceptable belongs to the caller. When attempts
/// run out the last response (or transport error) is surfaced unchanged.
pub struct RetryTransport<T> {
    delegate: T,
    policy: RetryPolicy,
}

impl<T> RetryTransport<T> {
    pub fn new(delegate: T, policy: RetryPolicy) -> Self {
        Self { delegate, policy }
    }
}

impl<T: Transport> Transport for RetryTransport<T> {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut attempt = 1;
        loop {
            let last_attempt = attempt >= self.policy.max_attempts;
            match self.delegate.send(request.clone()) {
                Ok(response) if !self.policy.is_transient(response.status) => {
                    return Ok(response);
                }
                Ok(response) => {
                    if last_attempt {
                        return Ok(response);
                    }
                    let backoff = self.policy.backoff_for_attempt(attempt);
                    tracing::warn!(
                        status = %response.status,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "transient response status, retrying"
                    );
                    std::thread::sleep(backoff);
                }
                Err(EventApiError::Http(e)) if e.is_timeout() || e.is_connect() => {
                    if last_attempt {
                        return Err(EventApiError::Http(e));
                    }
                    let backoff = self.policy.backoff_for_attempt(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "transport failure, retrying"
                    );
                    std::thread::sleep(backoff);
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }
}
