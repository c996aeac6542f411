//! Outbound request description and the transport that carries it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::auth::Credential;
use crate::config::TimeoutConfig;
use crate::error::{ApiError, ApiResult};

/// Header carrying a caller-supplied idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// One call against the management API, relative to its base URL.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub method: Method,
    /// Unencoded path segments, e.g. `["users", "auth0|123"]`.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub idempotency_key: Option<String>,
}

impl CallRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post(segments: &[&str], body: serde_json::Value) -> Self {
        Self::new(Method::POST, segments).with_body(body)
    }

    pub fn patch(segments: &[&str], body: serde_json::Value) -> Self {
        Self::new(Method::PATCH, segments).with_body(body)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Whether repeating this request cannot create side effects beyond the first.
    ///
    /// PATCH bodies built by this crate carry absolute field values, so
    /// replaying one converges on the same remote state. POST is only safe with
    /// an idempotency key.
    pub fn retry_safe(&self) -> bool {
        self.method.is_idempotent() || self.method == Method::PATCH || self.idempotency_key.is_some()
    }

    /// Path relative to the API base, for logs.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The request did not complete at the network level.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            "timeout"
        } else if error.is_connect() {
            "connection error"
        } else {
            "request error"
        };
        TransportError::new(format!("{}: {}", kind, error))
    }
}

/// Sends a single request, without retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &CallRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &CallRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}

/// `reqwest`-backed transport that attaches the bearer credential.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    authorization: HeaderValue,
}

impl HttpTransport {
    /// `base_url` must be an absolute http(s) URL such as `https://tenant/api/v2/`.
    pub fn new(client: reqwest::Client, base_url: &str, credential: &Credential) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("API base URL '{}' cannot be a base", base_url)));
        }

        Ok(Self {
            client,
            base_url,
            authorization: credential.header_value()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a request, with segments percent-encoded.
    pub fn url_for(&self, request: &CallRequest) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::new("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(request.segments.iter());
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &CallRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(request)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, self.authorization.clone());

        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.to_string());
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

/// Build the shared HTTP client with the configured deadlines.
pub fn build_http_client(timeouts: &TimeoutConfig) -> ApiResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .build()
        .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {}", e)))
}
