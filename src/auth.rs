//! Management API credentials.
//!
//! A bearer token is obtained once through the client-credentials exchange and
//! then held immutably for the lifetime of the client. Refresh is not automatic:
//! callers that need a new token ask a [`TokenSource`] explicitly and build a
//! new client from it.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::{ApiError, ApiResult};

/// Immutable bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> ApiResult<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))
            .map_err(|e| ApiError::Config(format!("invalid access token: {}", e)))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Explicit re-fetch capability for credentials.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> ApiResult<Credential>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: String,
}

/// Client-credentials exchange against the tenant's token endpoint.
pub struct ClientCredentials {
    http: reqwest::Client,
    token_url: String,
    audience: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            audience: config.audience(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl TokenSource for ClientCredentials {
    async fn fetch(&self) -> ApiResult<Credential> {
        tracing::info!(token_url = %self.token_url, "Requesting management API token");

        let request = LoginRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            audience: &self.audience,
            grant_type: "client_credentials",
        };

        let response = self
            .http
            .post(&self.token_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                attempts: 1,
                message: format!("could not log in: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            attempts: 1,
            message: format!("could not read token response: {}", e),
        })?;

        if status.as_u16() >= 300 {
            return Err(ApiError::Auth { status, body });
        }

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::decode("token", e))?;
        if login.access_token.is_empty() {
            return Err(ApiError::Invariant("token response carried no access_token".into()));
        }

        Ok(Credential::new(login.access_token))
    }
}
