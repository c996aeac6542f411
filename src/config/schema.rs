//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the provider.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the management API provider.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    /// Tenant domain (e.g. "example.eu.auth0.com").
    pub domain: String,

    /// Client id of the machine-to-machine application used for the token exchange.
    pub client_id: String,

    /// Client secret for the token exchange.
    pub client_secret: String,

    /// Origin override ("http://127.0.0.1:8080"); defaults to `https://{domain}`.
    pub endpoint: Option<String>,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Client-grant id scan bounds.
    pub grants: GrantScanConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("retries", &self.retries)
            .field("timeouts", &self.timeouts)
            .field("grants", &self.grants)
            .field("observability", &self.observability)
            .finish()
    }
}

impl ProviderConfig {
    /// Scheme, host and port every request is sent to.
    pub fn origin(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.domain),
        }
    }

    /// Base URL of the management API (always ends with a slash).
    pub fn api_base(&self) -> String {
        format!("{}/api/v2/", self.origin())
    }

    /// Token endpoint for the client-credentials exchange.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.origin())
    }

    /// Audience requested for the management token.
    ///
    /// Always derived from the domain, even when `endpoint` points elsewhere.
    pub fn audience(&self) -> String {
        format!("https://{}/api/v2/", self.domain)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per call (1 disables retries).
    pub max_attempts: u32,

    /// Delay between consecutive attempts in milliseconds.
    pub delay_ms: u64,

    /// Upper bound for exponential growth of the delay in milliseconds.
    /// Equal to `delay_ms` gives a fixed delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
            max_delay_ms: 1000,
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Bounds for the id-only client-grant lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GrantScanConfig {
    /// Grants requested per page (the API caps this at 100).
    pub page_size: u32,

    /// Maximum number of pages fetched before giving up.
    pub max_pages: u32,
}

impl Default for GrantScanConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_pages: 200,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
