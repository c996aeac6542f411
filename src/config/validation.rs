//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts ≥ 1, page size within API limits)
//! - Check that credentials are present before any network call
//!
//! Returns all validation errors, not just the first.

use std::fmt;

use crate::config::schema::ProviderConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration: `ProviderConfig → Result<(), Vec<ValidationError>>`.
pub fn validate_config(config: &ProviderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.domain.trim().is_empty() {
        errors.push(ValidationError::new("domain", "must be set"));
    }
    if config.client_id.trim().is_empty() {
        errors.push(ValidationError::new("client_id", "must be set"));
    }
    if config.client_secret.is_empty() {
        errors.push(ValidationError::new("client_secret", "must be set"));
    }

    if let Some(endpoint) = &config.endpoint {
        match url::Url::parse(endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("endpoint", e.to_string())),
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.max_delay_ms < config.retries.delay_ms {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            "must not be smaller than retries.delay_ms",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !(1..=100).contains(&config.grants.page_size) {
        errors.push(ValidationError::new("grants.page_size", "must be between 1 and 100"));
    }
    if config.grants.max_pages == 0 {
        errors.push(ValidationError::new("grants.max_pages", "must be at least 1"));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}'", other),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProviderConfig {
        ProviderConfig {
            domain: "tenant.auth0.com".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ProviderConfig::default();
        config.retries.max_attempts = 0;
        config.grants.page_size = 500;
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();

        assert!(fields.contains(&"domain"));
        assert!(fields.contains(&"client_id"));
        assert!(fields.contains(&"client_secret"));
        assert!(fields.contains(&"retries.max_attempts"));
        assert!(fields.contains(&"grants.page_size"));
        assert!(fields.contains(&"observability.log_format"));
    }

    #[test]
    fn test_rejects_shrinking_delay_cap() {
        let mut config = valid();
        config.retries.delay_ms = 500;
        config.retries.max_delay_ms = 100;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "retries.max_delay_ms");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let mut config = valid();
        config.endpoint = Some("ftp://example.com".into());
        assert!(validate_config(&config).is_err());

        config.endpoint = Some("not a url".into());
        assert!(validate_config(&config).is_err());

        config.endpoint = Some("http://127.0.0.1:8080".into());
        assert!(validate_config(&config).is_ok());
    }
}
