//! Retry logic.
//!
//! # Responsibilities
//! - Hold the process-wide retry policy (attempt limit, delay bounds)
//! - Determine if a failed attempt may be repeated
//!
//! Only transport failures and throttling (429) are retryable, and only for
//! retry-safe requests. Other rejections are permanent from our point of view.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Read-only retry policy, built once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Fixed delay between attempts. `max_attempts` is clamped to at least 1.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::exponential(max_attempts, delay, delay)
    }

    /// Delay doubling from `base_delay` up to `max_delay`.
    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay before the attempt following failed attempt `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay, self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::exponential(
            config.max_attempts,
            Duration::from_millis(config.delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}

/// Why an attempt did not produce a usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Connection error, timeout, or truncated body.
    Transport,
    /// The API answered 429 Too Many Requests.
    Throttled,
    /// Any other rejecting status.
    Rejected,
}

impl Failure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Failure::Transport => "transport",
            Failure::Throttled => "throttled",
            Failure::Rejected => "rejected",
        }
    }
}

/// Check if a failed attempt may be repeated.
pub fn is_retryable(retry_safe: bool, failure: Failure) -> bool {
    retry_safe && matches!(failure, Failure::Transport | Failure::Throttled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_failures_on_safe_requests() {
        assert!(is_retryable(true, Failure::Transport));
        assert!(is_retryable(true, Failure::Throttled));
        assert!(!is_retryable(true, Failure::Rejected));
        assert!(!is_retryable(false, Failure::Transport));
        assert!(!is_retryable(false, Failure::Throttled));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_attempts: 0,
            delay_ms: 200,
            max_delay_ms: 50,
        });

        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.base_delay(), Duration::from_millis(200));
        assert!(policy.delay_after(3) >= Duration::from_millis(200));
    }
}
