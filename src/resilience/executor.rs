//! Resilient call executor.
//!
//! # Responsibilities
//! - Send one request through the transport, repeating transient failures
//! - Classify the final response: success, not-found, or remote rejection
//! - Keep attempts strictly sequential with the policy delay in between

use std::time::Instant;

use reqwest::StatusCode;

use crate::error::{ApiError, ApiResult};
use crate::observability::metrics;
use crate::resilience::retries::{is_retryable, Failure, RetryPolicy};
use crate::resilience::transport::{CallRequest, RawResponse, Transport};

/// Non-error result of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx response.
    Success { status: StatusCode, body: String },
    /// 404 response; absence is a valid answer for reads and deletes.
    NotFound { body: String },
}

impl Outcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound { .. })
    }
}

/// Wraps a transport with retry-with-backoff and status classification.
#[derive(Debug, Clone)]
pub struct CallExecutor<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> CallExecutor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a request, making at most `policy.max_attempts()` attempts.
    pub async fn execute(&self, request: &CallRequest) -> ApiResult<Outcome> {
        let method = request.method.as_str();
        let path = request.path();
        let retry_safe = request.retry_safe();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let start = Instant::now();

            tracing::debug!(method = %method, path = %path, attempt, "Sending management API request");

            let failure = match self.transport.send(request).await {
                Ok(response) => {
                    metrics::record_request(method, response.status.as_u16(), start);
                    if response.status != StatusCode::TOO_MANY_REQUESTS {
                        return classify(response);
                    }
                    if attempt >= max_attempts || !is_retryable(retry_safe, Failure::Throttled) {
                        tracing::warn!(method = %method, path = %path, attempt, "Throttled, not retrying");
                        return classify(response);
                    }
                    Failure::Throttled
                }
                Err(e) => {
                    metrics::record_transport_failure(method);
                    tracing::warn!(method = %method, path = %path, attempt, error = %e, "Transport failure");
                    if attempt >= max_attempts || !is_retryable(retry_safe, Failure::Transport) {
                        return Err(ApiError::Transport {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    Failure::Transport
                }
            };

            let delay = self.policy.delay_after(attempt);
            metrics::record_retry(method, failure.as_str());
            tracing::info!(
                method = %method,
                path = %path,
                attempt,
                delay = ?delay,
                reason = failure.as_str(),
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Map a final response onto the three outcome buckets.
pub fn classify(response: RawResponse) -> ApiResult<Outcome> {
    let RawResponse { status, body } = response;
    if status.is_success() {
        Ok(Outcome::Success { status, body })
    } else if status == StatusCode::NOT_FOUND {
        Ok(Outcome::NotFound { body })
    } else {
        Err(ApiError::Remote { status, body })
    }
}
