//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the management API:
//!     → transport.rs (one HTTP exchange, bearer attached, deadline enforced)
//!     → On failure: retries.rs (is it transient? is the request retry-safe?)
//!     → backoff.rs (how long to wait before the next attempt)
//!     → executor.rs (loop, classify success / not-found / rejection)
//! ```

pub mod backoff;
pub mod executor;
pub mod retries;
pub mod transport;

pub use executor::{CallExecutor, Outcome};
pub use retries::RetryPolicy;
pub use transport::{build_http_client, CallRequest, HttpTransport, RawResponse, Transport, TransportError};
