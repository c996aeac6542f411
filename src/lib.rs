//! Auth0 management API reconciliation library.
//!
//! # Architecture Overview
//!
//! ```text
//!     Desired state ──▶ reconcile ──▶ management ──▶ resilience ──▶ Management API
//!                          │             │    │           │
//!                          │             │    │           └─ retry, backoff, classify
//!                          │             │    └─ grants: natural key / id scan
//!                          │             └─ patch: ordered field-group updates
//!                          └─ create / read / import / update / delete by kind
//!
//!     Cross-cutting: config, auth (client credentials), observability, error
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod management;
pub mod observability;
pub mod patch;
pub mod reconcile;
pub mod resilience;

pub use config::ProviderConfig;
pub use error::{ApiError, ApiResult};
pub use management::ManagementClient;
pub use reconcile::{DesiredState, Reconciler, RemoteState, ResourceKind};
