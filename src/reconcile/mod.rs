//! Reconciliation of desired state against the management API.
//!
//! # Responsibilities
//! - Select the typed operation for a resource kind tag
//! - Decide the transition (create, update or delete) for one resource

pub mod reconciler;
pub mod state;

pub use crate::management::ResourceKind;
pub use reconciler::{Action, Reconciler, Reconciliation};
pub use state::{DesiredState, RemoteState};
