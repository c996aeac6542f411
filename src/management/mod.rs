//! Resource client for the management API.
//!
//! # Data Flow
//! ```text
//! Typed operation (get_by_id / create / update / delete):
//!     → resource.rs (collection, identity, patch plan per kind)
//!     → client.rs (build request, execute, decode, absent vs failed)
//!     → grants.rs (client grants: natural-key filter or paged id scan)
//! ```

pub mod client;
pub mod grants;
pub mod kind;
pub mod resource;
pub mod types;

pub use client::ManagementClient;
pub use kind::ResourceKind;
pub use resource::Resource;
pub use types::{
    Api, ApiRequest, Client, ClientGrant, ClientGrantRequest, ClientRequest, Identity, Metadata, User,
    UserRequest,
};
