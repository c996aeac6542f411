//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, AUTH0_* env overrides)
//!     → validation.rs (semantic checks)
//!     → ProviderConfig (validated, immutable)
//!     → RetryPolicy + Credential built once, shared read-only by every call
//! ```
//!
//! All fields have defaults to allow minimal configs.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{config_from_env, load_config, ConfigError};
pub use schema::{GrantScanConfig, ObservabilityConfig, ProviderConfig, RetryConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
