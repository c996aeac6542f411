//! Resource kind tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of resource kinds managed through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    User,
    Client,
    Api,
    ClientGrant,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::User,
        ResourceKind::Client,
        ResourceKind::Api,
        ResourceKind::ClientGrant,
    ];

    /// Collection path segment under the API base.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::User => "users",
            ResourceKind::Client => "clients",
            ResourceKind::Api => "resource-servers",
            ResourceKind::ClientGrant => "client-grants",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Client => "client",
            ResourceKind::Api => "api",
            ResourceKind::ClientGrant => "client-grant",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "user" | "users" => Ok(ResourceKind::User),
            "client" | "clients" => Ok(ResourceKind::Client),
            "api" | "apis" | "resource-server" | "resource-servers" => Ok(ResourceKind::Api),
            "client-grant" | "client-grants" | "grant" => Ok(ResourceKind::ClientGrant),
            other => Err(format!(
                "unknown resource kind '{}' (expected user, client, api or client-grant)",
                other
            )),
        }
    }
}
