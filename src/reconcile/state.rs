//! Desired and remote states, tagged by resource kind.

use serde::{Deserialize, Serialize};

use crate::management::{
    Api, ApiRequest, Client, ClientGrant, ClientGrantRequest, ClientRequest, Resource, ResourceKind,
    User, UserRequest,
};

/// What the caller wants a resource to look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DesiredState {
    User(UserRequest),
    Client(ClientRequest),
    Api(ApiRequest),
    ClientGrant(ClientGrantRequest),
}

impl DesiredState {
    pub fn kind(&self) -> ResourceKind {
        match self {
            DesiredState::User(_) => ResourceKind::User,
            DesiredState::Client(_) => ResourceKind::Client,
            DesiredState::Api(_) => ResourceKind::Api,
            DesiredState::ClientGrant(_) => ResourceKind::ClientGrant,
        }
    }

    /// `(client_id, audience)` of a grant, when both are set.
    pub fn grant_key(&self) -> Option<(&str, &str)> {
        match self {
            DesiredState::ClientGrant(grant) => grant.natural_key(),
            _ => None,
        }
    }
}

/// A resource as the API reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RemoteState {
    User(User),
    Client(Client),
    Api(Api),
    ClientGrant(ClientGrant),
}

impl RemoteState {
    pub fn kind(&self) -> ResourceKind {
        match self {
            RemoteState::User(_) => ResourceKind::User,
            RemoteState::Client(_) => ResourceKind::Client,
            RemoteState::Api(_) => ResourceKind::Api,
            RemoteState::ClientGrant(_) => ResourceKind::ClientGrant,
        }
    }

    /// Server-assigned identity.
    pub fn id(&self) -> &str {
        match self {
            RemoteState::User(user) => user.id(),
            RemoteState::Client(client) => client.id(),
            RemoteState::Api(api) => api.id(),
            RemoteState::ClientGrant(grant) => grant.id(),
        }
    }
}

impl From<User> for RemoteState {
    fn from(user: User) -> Self {
        RemoteState::User(user)
    }
}

impl From<Client> for RemoteState {
    fn from(client: Client) -> Self {
        RemoteState::Client(client)
    }
}

impl From<Api> for RemoteState {
    fn from(api: Api) -> Self {
        RemoteState::Api(api)
    }
}

impl From<ClientGrant> for RemoteState {
    fn from(grant: ClientGrant) -> Self {
        RemoteState::ClientGrant(grant)
    }
}
