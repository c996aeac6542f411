//! Kind-dispatched reconciliation operations.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::management::{Api, Client, ClientGrant, ManagementClient, Resource, ResourceKind, User};
use crate::reconcile::state::{DesiredState, RemoteState};
use crate::resilience::{HttpTransport, Transport};

/// Transition chosen by [`Reconciler::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    /// An immutable field changed: the old record was deleted and a new one
    /// took its place.
    Replaced,
    Deleted,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub action: Action,
    /// Remote state afterwards; `None` after a delete.
    pub state: Option<RemoteState>,
}

/// Create/read/update/delete over the closed set of kinds.
pub struct Reconciler<T = HttpTransport> {
    client: ManagementClient<T>,
    idempotent_creates: bool,
}

impl<T> Clone for Reconciler<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            idempotent_creates: self.idempotent_creates,
        }
    }
}

impl<T: Transport> Reconciler<T> {
    pub fn new(client: ManagementClient<T>) -> Self {
        Self {
            client,
            idempotent_creates: false,
        }
    }

    /// Send every create with a fresh idempotency key, making it retryable.
    /// Only enable this against an API that honours the key.
    pub fn with_idempotent_creates(mut self) -> Self {
        self.idempotent_creates = true;
        self
    }

    pub fn client(&self) -> &ManagementClient<T> {
        &self.client
    }

    pub async fn create(&self, desired: &DesiredState) -> ApiResult<RemoteState> {
        let state = match desired {
            DesiredState::User(d) => self.create_one::<User>(d).await?.into(),
            DesiredState::Client(d) => self.create_one::<Client>(d).await?.into(),
            DesiredState::Api(d) => self.create_one::<Api>(d).await?.into(),
            DesiredState::ClientGrant(d) => self.create_one::<ClientGrant>(d).await?.into(),
        };
        Ok(state)
    }

    async fn create_one<R: Resource>(&self, desired: &R::Desired) -> ApiResult<R> {
        if self.idempotent_creates {
            let key = Uuid::new_v4().to_string();
            self.client.create_idempotent::<R>(desired, &key).await
        } else {
            self.client.create::<R>(desired).await
        }
    }

    /// Read a resource. For grants, the natural key in `desired` is used when
    /// present and the id scan otherwise.
    pub async fn read(
        &self,
        kind: ResourceKind,
        id: &str,
        desired: Option<&DesiredState>,
    ) -> ApiResult<Option<RemoteState>> {
        let state = match kind {
            ResourceKind::User => self.client.get_by_id::<User>(id).await?.map(Into::into),
            ResourceKind::Client => self.client.get_by_id::<Client>(id).await?.map(Into::into),
            ResourceKind::Api => self.client.get_by_id::<Api>(id).await?.map(Into::into),
            ResourceKind::ClientGrant => {
                let key = desired.and_then(DesiredState::grant_key);
                self.client.resolve_grant(id, key).await?.map(Into::into)
            }
        };
        Ok(state)
    }

    /// Adopt an existing resource known only by id.
    pub async fn import(&self, kind: ResourceKind, id: &str) -> ApiResult<Option<RemoteState>> {
        tracing::info!(kind = %kind, id = %id, "Importing resource");
        self.read(kind, id, None).await
    }

    pub async fn update(&self, id: &str, desired: &DesiredState) -> ApiResult<RemoteState> {
        let state = match desired {
            DesiredState::User(d) => self.client.update::<User>(id, d).await?.into(),
            DesiredState::Client(d) => self.client.update::<Client>(id, d).await?.into(),
            DesiredState::Api(d) => self.client.update::<Api>(id, d).await?.into(),
            DesiredState::ClientGrant(d) => self.client.update::<ClientGrant>(id, d).await?.into(),
        };
        Ok(state)
    }

    pub async fn delete(&self, kind: ResourceKind, id: &str) -> ApiResult<()> {
        self.client.delete(kind, id).await
    }

    /// Move the remote resource toward `desired`.
    ///
    /// No desired state deletes `id`. A known id that still exists remotely is
    /// updated, or replaced when `desired` changes one of its immutable fields.
    /// Otherwise a record matching `desired` by lookup query is adopted, and
    /// failing that one is created.
    pub async fn reconcile(
        &self,
        kind: ResourceKind,
        id: Option<&str>,
        desired: Option<&DesiredState>,
    ) -> ApiResult<Reconciliation> {
        let id = id.unwrap_or_default();
        let Some(desired) = desired else {
            self.delete(kind, id).await?;
            return Ok(Reconciliation {
                action: Action::Deleted,
                state: None,
            });
        };

        if desired.kind() != kind {
            return Err(ApiError::Invariant(format!(
                "desired state is a {}, expected a {}",
                desired.kind(),
                kind
            )));
        }

        let (action, state) = match desired {
            DesiredState::User(d) => self.converge::<User>(id, d).await?,
            DesiredState::Client(d) => self.converge::<Client>(id, d).await?,
            DesiredState::Api(d) => self.converge::<Api>(id, d).await?,
            DesiredState::ClientGrant(d) => self.converge::<ClientGrant>(id, d).await?,
        };

        tracing::info!(kind = %kind, id = %state.id(), action = ?action, "Reconciled resource");
        Ok(Reconciliation {
            action,
            state: Some(state),
        })
    }

    async fn converge<R>(&self, id: &str, desired: &R::Desired) -> ApiResult<(Action, RemoteState)>
    where
        R: Resource,
        RemoteState: From<R>,
    {
        let mut replaced = false;
        if let Some(current) = self.client.get_by_id::<R>(id).await? {
            if !current.replaced_by(desired) {
                let updated = self.client.update::<R>(current.id(), desired).await?;
                return Ok((Action::Updated, updated.into()));
            }
            tracing::info!(kind = %R::KIND, id = %current.id(), "Immutable field changed, replacing resource");
            self.client.delete(R::KIND, current.id()).await?;
            replaced = true;
        }

        if let Some(query) = R::lookup_query(desired) {
            if let Some(existing) = self.client.find_unique::<R>(&query).await? {
                let updated = self.client.update::<R>(existing.id(), desired).await?;
                let action = if replaced { Action::Replaced } else { Action::Updated };
                return Ok((action, updated.into()));
            }
        }

        let created = self.create_one::<R>(desired).await?;
        let action = if replaced { Action::Replaced } else { Action::Created };
        Ok((action, created.into()))
    }
}
