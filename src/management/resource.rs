//! Per-kind resource operations.
//!
//! Each managed kind implements [`Resource`]: where it lives, how its identity
//! is read from a decoded body, and how a desired state becomes an ordered
//! [`PatchPlan`]. The client is generic over this trait, so adding a kind is
//! one impl block.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiResult;
use crate::management::kind::ResourceKind;
use crate::management::types::{
    Api, ApiRequest, Client, ClientGrant, ClientGrantRequest, ClientRequest, User, UserRequest,
};
use crate::patch::{to_object, user_plan, FieldGroup, PatchPlan};

/// A remote resource kind with typed desired and remote states.
pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// Whether `GET /{collection}/{id}` exists for this kind.
    const DIRECT_READ: bool = true;

    /// Desired-state type accepted by create and update.
    type Desired: Serialize + Send + Sync;

    /// Server-assigned identity; empty when the body carried none.
    fn id(&self) -> &str;

    /// Ordered update fragments for `desired`.
    fn patch_plan(desired: &Self::Desired) -> ApiResult<PatchPlan> {
        Ok(PatchPlan::single(FieldGroup::Fields, to_object(desired)?))
    }

    /// Create body for `desired`.
    fn create_body(desired: &Self::Desired) -> ApiResult<Value> {
        Ok(Value::Object(to_object(desired)?))
    }

    /// Whether reaching `desired` changes a field the API cannot update in
    /// place, so the record has to be deleted and created again.
    fn replaced_by(&self, _desired: &Self::Desired) -> bool {
        false
    }

    /// Collection query that finds the record for `desired` without its id.
    fn lookup_query(_desired: &Self::Desired) -> Option<Vec<(&'static str, String)>> {
        None
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;
    type Desired = UserRequest;

    fn id(&self) -> &str {
        &self.user_id
    }

    fn patch_plan(desired: &UserRequest) -> ApiResult<PatchPlan> {
        Ok(user_plan(to_object(desired)?))
    }
}

impl Resource for Client {
    const KIND: ResourceKind = ResourceKind::Client;
    type Desired = ClientRequest;

    fn id(&self) -> &str {
        &self.client_id
    }
}

impl Resource for Api {
    const KIND: ResourceKind = ResourceKind::Api;
    type Desired = ApiRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn patch_plan(desired: &ApiRequest) -> ApiResult<PatchPlan> {
        // The identifier of an API is immutable once created.
        let mut body = to_object(desired)?;
        body.remove("identifier");
        Ok(PatchPlan::single(FieldGroup::Fields, body))
    }

    fn replaced_by(&self, desired: &ApiRequest) -> bool {
        desired
            .identifier
            .as_ref()
            .is_some_and(|wanted| self.identifier.as_ref() != Some(wanted))
    }
}

impl Resource for ClientGrant {
    const KIND: ResourceKind = ResourceKind::ClientGrant;
    const DIRECT_READ: bool = false;
    type Desired = ClientGrantRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn patch_plan(desired: &ClientGrantRequest) -> ApiResult<PatchPlan> {
        let mut body = Map::new();
        body.insert(
            "scope".to_string(),
            Value::Array(desired.scope.iter().cloned().map(Value::String).collect()),
        );
        Ok(PatchPlan::single(FieldGroup::Scope, body))
    }

    fn replaced_by(&self, desired: &ClientGrantRequest) -> bool {
        self.client_id != desired.client_id || self.audience != desired.audience
    }

    fn lookup_query(desired: &ClientGrantRequest) -> Option<Vec<(&'static str, String)>> {
        desired.natural_key().map(|(client_id, audience)| {
            vec![("client_id", client_id.to_string()), ("audience", audience.to_string())]
        })
    }
}
