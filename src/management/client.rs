//! Typed management API client.
//!
//! # Responsibilities
//! - Map create/read/update/delete per resource kind onto executor calls
//! - Decode bodies and separate "absent" from "failed"
//! - Route updates through the patch sequencer
//!
//! # Data Flow
//! ```text
//! get_by_id / create / delete:
//!     → CallExecutor::execute (retry, classify)
//!     → decode into the resource type, check identity
//! update:
//!     → Resource::patch_plan (ordered fragments)
//!     → run_plan → one PATCH per non-empty fragment, strictly in order
//! ```

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{ClientCredentials, TokenSource};
use crate::config::{GrantScanConfig, ProviderConfig};
use crate::error::{ApiError, ApiResult};
use crate::management::kind::ResourceKind;
use crate::management::resource::Resource;
use crate::patch::{run_plan, PatchFragment};
use crate::resilience::{
    build_http_client, CallExecutor, CallRequest, HttpTransport, Outcome, RetryPolicy, Transport,
};

/// Client for the management API, generic over the transport.
///
/// Cloning is cheap; clones share the executor, credential and retry policy.
pub struct ManagementClient<T = HttpTransport> {
    executor: Arc<CallExecutor<T>>,
    scan: GrantScanConfig,
}

impl<T> Clone for ManagementClient<T> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            scan: self.scan.clone(),
        }
    }
}

impl ManagementClient<HttpTransport> {
    /// Authenticate with client credentials and build a client over HTTPS.
    pub async fn connect(config: &ProviderConfig) -> ApiResult<Self> {
        let http = build_http_client(&config.timeouts)?;
        let source = ClientCredentials::new(http.clone(), config);
        Self::connect_with(config, http, &source).await
    }

    /// Build a client with a credential fetched from `source`.
    pub async fn connect_with(
        config: &ProviderConfig,
        http: reqwest::Client,
        source: &dyn TokenSource,
    ) -> ApiResult<Self> {
        let credential = source.fetch().await?;
        let transport = HttpTransport::new(http, &config.api_base(), &credential)?;

        tracing::info!(
            base_url = %transport.base_url(),
            max_attempts = config.retries.max_attempts,
            "Management API client ready"
        );

        Ok(Self::with_transport(
            transport,
            RetryPolicy::from(&config.retries),
            config.grants.clone(),
        ))
    }
}

impl<T: Transport> ManagementClient<T> {
    pub fn with_transport(transport: T, policy: RetryPolicy, scan: GrantScanConfig) -> Self {
        Self {
            executor: Arc::new(CallExecutor::new(transport, policy)),
            scan,
        }
    }

    pub fn executor(&self) -> &CallExecutor<T> {
        &self.executor
    }

    pub fn scan_config(&self) -> &GrantScanConfig {
        &self.scan
    }

    /// Fetch one resource. `Ok(None)` when it does not exist.
    ///
    /// A 404, an empty `id`, and a success body without an identity all mean
    /// absent. Kinds without a direct read endpoint fall back to the id scan.
    pub async fn get_by_id<R: Resource>(&self, id: &str) -> ApiResult<Option<R>> {
        if id.is_empty() {
            return Ok(None);
        }
        if !R::DIRECT_READ {
            return self.scan_by_id::<R>(id).await;
        }

        let request = CallRequest::get(&[R::KIND.collection(), id]);
        match self.executor.execute(&request).await? {
            Outcome::NotFound { .. } => {
                tracing::debug!(kind = %R::KIND, id = %id, "Resource not found");
                Ok(None)
            }
            Outcome::Success { body, .. } => {
                let resource: R = decode(&body, R::KIND, "read")?;
                if resource.id().is_empty() {
                    tracing::warn!(kind = %R::KIND, id = %id, "Read returned a record without identity");
                    return Ok(None);
                }
                Ok(Some(resource))
            }
        }
    }

    /// Create a resource. Never retried on transport failure.
    pub async fn create<R: Resource>(&self, desired: &R::Desired) -> ApiResult<R> {
        let request = CallRequest::post(&[R::KIND.collection()], R::create_body(desired)?);
        self.submit_create::<R>(request).await
    }

    /// Create a resource with a caller-supplied idempotency key, which makes
    /// the call safe to retry.
    pub async fn create_idempotent<R: Resource>(&self, desired: &R::Desired, key: &str) -> ApiResult<R> {
        let request =
            CallRequest::post(&[R::KIND.collection()], R::create_body(desired)?).with_idempotency_key(key);
        self.submit_create::<R>(request).await
    }

    async fn submit_create<R: Resource>(&self, request: CallRequest) -> ApiResult<R> {
        let created: R = self.expect_body(&request, "create").await?;
        if created.id().is_empty() {
            return Err(ApiError::Invariant(format!(
                "could not create {}: response carried no id",
                R::KIND
            )));
        }

        tracing::info!(kind = %R::KIND, id = %created.id(), "Created resource");
        Ok(created)
    }

    /// Apply `desired` to an existing resource through its patch plan.
    ///
    /// A failing stage surfaces as [`ApiError::PatchFailed`]. When the plan
    /// carries no fields the current remote state is read instead.
    pub async fn update<R: Resource>(&self, id: &str, desired: &R::Desired) -> ApiResult<R> {
        let plan = R::patch_plan(desired)?;
        let last = run_plan(&plan, move |fragment| self.patch_once::<R>(id, fragment)).await?;

        let updated = match last {
            Some(updated) => updated,
            None => self.get_by_id::<R>(id).await?.ok_or_else(|| ApiError::Remote {
                status: StatusCode::NOT_FOUND,
                body: format!("{} '{}' not found", R::KIND, id),
            })?,
        };

        if updated.id().is_empty() {
            return Err(ApiError::Invariant(format!(
                "update of {} '{}' returned no id",
                R::KIND,
                id
            )));
        }

        tracing::info!(kind = %R::KIND, id = %id, stages = plan.len(), "Updated resource");
        Ok(updated)
    }

    async fn patch_once<R: Resource>(&self, id: &str, fragment: PatchFragment) -> ApiResult<R> {
        let request = CallRequest::patch(&[R::KIND.collection(), id], Value::Object(fragment.body));
        self.expect_body(&request, "update").await
    }

    /// Delete a resource. Already-absent resources count as deleted.
    pub async fn delete(&self, kind: ResourceKind, id: &str) -> ApiResult<()> {
        if id.is_empty() {
            return Ok(());
        }

        let request = CallRequest::delete(&[kind.collection(), id]);
        match self.executor.execute(&request).await? {
            Outcome::Success { .. } => tracing::info!(kind = %kind, id = %id, "Deleted resource"),
            Outcome::NotFound { .. } => {
                tracing::debug!(kind = %kind, id = %id, "Resource already absent")
            }
        }
        Ok(())
    }

    /// List a collection with the given query parameters.
    pub async fn list<R: Resource>(&self, query: &[(&str, String)]) -> ApiResult<Vec<R>> {
        let mut request = CallRequest::get(&[R::KIND.collection()]);
        for (key, value) in query {
            request = request.with_query(key, value.clone());
        }

        match self.executor.execute(&request).await? {
            Outcome::NotFound { .. } => Ok(Vec::new()),
            Outcome::Success { body, .. } => decode(&body, R::KIND, "list"),
        }
    }

    /// Execute a call whose success body must decode into `D`; 404 is an error.
    async fn expect_body<D: DeserializeOwned>(&self, request: &CallRequest, op: &str) -> ApiResult<D> {
        let kind = request.segments.first().map(String::as_str).unwrap_or_default();
        match self.executor.execute(request).await? {
            Outcome::Success { body, .. } => {
                serde_json::from_str(&body).map_err(|e| ApiError::decode(format!("{} {}", kind, op), e))
            }
            Outcome::NotFound { body } => Err(ApiError::Remote {
                status: StatusCode::NOT_FOUND,
                body,
            }),
        }
    }
}

fn decode<D: DeserializeOwned>(body: &str, kind: ResourceKind, op: &str) -> ApiResult<D> {
    serde_json::from_str(body).map_err(|e| ApiError::decode(format!("{} {}", kind, op), e))
}
