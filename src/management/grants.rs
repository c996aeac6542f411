//! Client-grant lookup.
//!
//! A grant is addressed either by its natural key (client id + audience),
//! which the API can filter server-side, or by its opaque id, which it cannot.
//! The id path pages through the whole collection.
//!
//! # Invariants
//! - Both paths agree: a grant reachable by natural key is reachable by its id.
//! - Zero or several natural-key matches resolve to absent, never to an error.
//! - The id scan stops at the first short page, at the match, or at
//!   `max_pages` (as [`ApiError::ScanLimit`]).

use crate::error::{ApiError, ApiResult};
use crate::management::client::ManagementClient;
use crate::management::resource::Resource;
use crate::management::types::ClientGrant;
use crate::resilience::Transport;

impl<T: Transport> ManagementClient<T> {
    /// Look a grant up by `(client_id, audience)`.
    pub async fn find_grant(&self, client_id: &str, audience: &str) -> ApiResult<Option<ClientGrant>> {
        let query = [("client_id", client_id.to_string()), ("audience", audience.to_string())];
        self.find_unique::<ClientGrant>(&query).await
    }

    /// The single record of `R` matching `query`; zero or several matches are absent.
    pub(crate) async fn find_unique<R: Resource>(&self, query: &[(&str, String)]) -> ApiResult<Option<R>> {
        let mut matches = self.list::<R>(query).await?;

        if matches.len() != 1 || matches[0].id().is_empty() {
            tracing::debug!(
                kind = %R::KIND,
                query = ?query,
                matches = matches.len(),
                "No unique record for lookup query"
            );
            return Ok(None);
        }
        Ok(matches.pop())
    }

    /// Look a grant up by id by scanning the collection.
    pub async fn find_grant_by_id(&self, id: &str) -> ApiResult<Option<ClientGrant>> {
        if id.is_empty() {
            return Ok(None);
        }
        self.scan_by_id::<ClientGrant>(id).await
    }

    /// Natural key when both parts are known, id scan otherwise.
    pub async fn resolve_grant(
        &self,
        id: &str,
        natural_key: Option<(&str, &str)>,
    ) -> ApiResult<Option<ClientGrant>> {
        match natural_key {
            Some((client_id, audience)) if !client_id.is_empty() && !audience.is_empty() => {
                self.find_grant(client_id, audience).await
            }
            _ => self.find_grant_by_id(id).await,
        }
    }

    /// Page through `R`'s collection until a record with `id` turns up.
    pub(crate) async fn scan_by_id<R: Resource>(&self, id: &str) -> ApiResult<Option<R>> {
        let page_size = self.scan_config().page_size.max(1);
        let max_pages = self.scan_config().max_pages.max(1);

        for page in 0..max_pages {
            let query = [("page", page.to_string()), ("per_page", page_size.to_string())];
            let records = self.list::<R>(&query).await?;
            let fetched = records.len();

            if let Some(found) = records.into_iter().find(|r| r.id() == id) {
                tracing::debug!(kind = %R::KIND, id = %id, pages = page + 1, "Found resource by scan");
                return Ok(Some(found));
            }
            if fetched < page_size as usize {
                tracing::debug!(kind = %R::KIND, id = %id, pages = page + 1, "Scan reached end of collection");
                return Ok(None);
            }
        }

        tracing::warn!(kind = %R::KIND, id = %id, pages = max_pages, "Scan stopped at page limit");
        Err(ApiError::ScanLimit { pages: max_pages })
    }
}
