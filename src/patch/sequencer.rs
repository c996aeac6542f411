//! Sequential submission of a patch plan.

use std::future::Future;

use crate::error::{ApiError, ApiResult};
use crate::observability::metrics;
use crate::patch::{FieldGroup, PatchFragment, PatchPlan};

/// Submit every non-empty fragment in order through `submit`.
///
/// Returns the response of the last submitted fragment, or `None` when the
/// plan carried no fields at all. The first failure stops the sequence and is
/// returned as [`ApiError::PatchFailed`]; later fragments are never sent.
pub async fn run_plan<R, F, Fut>(plan: &PatchPlan, mut submit: F) -> ApiResult<Option<R>>
where
    F: FnMut(PatchFragment) -> Fut,
    Fut: Future<Output = ApiResult<R>>,
{
    let mut applied: Vec<FieldGroup> = Vec::with_capacity(plan.len());
    let mut last = None;

    for fragment in plan.fragments() {
        let group = fragment.group;
        if fragment.is_empty() {
            // The API rejects empty payloads; skipping leaves remote state unchanged.
            tracing::debug!(group = %group, "Skipping empty patch fragment");
            continue;
        }

        tracing::debug!(group = %group, fields = fragment.body.len(), "Applying patch fragment");

        match submit(fragment.clone()).await {
            Ok(response) => {
                metrics::record_patch_stage(group.as_str(), true);
                applied.push(group);
                last = Some(response);
            }
            Err(source) => {
                metrics::record_patch_stage(group.as_str(), false);
                tracing::warn!(
                    group = %group,
                    applied = ?applied,
                    error = %source,
                    "Patch fragment failed, remaining fragments not applied"
                );
                return Err(ApiError::PatchFailed {
                    group,
                    applied,
                    source: Box::new(source),
                });
            }
        }
    }

    Ok(last)
}
