//! Patch sequencing.
//!
//! Some resources cannot take every mutable field in a single update call: the
//! user endpoint silently drops or rejects `password` and `email_verified` when
//! they travel together with profile fields. A [`PatchPlan`] splits a desired
//! state into ordered field-group fragments; [`run_plan`] submits them one at a
//! time and stops at the first failure.
//!
//! # Invariants
//! - Fragments are applied strictly in plan order, never concurrently.
//! - A failure leaves earlier fragments applied remotely. Nothing is rolled
//!   back; the error names the failed group and the groups already applied.

pub mod sequencer;

pub use sequencer::run_plan;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Named subset of a resource's mutable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    /// User connection, email, name, metadata: everything not isolated below.
    Profile,
    /// User password.
    Password,
    /// User email verification flag.
    EmailVerification,
    /// All fields at once, for resources without update restrictions.
    Fields,
    /// Client-grant scope, the only field the grant endpoint accepts.
    Scope,
}

impl FieldGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Profile => "profile",
            FieldGroup::Password => "password",
            FieldGroup::EmailVerification => "email_verified",
            FieldGroup::Fields => "fields",
            FieldGroup::Scope => "scope",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One partial update request body.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchFragment {
    pub group: FieldGroup,
    pub body: Map<String, Value>,
}

impl PatchFragment {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Ordered list of fragments for one update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchPlan {
    fragments: Vec<PatchFragment>,
}

impl PatchPlan {
    /// Whole desired state in one fragment.
    pub fn single(group: FieldGroup, body: Map<String, Value>) -> Self {
        Self {
            fragments: vec![PatchFragment { group, body }],
        }
    }

    /// Split `body`: each `isolated` group takes its listed keys, and the
    /// `primary` group takes whatever is left. Primary comes first, then the
    /// isolated groups in the order given.
    pub fn partition(
        primary: FieldGroup,
        mut body: Map<String, Value>,
        isolated: &[(FieldGroup, &[&str])],
    ) -> Self {
        let mut rest = Vec::with_capacity(isolated.len());
        for (group, keys) in isolated {
            let mut fragment = Map::new();
            for key in keys.iter() {
                if let Some(value) = body.remove(*key) {
                    fragment.insert(key.to_string(), value);
                }
            }
            rest.push(PatchFragment { group: *group, body: fragment });
        }

        let mut fragments = vec![PatchFragment { group: primary, body }];
        fragments.extend(rest);
        Self { fragments }
    }

    pub fn fragments(&self) -> &[PatchFragment] {
        &self.fragments
    }

    pub fn groups(&self) -> Vec<FieldGroup> {
        self.fragments.iter().map(|f| f.group).collect()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// True when no fragment carries a field.
    pub fn is_noop(&self) -> bool {
        self.fragments.iter().all(PatchFragment::is_empty)
    }
}

/// Fields that must travel alone in their own user update, in submission order.
pub const USER_ISOLATED_FIELDS: [(FieldGroup, &[&str]); 2] = [
    (FieldGroup::Password, &["password"]),
    (FieldGroup::EmailVerification, &["email_verified"]),
];

/// Three-stage user plan: profile fields, then password, then verification flag.
pub fn user_plan(body: Map<String, Value>) -> PatchPlan {
    PatchPlan::partition(FieldGroup::Profile, body, &USER_ISOLATED_FIELDS)
}

/// Serialize a desired-state struct into a JSON object.
pub fn to_object<T: Serialize>(value: &T) -> ApiResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::Invariant(format!(
            "desired state must serialize to an object, got {}",
            other
        ))),
        Err(e) => Err(ApiError::Invariant(format!("could not encode desired state: {}", e))),
    }
}
