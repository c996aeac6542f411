//! Error taxonomy for calls against the management API.
//!
//! # Categories
//! - `Transport`: the request never produced a response (retried, then surfaced)
//! - `Remote`: the API answered with a rejecting status
//! - `Decode`: the body did not parse into the expected shape
//! - `Invariant`: the API reported success but the payload is unusable
//!
//! Everything is returned to the caller; nothing is logged-and-swallowed.

use reqwest::StatusCode;
use thiserror::Error;

use crate::patch::FieldGroup;

/// Result alias used across the crate.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors produced by the resource client and the call executor.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or connection failure after all permitted attempts.
    #[error("transport failure after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// The remote API rejected the request.
    #[error("bad status code ({status}): {body}")]
    Remote { status: StatusCode, body: String },

    /// Response body could not be decoded.
    #[error("could not parse {context} response: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API said yes but the payload cannot be used (e.g. no id on create).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A partial update stage failed; earlier stages remain applied remotely.
    #[error("patch stage '{group}' failed (applied before failure: {applied:?}): {source}")]
    PatchFailed {
        group: FieldGroup,
        applied: Vec<FieldGroup>,
        #[source]
        source: Box<ApiError>,
    },

    /// The id-based grant scan hit its page bound without a verdict.
    #[error("client-grant scan stopped after {pages} page(s) without reaching the end of the collection")]
    ScanLimit { pages: u32 },

    /// The client-credentials exchange was rejected.
    #[error("token request failed. status: {status}, body: {body}")]
    Auth { status: StatusCode, body: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Build a decode error with a short description of what was being parsed.
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Remote status attached to this error, looking through patch stages.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } | Self::Auth { status, .. } => Some(*status),
            Self::PatchFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Field group of the failed stage when this came out of the sequencer.
    pub fn failed_group(&self) -> Option<FieldGroup> {
        match self {
            Self::PatchFailed { group, .. } => Some(*group),
            _ => None,
        }
    }
}
