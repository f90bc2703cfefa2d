//! Deployment — the sole network boundary.
//!
//! `DeployTarget` abstracts the remote platform so the batch runner can be
//! exercised against a mock; `PlatformClient` is the real HTTP
//! implementation. Submissions are made exactly once per call: the
//! platform exposes no partial-success semantics, so a failed or timed-out
//! call is surfaced as-is and never retried automatically.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::SymphonyId;

pub mod platform;

pub use platform::PlatformClient;

/// Presentation metadata submitted alongside the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployMeta {
    /// Display color shown by the platform, e.g. `#BF40BF`.
    pub color: String,
    /// Short tag grouping related deployments.
    pub tag: String,
}

/// Deployment failure modes.
///
/// `Rejected` preserves the platform's error text verbatim — it is opaque
/// ("not valid under any of the given schemas") and not worth
/// reinterpreting locally; the preflight validator is where actionable
/// diagnostics come from.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Could not reach the platform, or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The platform answered with an error status; body kept verbatim.
    #[error("platform rejected the submission (HTTP {status}): {raw}")]
    Rejected { status: u16, raw: String },

    /// A success status whose body did not contain the expected identifier.
    #[error("malformed platform response: {0}")]
    MalformedResponse(String),
}

impl DeployError {
    /// The platform's raw error text, where one exists.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            DeployError::Rejected { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// The remote platform boundary.
pub trait DeployTarget: Send + Sync {
    /// Human-readable target name for progress output.
    fn name(&self) -> &str;

    /// Submit a validated document; returns the platform-assigned id.
    ///
    /// One attempt per call. Callers own sequencing and rate limiting.
    fn submit(&self, document: &Value, meta: &DeployMeta) -> Result<SymphonyId, DeployError>;
}
