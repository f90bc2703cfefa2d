//! Strategy compiler — logic tree to symphony document.
//!
//! - `allocation`: terminal `{assets, weights}` allocations to weighting nodes
//! - `tree`: recursive compilation of the conditional structure
//! - `document`: root assembly, warning collection, fingerprinting

pub mod allocation;
pub mod document;
pub mod tree;

pub use document::{compile_strategy, CompiledDocument};

use thiserror::Error;

use crate::condition::ConditionError;

/// Tolerance for the specified-weight sum check.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Errors scoped to compiling a single strategy.
///
/// Batch callers record these per strategy; one strategy failing never
/// aborts compilation of its siblings.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The strategy (or one of its allocations) has no assets.
    #[error("allocation has no assets")]
    EmptyAssets,

    /// Specified weights must sum to 1.0 within tolerance.
    #[error("specified weights sum to {sum} (expected 1.0 within {tolerance})", tolerance = WEIGHT_TOLERANCE)]
    WeightSumMismatch { sum: f64 },

    /// A weight names a ticker outside the allocation's asset set.
    #[error("weight specified for '{ticker}' which is not in the asset set")]
    UnknownWeightTicker { ticker: String },

    /// The condition could not be parsed or violates the platform rules.
    #[error(transparent)]
    Condition(#[from] ConditionError),
}
