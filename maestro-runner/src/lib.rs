//! Maestro Runner — batch compile/validate/deploy orchestration.
//!
//! - `config`: TOML run configuration (platform endpoint, credentials env,
//!   presentation defaults, output directory)
//! - `batch`: per-strategy outcomes, progress callbacks, rate-limited
//!   sequential submission over parallel pure compilation
//! - `artifacts`: per-strategy outcome JSON and a batch summary CSV

pub mod artifacts;
pub mod batch;
pub mod config;

pub use artifacts::{save_artifacts, ExportError};
pub use batch::{
    deploy_batch, BatchSummary, DeployOutcome, DeployProgress, StdoutProgress, StrategyOutcome,
};
pub use config::{ConfigError, RunConfig};
