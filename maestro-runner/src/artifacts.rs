//! Artifact export — one JSON record per strategy plus a batch summary CSV.
//!
//! Layout, one timestamped directory per batch:
//!
//! ```text
//! runs/deploy-20260807-153012/
//!   summary.csv
//!   outcomes/<strategy>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::batch::{BatchSummary, DeployOutcome, StrategyOutcome};

/// Artifact writing failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("artifact I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable per-strategy record written to `outcomes/<name>.json`.
#[derive(Debug, Serialize)]
struct OutcomeRecord<'a> {
    strategy: &'a str,
    status: &'static str,
    /// Platform identifier on success.
    id: Option<String>,
    /// Error detail on failure (operand text, field path, or the
    /// platform's verbatim rejection).
    error: Option<String>,
    fingerprint: Option<&'a str>,
    preflight_nodes: Option<usize>,
    warnings: &'a [String],
    recorded_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> OutcomeRecord<'a> {
    fn from_outcome(entry: &'a StrategyOutcome, at: chrono::DateTime<chrono::Utc>) -> Self {
        let (id, error, fingerprint, preflight_nodes) = match &entry.outcome {
            DeployOutcome::Deployed {
                id,
                fingerprint,
                preflight,
            } => (
                Some(id.to_string()),
                None,
                Some(fingerprint.as_str()),
                Some(preflight.nodes),
            ),
            DeployOutcome::CompileFailed(e) => (None, Some(e.to_string()), None, None),
            DeployOutcome::ValidationFailed(e) => (None, Some(e.to_string()), None, None),
            DeployOutcome::SubmitFailed {
                error,
                fingerprint,
                preflight,
            } => (
                None,
                Some(error.to_string()),
                Some(fingerprint.as_str()),
                Some(preflight.nodes),
            ),
        };

        Self {
            strategy: &entry.strategy,
            status: entry.outcome.status(),
            id,
            error,
            fingerprint,
            preflight_nodes,
            warnings: &entry.warnings,
            recorded_at: at,
        }
    }
}

/// Write the full artifact set for a batch; returns the run directory.
pub fn save_artifacts(summary: &BatchSummary, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let now = chrono::Utc::now();
    let run_dir = output_dir.join(format!("deploy-{}", now.format("%Y%m%d-%H%M%S")));
    let outcomes_dir = run_dir.join("outcomes");
    fs::create_dir_all(&outcomes_dir)?;

    // Per-strategy JSON records.
    for entry in &summary.outcomes {
        let record = OutcomeRecord::from_outcome(entry, now);
        let path = outcomes_dir.join(format!("{}.json", file_stem(&entry.strategy)));
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
    }

    // Batch summary CSV.
    let mut writer = csv::Writer::from_path(run_dir.join("summary.csv"))?;
    writer.write_record(["strategy", "status", "id", "fingerprint", "error"])?;
    for entry in &summary.outcomes {
        let record = OutcomeRecord::from_outcome(entry, now);
        writer.write_record([
            record.strategy,
            record.status,
            record.id.as_deref().unwrap_or(""),
            record.fingerprint.unwrap_or(""),
            record.error.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;

    Ok(run_dir)
}

/// Strategy names become file stems; anything outside [A-Za-z0-9._-] is
/// replaced so two different names cannot silently collide on case alone.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────
