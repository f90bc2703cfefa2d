//! Batch orchestration — compile, validate, deploy with per-strategy outcomes.
//!
//! Compilation and validation are pure, so the batch compiles on worker
//! threads; submissions then go out sequentially with a minimum interval
//! between network calls. Errors are scoped per strategy: one bad
//! condition or one platform rejection never aborts its siblings, and the
//! caller gets an outcome for every input.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use maestro_core::compiler::{compile_strategy, CompileError, CompiledDocument};
use maestro_core::deploy::{DeployError, DeployMeta, DeployTarget};
use maestro_core::domain::{Strategy, SymphonyId};
use maestro_core::validate::{preflight, PreflightReport, ValidateError};

/// Outcome of one strategy's trip through the pipeline.
#[derive(Debug)]
pub enum DeployOutcome {
    /// Deployed; the platform assigned an identifier.
    Deployed {
        id: SymphonyId,
        fingerprint: String,
        preflight: PreflightReport,
    },

    /// Compilation failed — operand, condition, or weight error.
    CompileFailed(CompileError),

    /// The document failed local preflight validation (field path inside).
    /// Always raised before any network attempt.
    ValidationFailed(ValidateError),

    /// Submission failed. The error keeps the platform's text verbatim;
    /// `preflight` is the passing local assessment, so "our validator
    /// missed something" is distinguishable from a transient platform
    /// failure.
    SubmitFailed {
        error: DeployError,
        fingerprint: String,
        preflight: PreflightReport,
    },
}

impl DeployOutcome {
    pub fn is_deployed(&self) -> bool {
        matches!(self, DeployOutcome::Deployed { .. })
    }

    /// Short status word for progress lines and the summary CSV.
    pub fn status(&self) -> &'static str {
        match self {
            DeployOutcome::Deployed { .. } => "deployed",
            DeployOutcome::CompileFailed(_) => "compile_failed",
            DeployOutcome::ValidationFailed(_) => "validation_failed",
            DeployOutcome::SubmitFailed { .. } => "submit_failed",
        }
    }

    /// Human-readable detail: the identifier on success, the error otherwise.
    pub fn detail(&self) -> String {
        match self {
            DeployOutcome::Deployed { id, .. } => id.to_string(),
            DeployOutcome::CompileFailed(e) => e.to_string(),
            DeployOutcome::ValidationFailed(e) => e.to_string(),
            DeployOutcome::SubmitFailed { error, .. } => error.to_string(),
        }
    }
}

/// Per-strategy record in the batch summary.
#[derive(Debug)]
pub struct StrategyOutcome {
    /// Strategy display name.
    pub strategy: String,
    /// Non-fatal compilation warnings (unknown venues, ...).
    pub warnings: Vec<String>,
    pub outcome: DeployOutcome,
}

/// Summary of a whole batch.
#[derive(Debug)]
pub struct BatchSummary {
    pub total: usize,
    pub deployed: usize,
    pub failed: usize,
    pub outcomes: Vec<StrategyOutcome>,
}

impl BatchSummary {
    pub fn all_deployed(&self) -> bool {
        self.failed == 0
    }
}

/// Progress callbacks for a batch deploy.
pub trait DeployProgress: Send {
    /// Called when a strategy's submission step begins.
    fn on_start(&self, name: &str, index: usize, total: usize);

    /// Called when a strategy's outcome is known.
    fn on_complete(&self, name: &str, index: usize, total: usize, outcome: &DeployOutcome);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, deployed: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DeployProgress for StdoutProgress {
    fn on_start(&self, name: &str, index: usize, total: usize) {
        println!("[{}/{}] Deploying {name}...", index + 1, total);
    }

    fn on_complete(&self, name: &str, _index: usize, _total: usize, outcome: &DeployOutcome) {
        match outcome {
            DeployOutcome::Deployed { id, .. } => println!("  OK: {name} -> {id}"),
            other => println!("  FAIL ({}): {name}: {}", other.status(), other.detail()),
        }
    }

    fn on_batch_complete(&self, deployed: usize, failed: usize, total: usize) {
        println!("\nBatch complete: {deployed}/{total} deployed, {failed} failed");
    }
}

/// Compile, validate, and deploy a batch of strategies.
///
/// Strategies that fail compilation or preflight never reach the network;
/// everything else is submitted once, in input order, with at least
/// `min_interval` between consecutive calls.
pub fn deploy_batch(
    target: &dyn DeployTarget,
    strategies: &[Strategy],
    meta: &DeployMeta,
    min_interval: Duration,
    progress: &dyn DeployProgress,
) -> BatchSummary {
    let total = strategies.len();

    // Pure stage: compile + preflight on worker threads.
    let prepared: Vec<Prepared> = strategies.par_iter().map(prepare).collect();

    // Network stage: sequential and rate-limited, one attempt each.
    let mut outcomes = Vec::with_capacity(total);
    let mut deployed = 0;
    let mut failed = 0;
    let mut last_submit: Option<Instant> = None;

    for (i, (strategy, prep)) in strategies.iter().zip(prepared).enumerate() {
        progress.on_start(&strategy.name, i, total);

        let (outcome, warnings) = match prep {
            Prepared::Ready(doc, report) => {
                if let Some(at) = last_submit {
                    let elapsed = at.elapsed();
                    if elapsed < min_interval {
                        std::thread::sleep(min_interval - elapsed);
                    }
                }
                last_submit = Some(Instant::now());

                let outcome = match target.submit(&doc.document, meta) {
                    Ok(id) => DeployOutcome::Deployed {
                        id,
                        fingerprint: doc.fingerprint.clone(),
                        preflight: report,
                    },
                    Err(error) => DeployOutcome::SubmitFailed {
                        error,
                        fingerprint: doc.fingerprint.clone(),
                        preflight: report,
                    },
                };
                (outcome, doc.warnings)
            }
            Prepared::Failed(outcome, warnings) => (outcome, warnings),
        };

        progress.on_complete(&strategy.name, i, total, &outcome);
        if outcome.is_deployed() {
            deployed += 1;
        } else {
            failed += 1;
        }
        outcomes.push(StrategyOutcome {
            strategy: strategy.name.clone(),
            warnings,
            outcome,
        });
    }

    progress.on_batch_complete(deployed, failed, total);

    BatchSummary {
        total,
        deployed,
        failed,
        outcomes,
    }
}

/// Result of the pure per-strategy stage.
enum Prepared {
    Ready(CompiledDocument, PreflightReport),
    Failed(DeployOutcome, Vec<String>),
}

fn prepare(strategy: &Strategy) -> Prepared {
    let doc = match compile_strategy(strategy) {
        Ok(doc) => doc,
        Err(e) => return Prepared::Failed(DeployOutcome::CompileFailed(e), Vec::new()),
    };
    match preflight(&doc.document) {
        Ok(report) => Prepared::Ready(doc, report),
        Err(e) => Prepared::Failed(DeployOutcome::ValidationFailed(e), doc.warnings),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
