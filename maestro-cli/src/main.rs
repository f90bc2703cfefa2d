//! Maestro CLI — compile, validate, and deploy strategy candidates.
//!
//! Commands:
//! - `compile` — compile strategies to symphony documents, print or save them
//! - `validate` — compile + preflight only, report per-strategy results
//! - `deploy` — full batch deploy against the configured platform
//!
//! All commands read a JSON file containing an array of strategy records
//! as produced by the upstream generation/selection pipeline. Failures are
//! always per-strategy: one malformed condition is reported and the rest
//! of the batch proceeds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use maestro_core::compiler::compile_strategy;
use maestro_core::deploy::{DeployMeta, PlatformClient};
use maestro_core::domain::Strategy;
use maestro_core::validate::preflight;
use maestro_runner::{deploy_batch, save_artifacts, RunConfig, StdoutProgress};

#[derive(Parser)]
#[command(
    name = "maestro",
    about = "Maestro CLI — strategy-to-symphony compiler and deployer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile strategies to symphony documents without deploying.
    Compile {
        /// Path to a JSON file with an array of strategy records.
        strategies: PathBuf,

        /// Write each compiled document under this directory instead of stdout.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Compile and run preflight validation, reporting per-strategy results.
    Validate {
        /// Path to a JSON file with an array of strategy records.
        strategies: PathBuf,
    },
    /// Compile, validate, and deploy a batch to the platform.
    Deploy {
        /// Path to a JSON file with an array of strategy records.
        strategies: PathBuf,

        /// Path to the TOML run configuration.
        #[arg(long, default_value = "maestro.toml")]
        config: PathBuf,

        /// Override the configured display color.
        #[arg(long)]
        color: Option<String>,

        /// Override the configured tag.
        #[arg(long)]
        tag: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            strategies,
            out_dir,
        } => run_compile(&strategies, out_dir.as_deref()),
        Commands::Validate { strategies } => run_validate(&strategies),
        Commands::Deploy {
            strategies,
            config,
            color,
            tag,
        } => run_deploy(&strategies, &config, color, tag),
    }
}

/// Load the upstream strategy records.
fn load_strategies(path: &Path) -> Result<Vec<Strategy>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read strategies file {}", path.display()))?;
    let strategies: Vec<Strategy> = serde_json::from_str(&content)
        .with_context(|| format!("parse strategies file {}", path.display()))?;
    if strategies.is_empty() {
        bail!("strategies file {} contains no records", path.display());
    }
    Ok(strategies)
}

fn run_compile(strategies_path: &Path, out_dir: Option<&Path>) -> Result<()> {
    let strategies = load_strategies(strategies_path)?;
    let mut failures = 0;

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
    }

    for strategy in &strategies {
        match compile_strategy(strategy) {
            Ok(compiled) => {
                for warning in &compiled.warnings {
                    println!("WARNING: {}: {warning}", strategy.name);
                }
                let rendered = serde_json::to_string_pretty(&compiled.document)?;
                match out_dir {
                    Some(dir) => {
                        let path = dir.join(format!("{}.json", file_stem(&strategy.name)));
                        std::fs::write(&path, rendered)?;
                        println!("OK: {} -> {}", strategy.name, path.display());
                    }
                    None => {
                        println!("--- {} ({}) ---", strategy.name, compiled.fingerprint);
                        println!("{rendered}");
                    }
                }
            }
            Err(e) => {
                println!("FAIL: {}: {e}", strategy.name);
                failures += 1;
            }
        }
    }

    finish(strategies.len(), failures)
}

fn run_validate(strategies_path: &Path) -> Result<()> {
    let strategies = load_strategies(strategies_path)?;
    let mut failures = 0;

    for strategy in &strategies {
        let result = compile_strategy(strategy)
            .map_err(|e| e.to_string())
            .and_then(|compiled| {
                preflight(&compiled.document)
                    .map(|report| (compiled, report))
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok((compiled, report)) => {
                println!(
                    "OK: {} ({} nodes, {} conditionals)",
                    strategy.name, report.nodes, report.conditionals
                );
                for warning in &compiled.warnings {
                    println!("  WARNING: {warning}");
                }
            }
            Err(e) => {
                println!("FAIL: {}: {e}", strategy.name);
                failures += 1;
            }
        }
    }

    finish(strategies.len(), failures)
}

fn run_deploy(
    strategies_path: &Path,
    config_path: &Path,
    color: Option<String>,
    tag: Option<String>,
) -> Result<()> {
    let strategies = load_strategies(strategies_path)?;
    let config = RunConfig::from_file(config_path)
        .with_context(|| format!("load run config {}", config_path.display()))?;
    let api_key = config.api_key()?;

    let target = PlatformClient::new(config.platform.base_url.clone(), api_key);
    let meta = DeployMeta {
        color: color.unwrap_or_else(|| config.presentation.color.clone()),
        tag: tag.unwrap_or_else(|| config.presentation.tag.clone()),
    };
    let min_interval = Duration::from_millis(config.platform.min_submit_interval_ms);

    let summary = deploy_batch(&target, &strategies, &meta, min_interval, &StdoutProgress);

    let run_dir = save_artifacts(&summary, &config.output.dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    if !summary.all_deployed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Shared tail for the offline commands: non-zero exit when anything failed.
fn finish(total: usize, failures: usize) -> Result<()> {
    if failures > 0 {
        println!("\n{}/{total} strategies failed", failures);
        std::process::exit(1);
    }
    println!("\nAll {total} strategies OK");
    Ok(())
}

/// Mirror of the artifact writer's name sanitization.
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
