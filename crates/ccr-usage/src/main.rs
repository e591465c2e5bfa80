#![warn(missing_docs)]

//! Prints CCR feature usage for a cluster-state snapshot.

use anyhow::{Context, Result};
use ccr_usage::clock::{Clock, ManualClock, SystemClock};
use ccr_usage::{CcrUsageAction, ClusterState, UsageConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ccr-usage")]
#[command(about = "Report cross-cluster replication usage", long_about = None)]
struct Cli {
    /// Cluster state JSON file.
    #[arg(short, long)]
    state: PathBuf,

    /// Settings file (.toml or .json).
    #[arg(short, long, env = "CCR_USAGE_CONFIG", default_value = "/etc/ccr-usage/ccr.toml")]
    config: PathBuf,

    /// Override the current time (epoch millis).
    #[arg(long)]
    now_ms: Option<i64>,

    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        UsageConfig::from_file(&cli.config)
            .with_context(|| format!("loading config {}", cli.config.display()))?
    } else {
        tracing::warn!("Config file not found, using defaults: {}", cli.config.display());
        UsageConfig::default()
    };

    let raw = std::fs::read_to_string(&cli.state)
        .with_context(|| format!("reading cluster state {}", cli.state.display()))?;
    let state = ClusterState::from_json(&raw)?;

    let clock: Arc<dyn Clock> = match cli.now_ms {
        Some(now) => Arc::new(ManualClock::new(now)),
        None => Arc::new(SystemClock),
    };

    let action = CcrUsageAction::from_config(&config, clock);
    let json = action.local_cluster_state_operation(&state)?.to_json()?;

    let out = if cli.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    println!("{}", out);
    Ok(())
}
