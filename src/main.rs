//! thumbtheme - generates a file-explorer icon theme from the images in a
//! workspace and keeps it fresh as the workspace changes

#![allow(dead_code)]

mod config;
mod core;
mod utils;

use crate::config::{Paths, Settings, QUIET_PERIOD_MS};
use crate::core::activation;
use crate::core::coordinator::{Coordinator, RegenOutcome};
use crate::core::{Debouncer, WorkspaceWatcher};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "thumbtheme")]
#[command(version)]
#[command(about = "Generates a file-explorer icon theme from workspace images and keeps it fresh")]
struct Args {
    /// Workspace directory to operate on
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the theme, then watch the workspace and keep it fresh
    Run {
        /// Quiet period in milliseconds between a change and the refresh
        #[arg(long, default_value_t = QUIET_PERIOD_MS)]
        quiet_ms: u64,
    },
    /// Run one regeneration cycle immediately and exit
    Refresh,
    /// Select the generated theme in the editor settings
    Activate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!("{},notify=warn", log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let workspace = args
        .workspace
        .canonicalize()
        .with_context(|| format!("workspace {} is not accessible", args.workspace.display()))?;
    let paths = Paths::new(workspace);

    match args.command {
        Command::Run { quiet_ms } => run(paths, quiet_ms).await,
        Command::Refresh => refresh(paths).await,
        Command::Activate => activation::activate_theme(&paths),
    }
}

/// Watch session: initial pass, optional activation, then debounced refreshes
/// until Ctrl-C
async fn run(paths: Paths, quiet_ms: u64) -> Result<()> {
    info!("thumbtheme starting in {}", paths.workspace_root().display());

    let settings = Settings::load_or_init(&paths)?;
    let coordinator = Arc::new(Coordinator::new(paths.clone()));

    // a failed initial pass still leaves the watch session running; the next
    // workspace change retries
    match coordinator.regenerate().await {
        Ok(_) => {
            if settings.auto_activate {
                if let Err(err) = activation::activate_theme(&paths) {
                    warn!("could not activate theme: {}", err);
                }
            }
        }
        Err(err) => error!("initial regeneration failed: {}", err),
    }

    let debouncer = Debouncer::spawn(coordinator.clone(), Duration::from_millis(quiet_ms));
    let _watcher =
        WorkspaceWatcher::start(&paths, debouncer).context("could not start workspace watcher")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!(
        "shutting down after {} regeneration cycles",
        coordinator.cycles_run()
    );
    Ok(())
}

/// One immediate cycle with a progress bar, bypassing the debounce layer
async fn refresh(paths: Paths) -> Result<()> {
    let coordinator = Coordinator::new(paths).with_progress(true);
    let outcome = coordinator.regenerate().await?;

    if let RegenOutcome::Completed(summary) = outcome {
        info!(
            "refreshed: {} discovered, {} rendered, {} reused, {} failed",
            summary.discovered, summary.rendered, summary.reused, summary.failed
        );
    }
    Ok(())
}
