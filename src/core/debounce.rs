//! Debounced trigger layer
//!
//! Collapses bursts of file-system and configuration signals into single
//! refresh requests. Trailing-edge semantics: nothing runs until triggers go
//! quiet for the full interval, and every new trigger restarts the wait.

use crate::core::coordinator::Coordinator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// What caused a refresh request
///
/// The debounce behavior is the same for every kind; the kind only feeds
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    FileCreated,
    FileModified,
    FileDeleted,
    SettingsChanged,
    WorkspaceChanged,
}

impl Trigger {
    pub fn describe(self) -> &'static str {
        match self {
            Trigger::FileCreated => "file created",
            Trigger::FileModified => "file modified",
            Trigger::FileDeleted => "file deleted",
            Trigger::SettingsChanged => "settings changed",
            Trigger::WorkspaceChanged => "workspace changed",
        }
    }
}

/// Handle for feeding triggers into the debounce loop
///
/// Cheap to clone; the watcher callback and any manual callers share it.
#[derive(Clone)]
pub struct Debouncer {
    tx: mpsc::UnboundedSender<Trigger>,
}

impl Debouncer {
    /// Start the debounce loop on the runtime, driving `coordinator` once
    /// per quiet period
    pub fn spawn(coordinator: Arc<Coordinator>, quiet: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_loop(coordinator, rx, quiet));
        Self { tx }
    }

    /// Record a trigger; the refresh runs after triggers go quiet
    pub fn notify(&self, trigger: Trigger) {
        debug!("trigger: {}", trigger.describe());
        if self.tx.send(trigger).is_err() {
            warn!("debounce loop is gone, dropping trigger");
        }
    }
}

async fn run_loop(
    coordinator: Arc<Coordinator>,
    mut rx: mpsc::UnboundedReceiver<Trigger>,
    quiet: Duration,
) {
    while let Some(first) = rx.recv().await {
        let mut latest = first;
        let mut deadline = Instant::now() + quiet;

        // trailing edge: every further trigger pushes the deadline out
        loop {
            tokio::select! {
                _ = time::sleep_until(deadline) => break,
                received = rx.recv() => match received {
                    Some(trigger) => {
                        latest = trigger;
                        deadline = Instant::now() + quiet;
                    }
                    None => break,
                },
            }
        }

        debug!("quiet period elapsed, refreshing ({})", latest.describe());
        if let Err(err) = coordinator.regenerate().await {
            warn!("debounced regeneration failed: {}", err);
        }
    }
}
