//! File system watcher for detecting workspace changes

use crate::config::Paths;
use crate::core::debounce::{Debouncer, Trigger};
use crate::utils::filesystem::is_under_ignored_dir;
use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Extensions the watcher reacts to, a generous superset of anything the
/// settings can select. The per-cycle discovery filter applies the real set,
/// so the watcher never needs rebuilding when settings change.
const WATCHED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp", "tif", "tiff", "avif", "heic",
];

/// Workspace watchdog feeding classified events into the debouncer
///
/// Dropping this stops the watch, so the owner keeps it alive for the
/// session.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
}

impl WorkspaceWatcher {
    /// Watch the workspace tree recursively
    pub fn start(paths: &Paths, debouncer: Debouncer) -> Result<Self> {
        let context = paths.clone();
        let event_handler = move |res: notify::Result<Event>| match res {
            Ok(event) => Self::handle_event(&event, &context, &debouncer),
            Err(err) => warn!("watch error: {}", err),
        };

        let mut watcher = RecommendedWatcher::new(
            event_handler,
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )
        .context("failed to create file watcher")?;

        watcher
            .watch(paths.workspace_root(), RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", paths.workspace_root().display()))?;

        info!("watching {}", paths.workspace_root().display());
        Ok(Self { _watcher: watcher })
    }

    fn handle_event(event: &Event, paths: &Paths, debouncer: &Debouncer) {
        for path in &event.paths {
            if let Some(trigger) = trigger_for(&event.kind, path, paths) {
                debouncer.notify(trigger);
            }
        }
    }
}

/// Classify a raw event into a refresh trigger, or discard it
///
/// The pipeline's own settings file maps to a settings trigger even though
/// it lives inside the output directory; everything else under the output
/// directory is the pipeline's own writes and must not feed back into it.
fn trigger_for(kind: &EventKind, path: &Path, paths: &Paths) -> Option<Trigger> {
    if path == paths.settings_path().as_path() {
        return Some(Trigger::SettingsChanged);
    }
    if path.starts_with(paths.output_dir()) {
        return None;
    }
    if is_under_ignored_dir(path, paths.workspace_root()) {
        return None;
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension {
        Some(ext) if WATCHED_EXTENSIONS.contains(&ext.as_str()) => match kind {
            EventKind::Create(_) => Some(Trigger::FileCreated),
            EventKind::Modify(_) => Some(Trigger::FileModified),
            EventKind::Remove(_) => Some(Trigger::FileDeleted),
            _ => None,
        },
        Some(_) => None,
        // extensionless paths are directory-level changes to the tree
        None => match kind {
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                Some(Trigger::WorkspaceChanged)
            }
            _ => None,
        },
    }
}
