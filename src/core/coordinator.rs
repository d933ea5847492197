//! Regeneration coordinator - owns the end-to-end refresh cycle
//!
//! One cycle runs discovery, renders what changed, assembles the descriptor
//! and commits it atomically. Cycles never overlap: a request arriving while
//! a cycle is in flight is recorded as a single pending follow-up and runs
//! after the current cycle completes.

use crate::config::{Paths, Settings};
use crate::core::discovery::{self, ImageFile};
use crate::core::theme::{self, ThemeDescriptor};
use crate::core::thumbnail::{self, Thumbnail};
use crate::utils::filesystem::write_atomic;
use crate::utils::hashing::icon_id;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Cycle-fatal failures
///
/// Per-file render errors are absorbed inside the cycle (logged and counted,
/// the file keeps the host's default icon). Only failures around the output
/// area itself surface here, and a failed cycle leaves the previously
/// committed descriptor intact.
#[derive(Debug, Error)]
pub enum RegenerationError {
    #[error("failed to prepare output directories under {}: {source}", .path.display())]
    PrepareOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode default icon {icon_id}: {source}")]
    EncodeDefaultIcon {
        icon_id: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write artifact {}: {source}", .path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize theme descriptor: {0}")]
    SerializeDescriptor(#[from] serde_json::Error),

    #[error("failed to write theme descriptor {}: {source}", .path.display())]
    WriteDescriptor {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counters for one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Candidate files discovery returned
    pub discovered: usize,
    /// Thumbnails rendered this cycle
    pub rendered: usize,
    /// Artifacts reused because they were still fresh
    pub reused: usize,
    /// Files whose render failed and were left to the default icon
    pub failed: usize,
}

/// What a `regenerate` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenOutcome {
    /// This call ran at least one full cycle; counters are from the last one
    Completed(CycleSummary),
    /// Another caller was mid-cycle and picked this request up as a follow-up
    Coalesced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running { followup: bool },
}

/// Serialized regeneration over one workspace
///
/// Owns the path context and the single-flight guard. Everything that wants
/// a refresh (watcher triggers through the debouncer, manual commands, the
/// startup pass) goes through [`Coordinator::regenerate`].
pub struct Coordinator {
    paths: Paths,
    state: Mutex<RunState>,
    cycles: AtomicU64,
    show_progress: bool,
}

impl Coordinator {
    pub fn new(paths: Paths) -> Self {
        Self {
            paths,
            state: Mutex::new(RunState::Idle),
            cycles: AtomicU64::new(0),
            show_progress: false,
        }
    }

    /// Set whether cycles draw a progress bar (off by default; only the
    /// foreground refresh command turns it on)
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Total cycles executed since construction
    pub fn cycles_run(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Run a regeneration cycle, serializing concurrent callers
    ///
    /// If a cycle is already in flight this returns immediately with
    /// [`RegenOutcome::Coalesced`] after recording at most one pending
    /// follow-up; the in-flight caller runs that follow-up before releasing
    /// the guard, so the newest workspace state always gets a cycle.
    pub async fn regenerate(&self) -> Result<RegenOutcome, RegenerationError> {
        {
            let mut state = self.state.lock();
            match *state {
                RunState::Running { .. } => {
                    *state = RunState::Running { followup: true };
                    debug!("regeneration in flight, follow-up scheduled");
                    return Ok(RegenOutcome::Coalesced);
                }
                RunState::Idle => *state = RunState::Running { followup: false },
            }
        }

        let mut result = self.run_cycle();
        while self.take_followup() {
            debug!("running coalesced follow-up cycle");
            result = self.run_cycle();
        }

        result.map(RegenOutcome::Completed)
    }

    /// Consume a pending follow-up request, releasing the running guard when
    /// there is none. Returns true when another cycle must run.
    fn take_followup(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            RunState::Running { followup: true } => {
                *state = RunState::Running { followup: false };
                true
            }
            _ => {
                *state = RunState::Idle;
                false
            }
        }
    }

    fn run_cycle(&self) -> Result<CycleSummary, RegenerationError> {
        let started = Instant::now();
        self.cycles.fetch_add(1, Ordering::Relaxed);

        // configuration is re-read every cycle so edits apply on next trigger
        let settings = Settings::load(&self.paths);

        self.paths
            .ensure_output_dirs()
            .map_err(|source| RegenerationError::PrepareOutput {
                path: self.paths.output_dir().to_path_buf(),
                source,
            })?;

        let images = discovery::discover(&self.paths, &settings);
        let mut summary = CycleSummary {
            discovered: images.len(),
            ..CycleSummary::default()
        };

        let progress = self.progress_bar(images.len());

        let mut rendered: Vec<(ImageFile, Thumbnail)> = Vec::with_capacity(images.len());
        for image in images {
            let id = icon_id(&image.source_path);
            let artifact = self.paths.icon_artifact_path(&id);

            if artifact_is_fresh(&artifact, &image.source_path, settings.icon_size) {
                summary.reused += 1;
                rendered.push((
                    image,
                    Thumbnail {
                        icon_id: id,
                        path: artifact,
                        size_px: settings.icon_size,
                    },
                ));
            } else {
                match thumbnail::render_thumbnail(&image.source_path, settings.icon_size) {
                    Ok(bytes) => {
                        write_atomic(&artifact, &bytes).map_err(|source| {
                            RegenerationError::WriteArtifact {
                                path: artifact.clone(),
                                source,
                            }
                        })?;
                        summary.rendered += 1;
                        rendered.push((
                            image,
                            Thumbnail {
                                icon_id: id,
                                path: artifact,
                                size_px: settings.icon_size,
                            },
                        ));
                    }
                    Err(err) => {
                        // expected for corrupt or unsupported files, keep going
                        debug!("skipping {}: {}", image.source_path.display(), err);
                        summary.failed += 1;
                    }
                }
            }

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!(
                "{} rendered, {} reused",
                summary.rendered, summary.reused
            ));
        }

        // defaults must be on disk before the descriptor referencing them
        self.ensure_default_icons(settings.icon_size)?;

        let descriptor = theme::assemble(&self.paths, &rendered);
        self.persist_descriptor(&descriptor)?;
        self.prune_stale_artifacts(&rendered);

        info!(
            "regeneration complete in {:?}: {} discovered, {} rendered, {} reused, {} failed",
            started.elapsed(),
            summary.discovered,
            summary.rendered,
            summary.reused,
            summary.failed
        );
        Ok(summary)
    }

    /// Write the built-in file/folder placeholders if absent. They are
    /// generated once and reused across cycles.
    fn ensure_default_icons(&self, size_px: u32) -> Result<(), RegenerationError> {
        for (icon_id, rgba) in theme::DEFAULT_ICONS {
            let path = self.paths.icon_artifact_path(icon_id);
            if path.exists() {
                continue;
            }

            let bytes = thumbnail::render_placeholder(size_px, *rgba).map_err(|source| {
                RegenerationError::EncodeDefaultIcon {
                    icon_id: (*icon_id).to_string(),
                    source,
                }
            })?;
            write_atomic(&path, &bytes)
                .map_err(|source| RegenerationError::WriteArtifact { path, source })?;
        }
        Ok(())
    }

    /// Atomically replace the descriptor, skipping the write entirely when
    /// the content is unchanged so readers see no spurious updates
    fn persist_descriptor(&self, descriptor: &ThemeDescriptor) -> Result<(), RegenerationError> {
        let path = self.paths.theme_path();
        let bytes = descriptor.to_json_bytes()?;

        if let Ok(existing) = std::fs::read(&path) {
            if existing == bytes {
                debug!("descriptor unchanged, skipping write");
                return Ok(());
            }
        }

        write_atomic(&path, &bytes)
            .map_err(|source| RegenerationError::WriteDescriptor { path, source })
    }

    /// Delete icons no longer referenced by the just-committed descriptor,
    /// keeping the built-in defaults. Runs only after a successful commit so
    /// a failed cycle never removes artifacts the live descriptor points at.
    fn prune_stale_artifacts(&self, rendered: &[(ImageFile, Thumbnail)]) {
        let mut live: BTreeSet<&str> = rendered
            .iter()
            .map(|(_, thumbnail)| thumbnail.icon_id.as_str())
            .collect();
        for (icon_id, _) in theme::DEFAULT_ICONS {
            live.insert(icon_id);
        }

        let entries = match std::fs::read_dir(self.paths.icons_dir()) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("could not scan icons directory for pruning: {}", err);
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let is_live = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| live.contains(stem))
                .unwrap_or(true);
            if is_live {
                continue;
            }

            match std::fs::remove_file(&path) {
                Ok(()) => debug!("pruned stale icon {}", path.display()),
                Err(err) => warn!("could not remove stale icon {}: {}", path.display(), err),
            }
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.show_progress || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        Some(pb)
    }
}

/// A previously rendered artifact is reusable when it already has the
/// configured dimensions and is strictly newer than its source
fn artifact_is_fresh(artifact: &Path, source: &Path, size_px: u32) -> bool {
    let (width, height) = match image::image_dimensions(artifact) {
        Ok(dims) => dims,
        Err(_) => return false,
    };
    if width != size_px || height != size_px {
        return false;
    }

    match (modified_time(artifact), modified_time(source)) {
        (Some(artifact_mtime), Some(source_mtime)) => artifact_mtime > source_mtime,
        _ => false,
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
}
