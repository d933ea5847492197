//! User settings for thumbtheme
//!
//! Settings live in settings.json inside the output directory. They are read
//! fresh at the start of every regeneration cycle, never cached across
//! cycles, so edits take effect on the next trigger.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use super::paths::Paths;
use super::{ICON_SIZE_MAX, ICON_SIZE_MIN};

/// User-facing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Activate the generated theme after the first successful cycle
    #[serde(default = "default_true")]
    pub auto_activate: bool,

    /// Extensions (lowercase, no leading dot) treated as source images
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: BTreeSet<String>,

    /// Square thumbnail edge in pixels, clamped to [8, 32]
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_activate: true,
            supported_extensions: default_supported_extensions(),
            icon_size: default_icon_size(),
        }
    }
}

impl Settings {
    /// Load settings for one cycle
    ///
    /// Never fails: a missing file yields defaults, an unreadable or
    /// malformed file yields defaults with a warning. Out-of-range or
    /// denormalized values are repaired, never rejected.
    pub fn load(paths: &Paths) -> Settings {
        let settings_path = paths.settings_path();

        let settings = match std::fs::read_to_string(&settings_path) {
            Ok(content) => match serde_json::from_str::<Settings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(
                        "ignoring malformed settings file {}: {}",
                        settings_path.display(),
                        e
                    );
                    Settings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                warn!(
                    "could not read settings file {}: {}",
                    settings_path.display(),
                    e
                );
                Settings::default()
            }
        };

        settings.normalized()
    }

    /// Load settings, writing the defaults file first if none exists
    ///
    /// Used once at daemon startup so users have a file to edit; per-cycle
    /// reads go through [`Settings::load`] and never write.
    pub fn load_or_init(paths: &Paths) -> Result<Settings> {
        if !paths.settings_path().exists() {
            paths
                .ensure_output_dirs()
                .context("failed to create output directory")?;
            Settings::default().save(paths)?;
        }

        Ok(Settings::load(paths))
    }

    /// Save settings to the store
    pub fn save(&self, paths: &Paths) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("failed to serialize settings")?;

        crate::utils::filesystem::write_atomic(&paths.settings_path(), content.as_bytes())
            .context("failed to write settings file")?;

        Ok(())
    }

    /// Clamp and normalize user-provided values
    fn normalized(mut self) -> Settings {
        self.icon_size = self.icon_size.clamp(ICON_SIZE_MIN, ICON_SIZE_MAX);

        self.supported_extensions = self
            .supported_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        self
    }
}

// Default value functions for serde

fn default_true() -> bool {
    true
}

fn default_supported_extensions() -> BTreeSet<String> {
    ["png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_icon_size() -> u32 {
    16
}
