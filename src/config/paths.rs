//! Path management for thumbtheme
//!
//! Maps a workspace root to the generated output layout. One `Paths` value is
//! constructed per workspace and handed to every component; nothing here is
//! process-global, so independent instances (one per test, or one per
//! workspace) never interfere.

use std::io;
use std::path::{Path, PathBuf};

/// Name of the per-workspace output directory
pub const OUTPUT_DIR_NAME: &str = ".thumbtheme";

/// Name of the artifacts directory inside the output directory
pub const ICONS_DIR_NAME: &str = "icons";

/// File name of the theme descriptor
pub const THEME_FILE_NAME: &str = "icon-theme.json";

/// File name of the user settings store
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// All filesystem locations for one workspace
#[derive(Debug, Clone)]
pub struct Paths {
    /// Workspace root being scanned
    workspace_root: PathBuf,
    /// Output directory holding descriptor, artifacts and settings
    output_dir: PathBuf,
}

impl Paths {
    /// Create the path layout for a workspace root
    ///
    /// No filesystem access happens here; call [`Paths::ensure_output_dirs`]
    /// before writing anything.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let output_dir = workspace_root.join(OUTPUT_DIR_NAME);

        Self {
            workspace_root,
            output_dir,
        }
    }

    /// Get the workspace root
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Get the artifacts directory
    pub fn icons_dir(&self) -> PathBuf {
        self.output_dir.join(ICONS_DIR_NAME)
    }

    /// Get the theme descriptor path
    pub fn theme_path(&self) -> PathBuf {
        self.output_dir.join(THEME_FILE_NAME)
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.output_dir.join(SETTINGS_FILE_NAME)
    }

    /// Get the artifact path for an icon identifier
    pub fn icon_artifact_path(&self, icon_id: &str) -> PathBuf {
        self.icons_dir().join(format!("{icon_id}.png"))
    }

    /// Get the host editor settings file used for theme activation
    pub fn editor_settings_path(&self) -> PathBuf {
        self.workspace_root.join(".vscode").join("settings.json")
    }

    /// Create the output and artifacts directories if absent
    ///
    /// `create_dir_all` is idempotent, so repeated or concurrent calls never
    /// race on creation.
    pub fn ensure_output_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(self.icons_dir())?;
        Ok(())
    }
}
