//! Icon theme activation
//!
//! Points the editor at the generated theme by merging the theme id into the
//! workspace editor settings.

use crate::config::{Paths, THEME_ID};
use crate::utils::filesystem::write_atomic;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::info;

const ICON_THEME_KEY: &str = "workbench.iconTheme";

/// Select the generated theme as the active file icon theme
///
/// Creates the editor settings file if needed and preserves every other key
/// when it already exists. A malformed settings file is reported and left
/// untouched rather than overwritten.
pub fn activate_theme(paths: &Paths) -> Result<()> {
    let settings_path = paths.editor_settings_path();

    let mut settings: Map<String, Value> = match std::fs::read(&settings_path) {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => bail!(
                "refusing to rewrite malformed editor settings at {}",
                settings_path.display()
            ),
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read {}", settings_path.display()));
        }
    };

    settings.insert(
        ICON_THEME_KEY.to_string(),
        Value::String(THEME_ID.to_string()),
    );

    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(&Value::Object(settings))?;
    write_atomic(&settings_path, &bytes)
        .with_context(|| format!("failed to write {}", settings_path.display()))?;

    info!("activated icon theme {}", THEME_ID);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_settings(paths: &Paths) -> Map<String, Value> {
        let bytes = std::fs::read(paths.editor_settings_path()).unwrap();
        match serde_json::from_slice::<Value>(&bytes).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn test_creates_settings_file_with_theme_key() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::new(tmp.path());

        activate_theme(&paths).unwrap();

        let settings = read_settings(&paths);
        assert_eq!(settings[ICON_THEME_KEY], Value::String(THEME_ID.into()));
    }

    #[test]
    fn test_preserves_existing_settings_keys() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::new(tmp.path());
        std::fs::create_dir_all(paths.editor_settings_path().parent().unwrap()).unwrap();
        std::fs::write(
            paths.editor_settings_path(),
            r#"{ "editor.fontSize": 14, "workbench.iconTheme": "other" }"#,
        )
        .unwrap();

        activate_theme(&paths).unwrap();

        let settings = read_settings(&paths);
        assert_eq!(settings["editor.fontSize"], Value::from(14));
        assert_eq!(settings[ICON_THEME_KEY], Value::String(THEME_ID.into()));
    }

    #[test]
    fn test_refuses_to_touch_malformed_settings() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::new(tmp.path());
        std::fs::create_dir_all(paths.editor_settings_path().parent().unwrap()).unwrap();
        std::fs::write(paths.editor_settings_path(), b"{ not json").unwrap();

        assert!(activate_theme(&paths).is_err());
        assert_eq!(
            std::fs::read(paths.editor_settings_path()).unwrap(),
            b"{ not json"
        );
    }

    #[test]
    fn test_second_activation_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::new(tmp.path());

        activate_theme(&paths).unwrap();
        let first = std::fs::read(paths.editor_settings_path()).unwrap();
        activate_theme(&paths).unwrap();

        assert_eq!(std::fs::read(paths.editor_settings_path()).unwrap(), first);
    }
}
