//! Workspace scanning for candidate image files

use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

use crate::config::{Paths, Settings};
use crate::utils::filesystem::is_ignored_name;

/// One candidate source image found during a discovery pass
///
/// Records are ephemeral: rebuilt on every pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Absolute path of the source image
    pub source_path: PathBuf,
    /// Exact base name, e.g. `logo.png`
    pub file_name: String,
    /// Lowercase extension without the leading dot
    pub extension: String,
}

/// Scan the workspace for files matching the configured extensions
///
/// Dependency/vendor directories, hidden entries and the output directory are
/// pruned from the walk. Discovery never fails: a missing root or traversal
/// errors degrade to "no candidates this cycle", since a transient scan
/// problem must not take the pipeline down. Result order is not significant.
pub fn discover(paths: &Paths, settings: &Settings) -> Vec<ImageFile> {
    let root = paths.workspace_root();

    if !root.is_dir() {
        tracing::warn!("workspace root does not exist: {}", root.display());
        return Vec::new();
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !should_skip_entry(entry));

    let mut records = Vec::new();

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
        else {
            continue;
        };

        if !settings.supported_extensions.contains(&extension) {
            continue;
        }

        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        records.push(ImageFile {
            source_path: path.to_path_buf(),
            file_name,
            extension,
        });
    }

    records
}

/// Check if a walk entry should be pruned
fn should_skip_entry(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(is_ignored_name)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    fn names(records: &[ImageFile]) -> BTreeSet<String> {
        records.iter().map(|r| r.file_name.clone()).collect()
    }

    #[test]
    fn test_finds_nested_images() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("logo.png"));
        touch(&tmp.path().join("assets/deep/banner.jpg"));
        touch(&tmp.path().join("readme.md"));

        let paths = Paths::new(tmp.path());
        let records = discover(&paths, &Settings::default());

        let expected: BTreeSet<String> =
            ["logo.png", "banner.jpg"].into_iter().map(String::from).collect();
        assert_eq!(names(&records), expected);
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("SHOUT.PNG"));

        let paths = Paths::new(tmp.path());
        let records = discover(&paths, &Settings::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "SHOUT.PNG");
        assert_eq!(records[0].extension, "png");
    }

    #[test]
    fn test_skips_vendor_hidden_and_output_dirs() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("keep.png"));
        touch(&tmp.path().join("node_modules/pkg/skip.png"));
        touch(&tmp.path().join("target/debug/skip.png"));
        touch(&tmp.path().join(".hidden/skip.png"));
        touch(&tmp.path().join(".thumbtheme/icons/skip.png"));

        let paths = Paths::new(tmp.path());
        let records = discover(&paths, &Settings::default());

        let expected: BTreeSet<String> = ["keep.png"].into_iter().map(String::from).collect();
        assert_eq!(names(&records), expected);
    }

    #[test]
    fn test_honors_configured_extensions() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("photo.png"));
        touch(&tmp.path().join("vector.svg"));

        let paths = Paths::new(tmp.path());
        let settings = Settings {
            supported_extensions: ["svg"].into_iter().map(String::from).collect(),
            ..Settings::default()
        };
        let records = discover(&paths, &settings);

        let expected: BTreeSet<String> = ["vector.svg"].into_iter().map(String::from).collect();
        assert_eq!(names(&records), expected);
    }

    #[test]
    fn test_missing_root_yields_empty_set() {
        let paths = Paths::new("/definitely/not/a/real/workspace");
        assert!(discover(&paths, &Settings::default()).is_empty());
    }
}
