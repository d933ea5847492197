//! Filesystem utilities

use std::io::{self, Write};
use std::path::Path;

/// Directory names that never hold source images
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "bower_components",
    "vendor",
    "target",
    "__pycache__",
    "site-packages",
    "venv",
    ".venv",
    ".git",
    ".svn",
    ".hg",
];

/// Check if a file or directory name should be ignored during scanning
///
/// Hidden (dot-prefixed) entries are ignored, which also covers the tool's
/// own output directory.
pub fn is_ignored_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('$') || SKIP_DIRS.contains(&name)
}

/// Check if any path component below `root` is an ignored name
pub fn is_under_ignored_dir(path: &Path, root: &Path) -> bool {
    let relative = match path.strip_prefix(root) {
        Ok(rel) => rel,
        Err(_) => return false,
    };

    relative.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .map(is_ignored_name)
            .unwrap_or(false)
    })
}

/// Write a file so readers never observe partial content
///
/// Writes into a temporary file in the destination directory, then renames it
/// over the final path. Rename within one directory is atomic on the
/// platforms we target; a failure at any step leaves the previous file (if
/// any) untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no parent directory for {}", path.display()),
        )
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Render a path relative to `base` with forward slashes on every platform
///
/// Paths outside `base` are rendered as given (still forward-slashed).
pub fn relative_forward_slash(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);

    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_is_ignored_name() {
        assert!(is_ignored_name(".git"));
        assert!(is_ignored_name(".thumbtheme"));
        assert!(is_ignored_name("$RECYCLE.BIN"));
        assert!(is_ignored_name("node_modules"));
        assert!(is_ignored_name("target"));
        assert!(!is_ignored_name("assets"));
        assert!(!is_ignored_name("logo.png"));
    }

    #[test]
    fn test_is_under_ignored_dir() {
        let root = Path::new("/ws");
        assert!(is_under_ignored_dir(
            Path::new("/ws/node_modules/pkg/logo.png"),
            root
        ));
        assert!(is_under_ignored_dir(Path::new("/ws/.thumbtheme/icons/x.png"), root));
        assert!(!is_under_ignored_dir(Path::new("/ws/assets/logo.png"), root));
        // paths outside the root are not ours to judge
        assert!(!is_under_ignored_dir(Path::new("/elsewhere/node_modules/a"), root));
    }

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        // no leftover temp files in the directory
        let entries: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_relative_forward_slash() {
        let base = PathBuf::from("/ws/.thumbtheme");
        let artifact = base.join("icons").join("logo_abc.png");
        assert_eq!(relative_forward_slash(&artifact, &base), "icons/logo_abc.png");
    }
}
