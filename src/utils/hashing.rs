//! Icon identifier derivation

use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Longest stem prefix carried into an identifier
const STEM_PREFIX_MAX: usize = 24;

/// Derive the icon identifier for a source image path
///
/// The identifier is `<stem>_<digest>`: a readable alphanumeric prefix taken
/// from the file stem, plus the full 128-bit xxh3 digest of the exact path
/// bytes. Distinct paths therefore get distinct identifiers (up to a 128-bit
/// hash collision), and the same path always maps to the same identifier, so
/// repeated regenerations overwrite the same artifact instead of accumulating
/// new ones. Identifiers never start with `_`; that prefix is reserved for
/// the built-in default icons.
pub fn icon_id(source_path: &Path) -> String {
    let stem = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let digest = xxh3_128(source_path.as_os_str().as_encoded_bytes());

    format!("{}_{:032x}", sanitize_stem(&stem), digest)
}

/// Reduce a file stem to a lowercase ASCII alphanumeric prefix
fn sanitize_stem(stem: &str) -> String {
    let folded = deunicode::deunicode(stem).to_lowercase();

    let cleaned: String = folded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(STEM_PREFIX_MAX)
        .collect();

    if cleaned.is_empty() {
        "img".to_string()
    } else {
        cleaned
    }
}
