//! Theme descriptor assembly
//!
//! Pure construction of the icon-theme document the editor consumes. All maps
//! are ordered and records are sorted before assembly, so the same workspace
//! state always serializes to the same bytes.

use crate::config::Paths;
use crate::core::discovery::ImageFile;
use crate::core::thumbnail::Thumbnail;
use crate::utils::filesystem::relative_forward_slash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Icon id for plain files. Generated ids never start with `_`, so the
/// built-in ids cannot collide with them.
pub const FILE_ICON_ID: &str = "_file";
/// Icon id for collapsed folders
pub const FOLDER_ICON_ID: &str = "_folder";
/// Icon id for expanded folders
pub const FOLDER_OPEN_ICON_ID: &str = "_folder_open";

/// Built-in icon ids paired with their placeholder fill color (RGBA)
pub const DEFAULT_ICONS: &[(&str, [u8; 4])] = &[
    (FILE_ICON_ID, [197, 197, 197, 255]),
    (FOLDER_ICON_ID, [220, 182, 122, 255]),
    (FOLDER_OPEN_ICON_ID, [231, 201, 154, 255]),
];

/// A single entry under `iconDefinitions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconDefinition {
    /// Artifact location relative to the descriptor file, forward slashes
    pub icon_path: String,
}

/// The icon-theme document, in the editor's file-icon-theme shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDescriptor {
    pub icon_definitions: BTreeMap<String, IconDefinition>,
    pub file: String,
    pub folder: String,
    pub folder_expanded: String,
    pub file_extensions: BTreeMap<String, String>,
    pub file_names: BTreeMap<String, String>,
}

impl ThemeDescriptor {
    /// Serialize for persistence
    ///
    /// Ordered maps plus fixed field order make this byte-stable: equal
    /// descriptors always produce identical output.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Build a descriptor from the successfully rendered records of one cycle
///
/// `fileNames` maps each source file's exact base name to its icon id. Two
/// files with the same base name in different directories collide there; the
/// record sorting last by source path wins, though both artifacts keep their
/// own `iconDefinitions` entries. `fileExtensions` routes every extension
/// that produced at least one thumbnail to the generic file icon, covering
/// same-extension files that failed to render.
pub fn assemble(paths: &Paths, rendered: &[(ImageFile, Thumbnail)]) -> ThemeDescriptor {
    let descriptor_dir = paths.output_dir();

    let mut icon_definitions = BTreeMap::new();
    for (icon_id, _) in DEFAULT_ICONS {
        icon_definitions.insert(
            (*icon_id).to_string(),
            IconDefinition {
                icon_path: relative_forward_slash(
                    &paths.icon_artifact_path(icon_id),
                    descriptor_dir,
                ),
            },
        );
    }

    let mut records: Vec<&(ImageFile, Thumbnail)> = rendered.iter().collect();
    records.sort_by(|a, b| a.0.source_path.cmp(&b.0.source_path));

    let mut file_extensions = BTreeMap::new();
    let mut file_names = BTreeMap::new();
    for (image, thumbnail) in records {
        icon_definitions.insert(
            thumbnail.icon_id.clone(),
            IconDefinition {
                icon_path: relative_forward_slash(&thumbnail.path, descriptor_dir),
            },
        );
        file_extensions.insert(image.extension.clone(), FILE_ICON_ID.to_string());
        file_names.insert(image.file_name.clone(), thumbnail.icon_id.clone());
    }

    ThemeDescriptor {
        icon_definitions,
        file: FILE_ICON_ID.to_string(),
        folder: FOLDER_ICON_ID.to_string(),
        folder_expanded: FOLDER_OPEN_ICON_ID.to_string(),
        file_extensions,
        file_names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hashing::icon_id;
    use std::path::Path;

    fn record(paths: &Paths, relative: &str) -> (ImageFile, Thumbnail) {
        let source_path = paths.workspace_root().join(relative);
        let id = icon_id(&source_path);
        let extension = source_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let file_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let artifact = paths.icon_artifact_path(&id);
        (
            ImageFile {
                source_path,
                file_name,
                extension,
            },
            Thumbnail {
                icon_id: id,
                path: artifact,
                size_px: 16,
            },
        )
    }

    #[test]
    fn test_empty_workspace_still_carries_defaults() {
        let paths = Paths::new("/ws");
        let descriptor = assemble(&paths, &[]);

        assert_eq!(descriptor.file, FILE_ICON_ID);
        assert_eq!(descriptor.folder, FOLDER_ICON_ID);
        assert_eq!(descriptor.folder_expanded, FOLDER_OPEN_ICON_ID);
        assert_eq!(
            descriptor.icon_definitions[FILE_ICON_ID].icon_path,
            "icons/_file.png"
        );
        assert_eq!(
            descriptor.icon_definitions[FOLDER_ICON_ID].icon_path,
            "icons/_folder.png"
        );
        assert!(descriptor.file_extensions.is_empty());
        assert!(descriptor.file_names.is_empty());
    }

    #[test]
    fn test_rendered_records_become_definitions_and_name_mappings() {
        let paths = Paths::new("/ws");
        let records = vec![record(&paths, "art/logo.png"), record(&paths, "banner.svg")];
        let descriptor = assemble(&paths, &records);

        let logo_id = &records[0].1.icon_id;
        let banner_id = &records[1].1.icon_id;
        assert_eq!(descriptor.file_names["logo.png"], *logo_id);
        assert_eq!(descriptor.file_names["banner.svg"], *banner_id);
        assert_eq!(
            descriptor.icon_definitions[logo_id].icon_path,
            format!("icons/{logo_id}.png")
        );
        assert_eq!(descriptor.file_extensions["png"], FILE_ICON_ID);
        assert_eq!(descriptor.file_extensions["svg"], FILE_ICON_ID);
    }

    #[test]
    fn test_assembly_ignores_input_order() {
        let paths = Paths::new("/ws");
        let mut records = vec![
            record(&paths, "b/two.png"),
            record(&paths, "a/one.png"),
            record(&paths, "c/three.gif"),
        ];
        let forward = assemble(&paths, &records);
        records.reverse();
        let reversed = assemble(&paths, &records);

        assert_eq!(forward, reversed);
        assert_eq!(
            forward.to_json_bytes().unwrap(),
            reversed.to_json_bytes().unwrap()
        );
    }

    #[test]
    fn test_duplicate_base_name_resolves_to_last_path_in_order() {
        let paths = Paths::new("/ws");
        let records = vec![record(&paths, "dir2/x.png"), record(&paths, "dir1/x.png")];
        let descriptor = assemble(&paths, &records);

        // dir2 sorts after dir1, so it owns the name mapping
        assert_eq!(descriptor.file_names["x.png"], records[0].1.icon_id);
        assert!(descriptor.icon_definitions.contains_key(&records[0].1.icon_id));
        assert!(descriptor.icon_definitions.contains_key(&records[1].1.icon_id));
    }

    #[test]
    fn test_every_name_mapping_has_a_definition() {
        let paths = Paths::new("/ws");
        let records = vec![
            record(&paths, "a.png"),
            record(&paths, "nested/b.jpg"),
            record(&paths, "nested/deeper/c.webp"),
        ];
        let descriptor = assemble(&paths, &records);

        for id in descriptor.file_names.values() {
            assert!(descriptor.icon_definitions.contains_key(id), "missing {id}");
        }
    }

    #[test]
    fn test_serialized_shape_uses_editor_key_names() {
        let paths = Paths::new("/ws");
        let records = vec![record(&paths, "pic.png")];
        let bytes = assemble(&paths, &records).to_json_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value.get("iconDefinitions").is_some());
        assert!(value.get("folderExpanded").is_some());
        assert!(value.get("fileExtensions").is_some());
        assert!(value.get("fileNames").is_some());
        let definition = &value["iconDefinitions"][&records[0].1.icon_id];
        assert!(definition.get("iconPath").is_some());
        assert!(!definition["iconPath"].as_str().unwrap().contains('\\'));
    }

    #[test]
    fn test_relative_paths_stay_inside_output_dir() {
        let paths = Paths::new(Path::new("/ws"));
        let records = vec![record(&paths, "deep/tree/leaf.png")];
        let descriptor = assemble(&paths, &records);

        for definition in descriptor.icon_definitions.values() {
            assert!(definition.icon_path.starts_with("icons/"));
            assert!(definition.icon_path.ends_with(".png"));
        }
    }
}
