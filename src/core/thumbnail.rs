//! Thumbnail rendering - fixed-size square PNG with transparent padding

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A rendered artifact in the icons directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Identifier the theme descriptor refers to
    pub icon_id: String,
    /// Final artifact location in the icons directory
    pub path: PathBuf,
    /// Square edge length in pixels
    pub size_px: u32,
}

/// Per-file rendering failure
///
/// Render failures are expected (corrupt files, unsupported formats behind a
/// matching extension) and are handled by the caller, never propagated past
/// the cycle: the file simply keeps the host's default icon.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode thumbnail for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Render a source image into square PNG thumbnail bytes
///
/// The source is scaled to fit entirely within a `size_px` square ("contain"),
/// centered, and padded with fully transparent pixels. Output is PNG
/// regardless of the source format.
pub fn render_thumbnail(source_path: &Path, size_px: u32) -> Result<Vec<u8>, RenderError> {
    let bytes = std::fs::read(source_path).map_err(|source| RenderError::Read {
        path: source_path.to_path_buf(),
        source,
    })?;

    let source = image::load_from_memory(&bytes).map_err(|source| RenderError::Decode {
        path: source_path.to_path_buf(),
        source,
    })?;

    let scaled = source.resize(size_px, size_px, FilterType::Lanczos3);

    // transparent canvas, scaled image centered on it
    let mut canvas = RgbaImage::new(size_px, size_px);
    let x = (size_px - scaled.width()) / 2;
    let y = (size_px - scaled.height()) / 2;
    image::imageops::overlay(&mut canvas, &scaled.to_rgba8(), x as i64, y as i64);

    encode_png(canvas).map_err(|source| RenderError::Encode {
        path: source_path.to_path_buf(),
        source,
    })
}

/// Render a solid-color square placeholder as PNG bytes
///
/// Backs the built-in file/folder icon definitions.
pub fn render_placeholder(size_px: u32, rgba: [u8; 4]) -> Result<Vec<u8>, image::ImageError> {
    encode_png(RgbaImage::from_pixel(size_px, size_px, Rgba(rgba)))
}

fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
