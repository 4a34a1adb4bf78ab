//! PNG/JPEG/etc. decode and PNG encode at the file boundary.
//!
//! Files hold straight alpha. Bitmaps are premultiplied on the way in and
//! converted back on the way out.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::display::bitmap::Bitmap;
use crate::error::{RasterError, RasterResult};
use crate::pixel::AlphaMode;

/// Highest sequence number `SaveMode::Sequential` will try
const MAX_SEQUENCE: u32 = 9999;

/// What to do when the target file may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Write exactly at the path, replacing any existing file.
    /// A path without an extension gets `.png` appended.
    #[default]
    Overwrite,
    /// Never replace: write `<stem>-NNNN.png` next to the path, using the
    /// first number not already taken.
    Sequential,
}

fn bitmap_from_dynamic(img: &image::DynamicImage) -> RasterResult<Bitmap> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba8(width, height, rgba.as_raw(), AlphaMode::Straight)
}

/// Decode any format the `image` crate recognises
pub fn decode(bytes: &[u8]) -> RasterResult<Bitmap> {
    let img = image::load_from_memory(bytes).map_err(|e| RasterError::codec(e.to_string()))?;
    bitmap_from_dynamic(&img)
}

/// Encode as PNG with straight alpha
pub fn encode_png(bitmap: &Bitmap) -> RasterResult<Vec<u8>> {
    let (width, height) = bitmap.dimensions();
    let rgba = image::RgbaImage::from_raw(width, height, bitmap.to_rgba8(AlphaMode::Straight))
        .ok_or_else(|| RasterError::codec(format!("{}x{} buffer size mismatch", width, height)))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| RasterError::codec(e.to_string()))?;
    Ok(buf)
}

pub fn read_image(path: impl AsRef<Path>) -> RasterResult<Bitmap> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| RasterError::codec(format!("decode '{}': {}", path.display(), e)))?;
    let bitmap = bitmap_from_dynamic(&img)?;
    info!(path = %path.display(), width = bitmap.width(), height = bitmap.height(), "loaded image");
    Ok(bitmap)
}

/// Encode `bitmap` as PNG and write it; returns the path actually written
pub fn write_image(
    bitmap: &Bitmap,
    path: impl AsRef<Path>,
    mode: SaveMode,
) -> RasterResult<PathBuf> {
    let target = resolve_save_path(path.as_ref(), mode)?;
    let bytes = encode_png(bitmap)?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&target, bytes).with_context(|| format!("write png '{}'", target.display()))?;

    info!(path = %target.display(), "saved image");
    Ok(target)
}

/// Work out the file name a save would use
pub fn resolve_save_path(path: &Path, mode: SaveMode) -> RasterResult<PathBuf> {
    match mode {
        SaveMode::Overwrite => {
            if path.extension().is_some() {
                Ok(path.to_path_buf())
            } else {
                Ok(path.with_extension("png"))
            }
        },
        SaveMode::Sequential => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("image");
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            (0..=MAX_SEQUENCE)
                .map(|n| dir.join(format!("{}-{:04}.png", stem, n)))
                .find(|candidate| !candidate.exists())
                .ok_or_else(|| {
                    RasterError::codec(format!(
                        "no free sequential file name for '{}'",
                        path.display()
                    ))
                })
        },
    }
}
