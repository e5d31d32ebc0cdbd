//! I/O helpers for the command-line tool.
//!
//! - `load_image`: decode a PNG/JPEG/TIFF keeping its native sample depth.
//! - `save_plane_preview`: write a working plane as an 8-bit PNG, stretched
//!   to its own min/max so signed detail layers stay visible.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{Image, ImageF32, Sample, SampleImage};
use image::{ColorType, GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk as a planar [`SampleImage`].
///
/// Alpha channels are dropped; 8-bit, 16-bit and 32-bit float files keep
/// their encoding.
pub fn load_image(path: &Path) -> Result<SampleImage, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    let decoded = match img.color() {
        ColorType::L8 | ColorType::La8 => {
            SampleImage::from(deinterleave(w, h, 1, img.into_luma8().into_raw()))
        }
        ColorType::Rgb8 | ColorType::Rgba8 => {
            SampleImage::from(deinterleave(w, h, 3, img.into_rgb8().into_raw()))
        }
        ColorType::L16 | ColorType::La16 => {
            SampleImage::from(deinterleave(w, h, 1, img.into_luma16().into_raw()))
        }
        ColorType::Rgb16 | ColorType::Rgba16 => {
            SampleImage::from(deinterleave(w, h, 3, img.into_rgb16().into_raw()))
        }
        _ => SampleImage::from(deinterleave(w, h, 3, img.into_rgb32f().into_raw())),
    };
    Ok(decoded)
}

fn deinterleave<T: Sample>(w: usize, h: usize, channels: usize, raw: Vec<T>) -> Image<T> {
    let mut out = Image::new(w, h, channels);
    for (i, px) in raw.chunks_exact(channels).enumerate() {
        for (c, &v) in px.iter().enumerate() {
            out.channel_mut(c)[i] = v;
        }
    }
    out
}

/// Save a plane to a grayscale PNG, linearly stretched to [0, 255].
pub fn save_plane_preview(plane: &ImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let (lo, hi) = plane.min_max().unwrap_or((0.0, 1.0));
    let range = if hi > lo { hi - lo } else { 1.0 };
    let mut out = GrayImage::new(plane.w as u32, plane.h as u32);
    for (i, &px) in plane.data.iter().enumerate() {
        let v = ((px - lo) / range * 255.0).clamp(0.0, 255.0);
        out.put_pixel((i % plane.w) as u32, (i / plane.w) as u32, Luma([v as u8]));
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deinterleave_splits_channels() {
        let img = deinterleave(2, 1, 3, vec![1u8, 2, 3, 4, 5, 6]);
        assert_eq!(img.channel(0), &[1, 4]);
        assert_eq!(img.channel(2), &[3, 6]);
    }
}
