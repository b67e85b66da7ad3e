//! Display adapters: fit an image into the viewer and encode it for display.

use std::io::Cursor;

use image::imageops::FilterType;
use image::ImageOutputFormat;

use crate::codec::{from_dynamic, to_dynamic};
use crate::config::DisplaySize;
use crate::error::{EditorError, Result};
use crate::raster::Raster;

/// Largest size with the same aspect ratio that fits inside `max`.
///
/// Images that already fit are returned unchanged (never upscaled). Both
/// sides stay at least 1 pixel.
pub fn fit_within(size: (u32, u32), max: DisplaySize) -> (u32, u32) {
    let (width, height) = size;
    if width <= max.width && height <= max.height {
        return size;
    }
    let scale = (max.width as f64 / width as f64).min(max.height as f64 / height as f64);
    let fit = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (fit(width), fit(height))
}

/// Downscale `raster` to fit the display box (Lanczos3). Layout is kept.
pub fn preview_raster(raster: &Raster, max: DisplaySize) -> Result<Raster> {
    let size = (raster.width() as u32, raster.height() as u32);
    let (width, height) = fit_within(size, max);
    if (width, height) == size {
        return Ok(raster.clone());
    }
    let resized = to_dynamic(raster)?.resize_exact(width, height, FilterType::Lanczos3);
    from_dynamic(resized)
}

/// PNG bytes of the display-sized image.
pub fn encode_preview(raster: &Raster, max: DisplaySize) -> Result<Vec<u8>> {
    let preview = preview_raster(raster, max)?;
    let mut buffer = Vec::new();
    to_dynamic(&preview)?
        .write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::Png)
        .map_err(EditorError::Encode)?;
    Ok(buffer)
}
