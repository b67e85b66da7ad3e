//! Grayscale conversion.
//!
//! Uses ITU-R BT.601 luma weights (0.2989, 0.5870, 0.1140). The same weights
//! define "luma" for contrast and saturation so the three operations agree
//! on what a neutral pixel is.

use ndarray::{Array3, ArrayView3};

use crate::error::Result;
use crate::raster::check_channels;

/// BT.601 luma coefficients
pub(crate) const LUMA_R: f32 = 0.2989;
pub(crate) const LUMA_G: f32 = 0.5870;
pub(crate) const LUMA_B: f32 = 0.1140;

#[inline]
pub(crate) fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Convert an image to a single luma channel.
///
/// Luma is truncated (not rounded) to u8. Alpha is dropped. A single-channel
/// input is returned as an unchanged copy.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
///
/// # Returns
/// Grayscale image with shape (height, width, 1)
pub fn grayscale_u8(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;

    if channels == 1 {
        return Ok(input.to_owned());
    }

    let mut output = Array3::<u8>::zeros((height, width, 1));
    for y in 0..height {
        for x in 0..width {
            let gray = luma(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
            output[[y, x, 0]] = gray.clamp(0.0, 255.0) as u8;
        }
    }

    Ok(output)
}
