//! Color adjustment filters: Brightness, Contrast, Saturation.
//!
//! These are the reversible adjustments driven by a
//! [`ParameterSet`](crate::params::ParameterSet). Each one validates its own
//! amount so it stays total when called directly.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1)
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - alpha preserved
//!
//! Results are rounded to the nearest integer after clamping to 0-255.

use ndarray::{Array3, ArrayView3};

use super::grayscale::luma;
use super::round_u8;
use crate::error::{EditorError, Result};
use crate::raster::{check_channels, color_channels};

pub const BRIGHTNESS_RANGE: std::ops::RangeInclusive<f32> = -100.0..=100.0;
pub const CONTRAST_RANGE: std::ops::RangeInclusive<f32> = 0.0..=3.0;
pub const SATURATION_RANGE: std::ops::RangeInclusive<f32> = 0.0..=3.0;

// ============================================================================
// Brightness
// ============================================================================

/// Scale every color sample by `1 + amount / 100`.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `amount` - Brightness: -100 (black) to 100 (double), 0 = no change
pub fn brightness_u8(input: ArrayView3<u8>, amount: f32) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;
    if !BRIGHTNESS_RANGE.contains(&amount) {
        return Err(EditorError::invalid(format!(
            "brightness {amount} outside [-100, 100]"
        )));
    }

    let factor = 1.0 + amount / 100.0;
    let color_channels = color_channels(channels);
    let mut output = input.to_owned();

    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                output[[y, x, c]] = round_u8(input[[y, x, c]] as f32 * factor);
            }
        }
    }
    Ok(output)
}

// ============================================================================
// Contrast
// ============================================================================

/// Mean luma of the whole image (mean sample value for grayscale).
fn mean_luma(input: &ArrayView3<u8>) -> f32 {
    let (height, width, channels) = input.dim();
    let mut sum = 0.0f64;
    for y in 0..height {
        for x in 0..width {
            sum += if channels == 1 {
                input[[y, x, 0]] as f64
            } else {
                luma(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]) as f64
            };
        }
    }
    (sum / (height * width).max(1) as f64) as f32
}

/// Scale each sample's distance from the image's mean luma by `factor`.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `factor` - 0.0 (flat gray) to 3.0, 1.0 = no change
pub fn contrast_u8(input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;
    if !CONTRAST_RANGE.contains(&factor) {
        return Err(EditorError::invalid(format!(
            "contrast {factor} outside [0, 3]"
        )));
    }

    let mean = mean_luma(&input);
    let color_channels = color_channels(channels);
    let mut output = input.to_owned();

    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                let v = input[[y, x, c]] as f32;
                output[[y, x, c]] = round_u8((v - mean) * factor + mean);
            }
        }
    }
    Ok(output)
}

// ============================================================================
// Saturation
// ============================================================================

/// Scale each pixel's chroma (distance from its own luma) by `factor`.
///
/// For grayscale images this is a no-op (saturation requires color channels).
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `factor` - 0.0 (gray) to 3.0 (vivid), 1.0 = no change
pub fn saturation_u8(input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;
    if !SATURATION_RANGE.contains(&factor) {
        return Err(EditorError::invalid(format!(
            "saturation {factor} outside [0, 3]"
        )));
    }

    let mut output = input.to_owned();
    if channels == 1 {
        return Ok(output);
    }

    for y in 0..height {
        for x in 0..width {
            let r = input[[y, x, 0]];
            let g = input[[y, x, 1]];
            let b = input[[y, x, 2]];
            let gray = luma(r, g, b);

            output[[y, x, 0]] = round_u8(gray + (r as f32 - gray) * factor);
            output[[y, x, 1]] = round_u8(gray + (g as f32 - gray) * factor);
            output[[y, x, 2]] = round_u8(gray + (b as f32 - gray) * factor);
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(values: &[u8]) -> Array3<u8> {
        Array3::from_shape_vec((1, 1, values.len()), values.to_vec()).unwrap()
    }

    // ========================================================================
    // Brightness Tests
    // ========================================================================

    #[test]
    fn test_brightness_scales_rgb() {
        let img = pixel(&[128, 128, 128]);
        let result = brightness_u8(img.view(), 50.0).unwrap();
        assert_eq!(result, pixel(&[192, 192, 192]));
    }

    #[test]
    fn test_brightness_clamps_and_preserves_alpha() {
        let img = pixel(&[200, 10, 0, 77]);
        let result = brightness_u8(img.view(), 100.0).unwrap();
        assert_eq!(result, pixel(&[255, 20, 0, 77]));
    }

    #[test]
    fn test_brightness_minus_100_is_black() {
        let img = pixel(&[90]);
        let result = brightness_u8(img.view(), -100.0).unwrap();
        assert_eq!(result[[0, 0, 0]], 0);
    }

    #[test]
    fn test_brightness_rejects_out_of_range() {
        let img = pixel(&[90]);
        assert!(matches!(
            brightness_u8(img.view(), 100.5),
            Err(EditorError::InvalidParameter(_))
        ));
        assert!(brightness_u8(img.view(), f32::NAN).is_err());
    }

    // ========================================================================
    // Contrast Tests
    // ========================================================================

    #[test]
    fn test_contrast_grayscale_mean_centered() {
        // Mean is 100; distances double
        let img = Array3::from_shape_vec((1, 2, 1), vec![50, 150]).unwrap();
        let result = contrast_u8(img.view(), 2.0).unwrap();
        assert_eq!(result[[0, 0, 0]], 0);
        assert_eq!(result[[0, 1, 0]], 200);
    }

    #[test]
    fn test_contrast_zero_flattens_to_mean() {
        let img = Array3::from_shape_vec((2, 2, 1), vec![0, 100, 100, 200]).unwrap();
        let result = contrast_u8(img.view(), 0.0).unwrap();
        assert!(result.iter().all(|&v| v == 100));
    }

    #[test]
    fn test_contrast_one_is_identity() {
        let img = Array3::from_shape_fn((3, 3, 3), |(y, x, c)| (y * 40 + x * 20 + c * 7) as u8);
        let result = contrast_u8(img.view(), 1.0).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_contrast_rejects_negative() {
        let img = pixel(&[1, 2, 3]);
        assert!(contrast_u8(img.view(), -0.1).is_err());
    }

    // ========================================================================
    // Saturation Tests
    // ========================================================================

    #[test]
    fn test_saturation_zero_is_gray() {
        let img = pixel(&[255, 0, 0, 255]);
        let result = saturation_u8(img.view(), 0.0).unwrap();
        assert_eq!(result[[0, 0, 0]], result[[0, 0, 1]]);
        assert_eq!(result[[0, 0, 1]], result[[0, 0, 2]]);
        assert_eq!(result[[0, 0, 3]], 255);
    }

    #[test]
    fn test_saturation_grayscale_noop() {
        let img = pixel(&[128]);
        let result = saturation_u8(img.view(), 2.5).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_saturation_neutral_pixel_unchanged() {
        let img = pixel(&[100, 100, 100]);
        let result = saturation_u8(img.view(), 3.0).unwrap();
        assert_eq!(result, img);
    }
}
