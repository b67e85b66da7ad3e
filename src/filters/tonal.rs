//! Tonal corrections: linear, logarithmic and gamma point transforms.
//!
//! Each correction normalizes samples to 0.0-1.0, applies its curve, clamps
//! to 0.0-1.0 and maps back to 0-255 (rounded). The curve is evaluated once
//! per possible input value and applied through a 256-entry lookup table.
//! Alpha (if present) is preserved.

use ndarray::{Array3, ArrayView3};

use super::round_u8;
use crate::error::{EditorError, Result};
use crate::raster::{check_channels, color_channels};

/// Build the lookup table for `curve` and apply it to every color sample.
fn apply_curve(input: ArrayView3<u8>, curve: impl Fn(f32) -> f32) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;

    let mut lut = [0u8; 256];
    for (v, entry) in lut.iter_mut().enumerate() {
        let normalized = v as f32 / 255.0;
        *entry = round_u8(curve(normalized).clamp(0.0, 1.0) * 255.0);
    }

    let color_channels = color_channels(channels);
    let mut output = input.to_owned();
    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                output[[y, x, c]] = lut[input[[y, x, c]] as usize];
            }
        }
    }
    Ok(output)
}

fn check_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EditorError::invalid(format!("{name} must be finite, got {value}")))
    }
}

/// `out = clamp(in / 255 * factor, 0, 1) * 255`
///
/// Factors of 0.1-2.0 are the intended range; only finiteness is checked here.
pub fn linear_correction_u8(input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
    check_finite("linear correction factor", factor)?;
    apply_curve(input, |v| v * factor)
}

/// `out = clamp(factor * log2(1 + in / 255), 0, 1) * 255`
pub fn logarithmic_correction_u8(input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
    check_finite("logarithmic correction factor", factor)?;
    apply_curve(input, |v| factor * (1.0 + v).log2())
}

/// `out = clamp((in / 255) ^ gamma, 0, 1) * 255`
///
/// Gamma > 1.0 darkens, < 1.0 brightens, 1.0 = no change.
pub fn gamma_correction_u8(input: ArrayView3<u8>, gamma: f32) -> Result<Array3<u8>> {
    check_finite("gamma", gamma)?;
    apply_curve(input, |v| v.powf(gamma))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Array3<u8> {
        Array3::from_shape_fn((16, 16, 1), |(y, x, _)| (y * 16 + x) as u8)
    }

    #[test]
    fn test_gamma_one_is_identity() {
        let img = ramp();
        assert_eq!(gamma_correction_u8(img.view(), 1.0).unwrap(), img);
    }

    #[test]
    fn test_gamma_two_table() {
        let img = Array3::from_shape_vec((1, 4, 1), vec![0, 85, 170, 255]).unwrap();
        let result = gamma_correction_u8(img.view(), 2.0).unwrap();
        assert_eq!(result.iter().copied().collect::<Vec<_>>(), vec![0, 28, 113, 255]);
    }

    #[test]
    fn test_linear_factor_one_is_identity() {
        let img = ramp();
        assert_eq!(linear_correction_u8(img.view(), 1.0).unwrap(), img);
    }

    #[test]
    fn test_linear_saturates() {
        let img = Array3::from_shape_vec((1, 3, 1), vec![50, 128, 200]).unwrap();
        let result = linear_correction_u8(img.view(), 2.0).unwrap();
        assert_eq!(result.iter().copied().collect::<Vec<_>>(), vec![100, 255, 255]);
    }

    #[test]
    fn test_logarithmic_endpoints() {
        let img = Array3::from_shape_vec((1, 2, 1), vec![0, 255]).unwrap();
        let result = logarithmic_correction_u8(img.view(), 1.0).unwrap();
        // log2(1) = 0, log2(2) = 1
        assert_eq!(result[[0, 0, 0]], 0);
        assert_eq!(result[[0, 1, 0]], 255);
    }

    #[test]
    fn test_logarithmic_lifts_midtones() {
        let img = Array3::from_shape_vec((1, 1, 1), vec![128]).unwrap();
        let result = logarithmic_correction_u8(img.view(), 1.0).unwrap();
        // log2(1 + 0.502) * 255 = 149.7
        assert_eq!(result[[0, 0, 0]], 150);
    }

    #[test]
    fn test_corrections_preserve_alpha() {
        let img = Array3::from_shape_vec((1, 1, 4), vec![10, 20, 30, 99]).unwrap();
        let result = gamma_correction_u8(img.view(), 0.5).unwrap();
        assert_eq!(result[[0, 0, 3]], 99);
        assert!(result[[0, 0, 0]] > 10);
    }

    #[test]
    fn test_non_finite_factor_rejected() {
        let img = ramp();
        assert!(linear_correction_u8(img.view(), f32::INFINITY).is_err());
        assert!(gamma_correction_u8(img.view(), f32::NAN).is_err());
    }
}
