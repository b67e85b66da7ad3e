//! Pixel operations for the editor pipeline.
//!
//! ## Supported Formats
//!
//! Every operation accepts `(H, W, C)` u8 arrays:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale8 | (H, W, 1) | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! Any other channel count fails with
//! [`UnsupportedShape`](crate::EditorError::UnsupportedShape).
//!
//! ## Conventions
//!
//! - **Pure** - inputs are views; every operation returns a new array
//! - **Alpha preservation** - alpha is kept, except by grayscale (drops it)
//!   and rotation (moves it with its pixel)
//! - **Rounding** - point operations clamp to 0-255 and round to nearest;
//!   grayscale truncates
//! - **Border** - neighbourhood operations replicate the nearest edge pixel
//!
//! ## Filter Categories
//!
//! - **Adjustments**: brightness, contrast, saturation
//! - **Geometry**: quarter-turn rotation
//! - **Tonal**: linear, logarithmic and gamma correction
//! - **Convolution**: arbitrary kernels, emboss
//! - **Rank**: median, morphology (erode, dilate, open, close, gradient,
//!   tophat, blackhat)

pub mod color_adjust;
pub mod convolve;
pub mod grayscale;
pub mod kernel;
pub mod median;
pub mod morphology;
pub mod rotate;
pub mod tonal;

use ndarray::{Array3, ArrayView3};

use crate::error::Result;
use kernel::{Kernel, StructuringElement};
use morphology::MorphologyOp;

/// Clamp to 0-255 and round to the nearest integer.
#[inline]
pub(crate) fn round_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// The pixel-operation capability the pipeline is built on.
///
/// Implementations must be pure: same input, same output, input untouched.
pub trait PixelOps {
    fn grayscale(&self, input: ArrayView3<u8>) -> Result<Array3<u8>>;
    fn brightness(&self, input: ArrayView3<u8>, amount: f32) -> Result<Array3<u8>>;
    fn contrast(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>>;
    fn saturation(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>>;
    fn rotate(&self, input: ArrayView3<u8>, degrees: i32) -> Result<Array3<u8>>;
    fn linear_correction(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>>;
    fn logarithmic_correction(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>>;
    fn gamma_correction(&self, input: ArrayView3<u8>, gamma: f32) -> Result<Array3<u8>>;
    fn convolve(&self, input: ArrayView3<u8>, kernel: &Kernel) -> Result<Array3<u8>>;
    fn emboss(&self, input: ArrayView3<u8>) -> Result<Array3<u8>>;
    fn median(&self, input: ArrayView3<u8>, size: usize) -> Result<Array3<u8>>;
    fn morphology(
        &self,
        input: ArrayView3<u8>,
        element: &StructuringElement,
        op: MorphologyOp,
    ) -> Result<Array3<u8>>;
}

/// [`PixelOps`] backed by the functions in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPixelOps;

impl PixelOps for StandardPixelOps {
    fn grayscale(&self, input: ArrayView3<u8>) -> Result<Array3<u8>> {
        grayscale::grayscale_u8(input)
    }

    fn brightness(&self, input: ArrayView3<u8>, amount: f32) -> Result<Array3<u8>> {
        color_adjust::brightness_u8(input, amount)
    }

    fn contrast(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
        color_adjust::contrast_u8(input, factor)
    }

    fn saturation(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
        color_adjust::saturation_u8(input, factor)
    }

    fn rotate(&self, input: ArrayView3<u8>, degrees: i32) -> Result<Array3<u8>> {
        rotate::rotate_u8(input, degrees)
    }

    fn linear_correction(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
        tonal::linear_correction_u8(input, factor)
    }

    fn logarithmic_correction(&self, input: ArrayView3<u8>, factor: f32) -> Result<Array3<u8>> {
        tonal::logarithmic_correction_u8(input, factor)
    }

    fn gamma_correction(&self, input: ArrayView3<u8>, gamma: f32) -> Result<Array3<u8>> {
        tonal::gamma_correction_u8(input, gamma)
    }

    fn convolve(&self, input: ArrayView3<u8>, kernel: &Kernel) -> Result<Array3<u8>> {
        convolve::convolve_u8(input, kernel)
    }

    fn emboss(&self, input: ArrayView3<u8>) -> Result<Array3<u8>> {
        convolve::emboss_u8(input)
    }

    fn median(&self, input: ArrayView3<u8>, size: usize) -> Result<Array3<u8>> {
        median::median_u8(input, size)
    }

    fn morphology(
        &self,
        input: ArrayView3<u8>,
        element: &StructuringElement,
        op: MorphologyOp,
    ) -> Result<Array3<u8>> {
        morphology::morphology_u8(input, element, op)
    }
}
