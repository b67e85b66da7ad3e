//! Morphology filters: Erode, Dilate and their compositions.
//!
//! Grayscale morphology over an arbitrary binary [`StructuringElement`]:
//! - **Erode**: minimum over the footprint `in(y + i - ar, x + j - ac)`
//! - **Dilate**: maximum over the reflected footprint `in(y - i + ar, x - j + ac)`
//!
//! For symmetric elements anchored at their center both footprints are the
//! same window. Open, Close, Gradient, TopHat and BlackHat are built from the
//! two primitives; differences saturate at 0.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1)
//! - **RGB**: (height, width, 3) - channels processed independently
//! - **RGBA**: (height, width, 4) - RGB processed, alpha preserved
//!
//! Out-of-bounds samples replicate the nearest edge pixel.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array3, ArrayView3, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::convolve::replicate;
use super::kernel::StructuringElement;
use crate::error::{EditorError, Result};
use crate::raster::{check_channels, color_channels};

/// Morphological operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MorphologyOp {
    Erode,
    Dilate,
    Open,
    Close,
    Gradient,
    TopHat,
    BlackHat,
}

impl MorphologyOp {
    pub const ALL: [MorphologyOp; 7] = [
        MorphologyOp::Erode,
        MorphologyOp::Dilate,
        MorphologyOp::Open,
        MorphologyOp::Close,
        MorphologyOp::Gradient,
        MorphologyOp::TopHat,
        MorphologyOp::BlackHat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MorphologyOp::Erode => "erode",
            MorphologyOp::Dilate => "dilate",
            MorphologyOp::Open => "open",
            MorphologyOp::Close => "close",
            MorphologyOp::Gradient => "gradient",
            MorphologyOp::TopHat => "tophat",
            MorphologyOp::BlackHat => "blackhat",
        }
    }
}

impl fmt::Display for MorphologyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MorphologyOp {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == key)
            .ok_or_else(|| EditorError::invalid(format!("unknown morphology operation '{s}'")))
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Shared rank filter: `pick` folds the samples under `offsets`.
fn rank_filter(
    input: ArrayView3<u8>,
    offsets: &[(isize, isize)],
    init: u8,
    pick: fn(u8, u8) -> u8,
) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;
    let color_channels = color_channels(channels);

    let mut output_flat = vec![0u8; height * width * channels];
    output_flat
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                for c in 0..color_channels {
                    let mut acc = init;
                    for &(dy, dx) in offsets {
                        let sy = replicate(y, dy, height);
                        let sx = replicate(x, dx, width);
                        acc = pick(acc, input[[sy, sx, c]]);
                    }
                    row[x * channels + c] = acc;
                }
                if channels == 4 {
                    row[x * channels + 3] = input[[y, x, 3]];
                }
            }
        });

    Ok(Array3::from_shape_vec((height, width, channels), output_flat)?)
}

/// Apply erosion: minimum over the structuring element footprint.
///
/// Dark regions grow and bright regions shrink.
pub fn erode_u8(input: ArrayView3<u8>, element: &StructuringElement) -> Result<Array3<u8>> {
    rank_filter(input, &element.offsets(), u8::MAX, u8::min)
}

/// Apply dilation: maximum over the reflected structuring element footprint.
///
/// Bright regions grow and dark regions shrink.
pub fn dilate_u8(input: ArrayView3<u8>, element: &StructuringElement) -> Result<Array3<u8>> {
    let reflected: Vec<(isize, isize)> = element
        .offsets()
        .into_iter()
        .map(|(dy, dx)| (-dy, -dx))
        .collect();
    rank_filter(input, &reflected, u8::MIN, u8::max)
}

/// `a - b` per color sample, saturating at 0. Alpha is taken from `a`.
fn saturating_difference(a: Array3<u8>, b: &Array3<u8>) -> Array3<u8> {
    let channels = a.dim().2;
    let color_channels = color_channels(channels);
    let mut out = a;
    Zip::indexed(&mut out).and(b).for_each(|(_, _, c), v, &s| {
        if c < color_channels {
            *v = v.saturating_sub(s);
        }
    });
    out
}

// ============================================================================
// Compositions
// ============================================================================

/// Apply a morphological operation with the given structuring element.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `element` - Binary footprint with anchor
/// * `op` - Operation to apply
///
/// # Returns
/// New image with same shape, alpha preserved
pub fn morphology_u8(
    input: ArrayView3<u8>,
    element: &StructuringElement,
    op: MorphologyOp,
) -> Result<Array3<u8>> {
    match op {
        MorphologyOp::Erode => erode_u8(input, element),
        MorphologyOp::Dilate => dilate_u8(input, element),
        MorphologyOp::Open => dilate_u8(erode_u8(input, element)?.view(), element),
        MorphologyOp::Close => erode_u8(dilate_u8(input, element)?.view(), element),
        MorphologyOp::Gradient => {
            let eroded = erode_u8(input, element)?;
            Ok(saturating_difference(dilate_u8(input, element)?, &eroded))
        }
        MorphologyOp::TopHat => {
            let opened = morphology_u8(input, element, MorphologyOp::Open)?;
            Ok(saturating_difference(input.to_owned(), &opened))
        }
        MorphologyOp::BlackHat => {
            let closed = morphology_u8(input, element, MorphologyOp::Close)?;
            Ok(saturating_difference(closed, &input.to_owned()))
        }
    }
}
