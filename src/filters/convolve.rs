//! Convolution filters: generic kernel correlation and Emboss.
//!
//! ## Border Policy
//!
//! Samples outside the image take the value of the nearest edge sample
//! (replicate-edge). This matters for results within `kernel size / 2`
//! pixels of the border.
//!
//! ## Performance
//!
//! Rows are computed in parallel with Rayon. Each output row depends only
//! on the input, so results are identical to a sequential pass.

use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use super::kernel::Kernel;
use super::round_u8;
use crate::error::Result;
use crate::raster::{check_channels, color_channels};

/// Clamp `pos + offset` into `0..len` (replicate-edge lookup).
#[inline]
pub(crate) fn replicate(pos: usize, offset: isize, len: usize) -> usize {
    (pos as isize + offset).clamp(0, len as isize - 1) as usize
}

/// Correlate the image with `kernel` around its anchor.
///
/// `out(y, x) = Σ k[i][j] · in(y + i - anchor_row, x + j - anchor_col)`,
/// rounded and clamped to 0-255. The kernel is used as given: normalize it
/// first (see [`Kernel::normalized`]) for averaging filters.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `kernel` - Weights and anchor
///
/// # Returns
/// Filtered image with same channel count, alpha preserved
pub fn convolve_u8(input: ArrayView3<u8>, kernel: &Kernel) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;

    let weights = kernel.weights();
    let (anchor_row, anchor_col) = kernel.anchor();
    let taps: Vec<(isize, isize, f32)> = weights
        .indexed_iter()
        .filter(|(_, &w)| w != 0.0)
        .map(|((i, j), &w)| (i as isize - anchor_row as isize, j as isize - anchor_col as isize, w))
        .collect();

    let color_channels = color_channels(channels);
    let mut output_flat = vec![0u8; height * width * channels];
    output_flat
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                for c in 0..color_channels {
                    let mut sum = 0.0f32;
                    for &(dy, dx, w) in &taps {
                        let sy = replicate(y, dy, height);
                        let sx = replicate(x, dx, width);
                        sum += input[[sy, sx, c]] as f32 * w;
                    }
                    row[x * channels + c] = round_u8(sum);
                }
                if channels == 4 {
                    row[x * channels + 3] = input[[y, x, 3]];
                }
            }
        });

    Ok(Array3::from_shape_vec((height, width, channels), output_flat)?)
}

/// Emboss: `clamp(0.5 · in + 0.5 · clamp(emboss(in)) + 128)`.
///
/// The relief is blended half-and-half with the source and lifted to mid
/// gray so flat regions land near 128 + in / 2.
pub fn emboss_u8(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    let relief = convolve_u8(input, &Kernel::emboss())?;
    let channels = input.dim().2;
    let color_channels = color_channels(channels);

    let mut output = input.to_owned();
    for ((y, x, c), value) in output.indexed_iter_mut() {
        if c < color_channels {
            let blended = 0.5 * input[[y, x, c]] as f32 + 0.5 * relief[[y, x, c]] as f32 + 128.0;
            *value = round_u8(blended);
        }
    }
    Ok(output)
}
