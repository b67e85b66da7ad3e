//! Median filter.
//!
//! Removes salt-and-pepper noise while preserving edges. The window is a
//! `size x size` square centered on each pixel; samples outside the image
//! replicate the nearest edge pixel. Alpha (if present) is preserved.

use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use super::convolve::replicate;
use crate::error::{EditorError, Result};
use crate::raster::{check_channels, color_channels};

/// Largest accepted window edge.
pub const MAX_MEDIAN_SIZE: usize = 21;

/// Apply a median filter.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `size` - Odd window edge length, 1 to [`MAX_MEDIAN_SIZE`]
///
/// # Returns
/// Median-filtered image with same channel count
pub fn median_u8(input: ArrayView3<u8>, size: usize) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    check_channels(channels)?;
    if size % 2 == 0 || size > MAX_MEDIAN_SIZE {
        return Err(EditorError::invalid(format!(
            "median size must be odd and at most {MAX_MEDIAN_SIZE}, got {size}"
        )));
    }

    let radius = (size / 2) as isize;
    let color_channels = color_channels(channels);

    let mut output_flat = vec![0u8; height * width * channels];
    output_flat
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            let mut values: Vec<u8> = Vec::with_capacity(size * size);
            for x in 0..width {
                for c in 0..color_channels {
                    values.clear();
                    for dy in -radius..=radius {
                        let sy = replicate(y, dy, height);
                        for dx in -radius..=radius {
                            values.push(input[[sy, replicate(x, dx, width), c]]);
                        }
                    }
                    values.sort_unstable();
                    row[x * channels + c] = values[values.len() / 2];
                }
                if channels == 4 {
                    row[x * channels + 3] = input[[y, x, 3]];
                }
            }
        });

    Ok(Array3::from_shape_vec((height, width, channels), output_flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_removes_salt_pepper() {
        let mut img = Array3::<u8>::zeros((5, 5, 4));
        for y in 0..5 {
            for x in 0..5 {
                img[[y, x, 0]] = 128;
                img[[y, x, 3]] = 255;
            }
        }
        img[[2, 2, 0]] = 255;
        img[[1, 3, 0]] = 0;

        let result = median_u8(img.view(), 3).unwrap();

        assert_eq!(result[[2, 2, 0]], 128);
        assert_eq!(result[[1, 3, 0]], 128);
        assert_eq!(result[[2, 2, 3]], 255);
    }

    #[test]
    fn test_median_preserves_step_edge() {
        let img = Array3::from_shape_fn((6, 6, 1), |(_, x, _)| if x < 3 { 20 } else { 220 });
        let result = median_u8(img.view(), 3).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_median_size_one_is_identity() {
        let img = Array3::from_shape_fn((4, 3, 3), |(y, x, c)| (y * 60 + x * 7 + c) as u8);
        assert_eq!(median_u8(img.view(), 1).unwrap(), img);
    }

    #[test]
    fn test_median_rejects_even_size() {
        let img = Array3::<u8>::zeros((3, 3, 1));
        assert!(matches!(
            median_u8(img.view(), 4),
            Err(EditorError::InvalidParameter(_))
        ));
        assert!(median_u8(img.view(), MAX_MEDIAN_SIZE + 2).is_err());
    }
}
