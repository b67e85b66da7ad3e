//! Lossless quarter-turn rotation.
//!
//! ## Rotation Direction
//!
//! Positive angles rotate counter-clockwise:
//! - 90°: out[i][j] = in[j][W - 1 - i], output is (W, H, C)
//! - 180°: out[i][j] = in[H - 1 - i][W - 1 - j]
//! - 270°: out[i][j] = in[H - 1 - j][i], output is (W, H, C)
//!
//! Angles are normalized modulo 360, so -90 is the same turn as 270.

use ndarray::{Array3, ArrayView3};

use crate::error::{EditorError, Result};
use crate::raster::check_channels;

/// Normalize an angle to 0..360 and reject anything but a quarter turn.
pub fn normalize_angle(degrees: i32) -> Result<i32> {
    let normalized = degrees.rem_euclid(360);
    match normalized {
        0 | 90 | 180 | 270 => Ok(normalized),
        _ => Err(EditorError::UnsupportedAngle(degrees)),
    }
}

fn rotate_90_ccw(image: ArrayView3<u8>) -> Array3<u8> {
    let (h, w, c) = image.dim();
    let mut result = Array3::<u8>::zeros((w, h, c));

    for y in 0..h {
        for x in 0..w {
            let new_y = w - 1 - x;
            let new_x = y;
            for ch in 0..c {
                result[[new_y, new_x, ch]] = image[[y, x, ch]];
            }
        }
    }

    result
}

fn rotate_180(image: ArrayView3<u8>) -> Array3<u8> {
    let (h, w, c) = image.dim();
    let mut result = Array3::<u8>::zeros((h, w, c));

    for y in 0..h {
        for x in 0..w {
            for ch in 0..c {
                result[[h - 1 - y, w - 1 - x, ch]] = image[[y, x, ch]];
            }
        }
    }

    result
}

fn rotate_270_ccw(image: ArrayView3<u8>) -> Array3<u8> {
    let (h, w, c) = image.dim();
    let mut result = Array3::<u8>::zeros((w, h, c));

    for y in 0..h {
        for x in 0..w {
            let new_y = x;
            let new_x = h - 1 - y;
            for ch in 0..c {
                result[[new_y, new_x, ch]] = image[[y, x, ch]];
            }
        }
    }

    result
}

/// Rotate by a multiple of 90 degrees (counter-clockwise for positive angles).
///
/// # Arguments
/// * `image` - Input image (H, W, C) where C is 1, 3, or 4
/// * `degrees` - Any angle congruent to 0, 90, 180 or 270 modulo 360
pub fn rotate_u8(image: ArrayView3<u8>, degrees: i32) -> Result<Array3<u8>> {
    check_channels(image.dim().2)?;
    Ok(match normalize_angle(degrees)? {
        90 => rotate_90_ccw(image),
        180 => rotate_180(image),
        270 => rotate_270_ccw(image),
        _ => image.to_owned(),
    })
}
