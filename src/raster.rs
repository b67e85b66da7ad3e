//! The in-memory pixel grid.
//!
//! A [`Raster`] is always a `(height, width, channels)` array of u8 samples
//! with 1 (L), 3 (RGB) or 4 (RGBA) channels. Grayscale images keep a
//! trailing channel axis of length 1 so every filter sees the same shape.

use ndarray::{Array2, Array3, ArrayView3, Axis};

use crate::error::{EditorError, Result};

/// Channel semantics of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorModel {
    Grayscale,
    Rgb,
    Rgba,
}

impl ColorModel {
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(ColorModel::Grayscale),
            3 => Ok(ColorModel::Rgb),
            4 => Ok(ColorModel::Rgba),
            other => Err(EditorError::UnsupportedShape { channels: other }),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            ColorModel::Grayscale => 1,
            ColorModel::Rgb => 3,
            ColorModel::Rgba => 4,
        }
    }

    /// Bits per pixel for 8-bit samples.
    pub fn color_depth(self) -> u32 {
        self.channels() as u32 * 8
    }

    pub fn as_label(self) -> &'static str {
        match self {
            ColorModel::Grayscale => "L",
            ColorModel::Rgb => "RGB",
            ColorModel::Rgba => "RGBA",
        }
    }
}

/// Validate a channel count for a pixel operation.
#[inline]
pub(crate) fn check_channels(channels: usize) -> Result<()> {
    ColorModel::from_channels(channels).map(|_| ())
}

/// Number of channels that carry color (alpha excluded).
#[inline]
pub(crate) fn color_channels(channels: usize) -> usize {
    if channels == 4 {
        3
    } else {
        channels
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    data: Array3<u8>,
}

impl Raster {
    /// Wrap an `(H, W, C)` array, rejecting unsupported channel counts and
    /// zero-area grids.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        check_channels(channels)?;
        if height == 0 || width == 0 {
            return Err(EditorError::invalid(format!(
                "raster must not be empty (got {width}x{height})"
            )));
        }
        Ok(Self { data })
    }

    /// Wrap a 2-D grayscale grid as a single-channel raster.
    pub fn from_gray(data: Array2<u8>) -> Result<Self> {
        Self::from_array(data.insert_axis(Axis(2)))
    }

    /// Build a raster from interleaved row-major samples.
    pub fn from_raw(width: usize, height: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        check_channels(channels)?;
        let data = Array3::from_shape_vec((height, width, channels), samples)?;
        Self::from_array(data)
    }

    /// A raster where every pixel equals `pixel`.
    pub fn filled(width: usize, height: usize, pixel: &[u8]) -> Result<Self> {
        check_channels(pixel.len())?;
        let data = Array3::from_shape_fn((height, width, pixel.len()), |(_, _, c)| pixel[c]);
        Self::from_array(data)
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn color_model(&self) -> ColorModel {
        // Channel count is validated on construction.
        match self.channels() {
            1 => ColorModel::Grayscale,
            3 => ColorModel::Rgb,
            _ => ColorModel::Rgba,
        }
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels() == 1
    }

    /// Interleaved row-major samples, as codecs expect them.
    pub fn to_raw(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_array_rejects_two_channels() {
        let err = Raster::from_array(Array3::<u8>::zeros((2, 2, 2))).unwrap_err();
        assert!(matches!(err, EditorError::UnsupportedShape { channels: 2 }));
    }

    #[test]
    fn test_from_array_rejects_empty() {
        let err = Raster::from_array(Array3::<u8>::zeros((0, 4, 3))).unwrap_err();
        assert!(matches!(err, EditorError::InvalidParameter(_)));
    }

    #[test]
    fn test_from_gray_adds_channel_axis() {
        let gray = Array2::from_shape_vec((2, 3), vec![1, 2, 3, 4, 5, 6]).unwrap();
        let raster = Raster::from_gray(gray).unwrap();
        assert_eq!(raster.as_array().dim(), (2, 3, 1));
        assert_eq!(raster.color_model(), ColorModel::Grayscale);
        assert_eq!(raster.as_array()[[1, 2, 0]], 6);
    }

    #[test]
    fn test_raw_roundtrip_keeps_order() {
        let samples: Vec<u8> = (0..24).collect();
        let raster = Raster::from_raw(2, 4, 3, samples.clone()).unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 4);
        assert_eq!(raster.to_raw(), samples);
    }

    #[test]
    fn test_filled_and_depth() {
        let raster = Raster::filled(3, 2, &[10, 20, 30, 255]).unwrap();
        assert_eq!(raster.pixel_count(), 6);
        assert_eq!(raster.color_model().color_depth(), 32);
        assert_eq!(raster.as_array()[[1, 2, 2]], 30);
    }
}
