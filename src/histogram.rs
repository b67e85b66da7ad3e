//! Per-channel frequency distributions.

use ndarray::{ArrayView3, Axis};
use serde::Serialize;

use crate::error::{EditorError, Result};

pub const BINS: usize = 256;

pub type Bins = [u64; BINS];

/// 256-bin sample counts. Bin `i` counts samples equal to `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Histogram {
    Grayscale {
        #[serde(with = "bins_serde")]
        luminance: Bins,
    },
    Rgb {
        #[serde(with = "bins_serde")]
        red: Bins,
        #[serde(with = "bins_serde")]
        green: Bins,
        #[serde(with = "bins_serde")]
        blue: Bins,
    },
}

mod bins_serde {
    use super::Bins;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bins: &Bins, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(bins.iter())
    }
}

impl Histogram {
    /// Bin edges `0, 1, ..., 256`.
    pub fn bin_edges() -> Vec<u32> {
        (0..=BINS as u32).collect()
    }

    /// Channel distributions in display order with their names.
    pub fn channels(&self) -> Vec<(&'static str, &Bins)> {
        match self {
            Histogram::Grayscale { luminance } => vec![("luminance", luminance)],
            Histogram::Rgb { red, green, blue } => {
                vec![("red", red), ("green", green), ("blue", blue)]
            }
        }
    }

    /// Total count per channel; each equals the pixel count.
    pub fn channel_totals(&self) -> Vec<u64> {
        self.channels()
            .into_iter()
            .map(|(_, bins)| bins.iter().sum())
            .collect()
    }

    /// Largest single bin across all channels.
    pub fn peak(&self) -> u64 {
        self.channels()
            .into_iter()
            .flat_map(|(_, bins)| bins.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Counts scaled by the peak into 0.0-1.0, one vector per channel.
    pub fn normalized(&self) -> Vec<Vec<f32>> {
        let peak = self.peak().max(1) as f32;
        self.channels()
            .into_iter()
            .map(|(_, bins)| bins.iter().map(|&n| n as f32 / peak).collect())
            .collect()
    }
}

/// Histogram capability consumed by the editor.
pub trait HistogramEngine {
    fn compute(&self, image: ArrayView3<u8>) -> Result<Histogram>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHistogramEngine;

fn count(image: &ArrayView3<u8>, channel: usize) -> Bins {
    let mut bins = [0u64; BINS];
    for &v in image.index_axis(Axis(2), channel).iter() {
        bins[v as usize] += 1;
    }
    bins
}

impl HistogramEngine for StandardHistogramEngine {
    /// One distribution for grayscale; R, G and B for color (alpha ignored).
    fn compute(&self, image: ArrayView3<u8>) -> Result<Histogram> {
        match image.dim().2 {
            1 => Ok(Histogram::Grayscale {
                luminance: count(&image, 0),
            }),
            3 | 4 => Ok(Histogram::Rgb {
                red: count(&image, 0),
                green: count(&image, 1),
                blue: count(&image, 2),
            }),
            channels => Err(EditorError::UnsupportedShape { channels }),
        }
    }
}
