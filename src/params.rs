//! Reversible adjustment parameters.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::filters::color_adjust::{BRIGHTNESS_RANGE, CONTRAST_RANGE, SATURATION_RANGE};
use crate::filters::rotate::normalize_angle;

/// The full set of adjustments replayed on top of the base image.
///
/// `current` is always recomputed from `base` and the whole set, so two
/// equal sets always produce the same composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// -100 (black) to 100 (double), 0 = no change
    pub brightness: f32,
    /// 0.0 (flat) to 3.0, 1.0 = no change
    pub contrast: f32,
    /// 0.0 (gray) to 3.0, 1.0 = no change
    pub saturation: f32,
    /// Counter-clockwise quarter turn: 0, 90, 180 or 270
    pub rotation: i32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::identity()
    }
}

impl ParameterSet {
    pub const fn identity() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            rotation: 0,
        }
    }

    /// Check every field; the first violation is reported.
    pub fn validate(&self) -> Result<()> {
        check_range("brightness", self.brightness, &BRIGHTNESS_RANGE)?;
        check_range("contrast", self.contrast, &CONTRAST_RANGE)?;
        check_range("saturation", self.saturation, &SATURATION_RANGE)?;
        match normalize_angle(self.rotation) {
            Ok(angle) if angle == self.rotation => Ok(()),
            _ => Err(EditorError::invalid(format!(
                "rotation must be one of 0, 90, 180, 270, got {}",
                self.rotation
            ))),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Same adjustments with rotation advanced by `degrees` (normalized).
    pub fn rotated_by(&self, degrees: i32) -> Result<Self> {
        let rotation = normalize_angle(self.rotation + normalize_angle(degrees)?)?;
        Ok(Self { rotation, ..*self })
    }
}

fn check_range(name: &str, value: f32, range: &std::ops::RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EditorError::invalid(format!(
            "{name} {value} outside [{}, {}]",
            range.start(),
            range.end()
        )))
    }
}
