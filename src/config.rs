//! Editor settings shared by the pipeline, codec and display adapters.
//!
//! Settings are plain serde structs with `#[serde(default)]`, so a partial
//! JSON file only overrides what it names. Environment variables can then
//! override individual fields for deployments that cannot ship a file.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

pub const ENV_HISTORY_LIMIT: &str = "IMAGESTAG_EDITOR_HISTORY_LIMIT";
pub const ENV_JPEG_QUALITY: &str = "IMAGESTAG_EDITOR_JPEG_QUALITY";
pub const ENV_MAX_DISPLAY_WIDTH: &str = "IMAGESTAG_EDITOR_MAX_DISPLAY_WIDTH";
pub const ENV_MAX_DISPLAY_HEIGHT: &str = "IMAGESTAG_EDITOR_MAX_DISPLAY_HEIGHT";

/// Inclusive bounds for a correction factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorRange {
    pub min: f32,
    pub max: f32,
}

impl FactorRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// `InvalidParameter` naming `what` when `value` is out of bounds.
    pub fn check(&self, what: &str, value: f32) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(EditorError::invalid(format!(
                "{what} {value} outside [{}, {}]",
                self.min, self.max
            )))
        }
    }
}

/// Accepted factors for the tonal corrections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionLimits {
    pub linear: FactorRange,
    pub logarithmic: FactorRange,
    pub gamma: FactorRange,
}

impl Default for CorrectionLimits {
    fn default() -> Self {
        Self {
            linear: FactorRange::new(0.1, 2.0),
            logarithmic: FactorRange::new(0.1, 2.0),
            gamma: FactorRange::new(0.1, 3.0),
        }
    }
}

/// Display bounding box in pixels (width x height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Previews are downscaled to fit inside this box (never upscaled).
    pub max_display_size: DisplaySize,
    /// Number of structural edits that can be undone.
    pub history_limit: usize,
    /// JPEG quality (1-100) used when saving `.jpg`/`.jpeg`.
    pub jpeg_quality: u8,
    pub correction_limits: CorrectionLimits,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_display_size: DisplaySize::default(),
            history_limit: 20,
            jpeg_quality: 90,
            correction_limits: CorrectionLimits::default(),
        }
    }
}

impl EditorSettings {
    /// Load settings from a JSON file and validate them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let settings: EditorSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        debug!("loaded editor settings from {}", path.display());
        Ok(settings)
    }

    /// Write pretty-printed JSON, overwriting any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Defaults with the process environment applied.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_overrides(std::env::vars())?;
        Ok(settings)
    }

    /// Apply `IMAGESTAG_EDITOR_*` overrides from `vars`; other keys are ignored.
    ///
    /// Nothing is changed unless every override parses and the result
    /// validates.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut next = self.clone();
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match key {
                ENV_HISTORY_LIMIT => next.history_limit = parse_var(key, value)?,
                ENV_JPEG_QUALITY => next.jpeg_quality = parse_var(key, value)?,
                ENV_MAX_DISPLAY_WIDTH => next.max_display_size.width = parse_var(key, value)?,
                ENV_MAX_DISPLAY_HEIGHT => next.max_display_size.height = parse_var(key, value)?,
                _ => continue,
            }
            debug!("settings override {key}={value}");
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(EditorError::Config("history_limit must be at least 1".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(EditorError::Config(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if self.max_display_size.width == 0 || self.max_display_size.height == 0 {
            return Err(EditorError::Config(
                "max_display_size must be non-empty".into(),
            ));
        }
        let limits = &self.correction_limits;
        for (name, range) in [
            ("linear", limits.linear),
            ("logarithmic", limits.logarithmic),
            ("gamma", limits.gamma),
        ] {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(EditorError::Config(format!(
                    "{name} correction range [{}, {}] is invalid",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| EditorError::Config(format!("{key}: cannot parse '{value}'")))
}
