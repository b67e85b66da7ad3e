//! Error taxonomy shared by every editor component.
//!
//! Every fallible operation returns [`Result`]. Operations that touch the
//! active [`ImageState`](crate::state::ImageState) are transactional: when one
//! of these errors is returned the state is exactly what it was before the
//! call.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage that was running when a replay failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Grayscale,
    Brightness,
    Contrast,
    Saturation,
    Rotation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Grayscale => "grayscale",
            Stage::Brightness => "brightness",
            Stage::Contrast => "contrast",
            Stage::Saturation => "saturation",
            Stage::Rotation => "rotation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    /// The file is missing, unreadable or not a decodable image.
    #[error("failed to load image '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The encoder or the filesystem refused the write.
    #[error("failed to save image '{}': {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// In-memory encoding (previews) failed.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// A numeric input is outside its documented domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The raster's channel layout is not one of L, RGB or RGBA.
    #[error("unsupported raster shape: {channels} channels (expected 1, 3 or 4)")]
    UnsupportedShape { channels: usize },

    /// Only quarter turns are supported.
    #[error("unsupported rotation angle: {0} degrees")]
    UnsupportedAngle(i32),

    /// A pixel operation failed while replaying adjustments.
    #[error("processing failed at {stage} stage: {source}")]
    ProcessingFailed {
        stage: Stage,
        #[source]
        source: Box<EditorError>,
    },

    /// An operation needs a loaded image and none is active.
    #[error("no image loaded")]
    NoImage,

    #[error("raster layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EditorError::InvalidParameter(message.into())
    }

    /// Wrap a pixel-op failure with the pipeline stage that produced it.
    pub(crate) fn at_stage(self, stage: Stage) -> Self {
        EditorError::ProcessingFailed {
            stage,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
