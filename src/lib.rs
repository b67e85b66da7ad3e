//! ImageStag Editor Core
//!
//! Interactive raster image editing with a non-destructive adjustment
//! pipeline, implemented in Rust with optional Python bindings via PyO3.
//!
//! ## Image Format
//! Rasters are `ndarray::Array3<u8>` in `(height, width, channels)` layout:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Alpha is carried through every filter untouched.
//!
//! ## Editing Model
//! An open image keeps three rasters: the pristine `original`, the `base`
//! that structural edits (grayscale, corrections, convolutions, morphology)
//! write into, and the displayed `current`, which is always recomputed as
//! `base` + adjustment parameters (brightness, contrast, saturation,
//! rotation). Moving a slider never compounds with earlier slider moves.
//! Structural edits push the previous `base` onto a bounded undo history.

pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod filters;
pub mod histogram;
pub mod params;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod state;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python;

pub use codec::{FileCodec, ImageCodec, ImageFileFormat, ImageInfo};
pub use config::{CorrectionLimits, DisplaySize, EditorSettings, FactorRange};
pub use editor::ImageEditor;
pub use error::{EditorError, Result, Stage};
pub use filters::kernel::{Kernel, StructuringElement};
pub use filters::morphology::MorphologyOp;
pub use filters::{PixelOps, StandardPixelOps};
pub use histogram::{Histogram, HistogramEngine, StandardHistogramEngine};
pub use params::ParameterSet;
pub use pipeline::{ProcessingPipeline, StructuralEdit};
pub use raster::{ColorModel, Raster};
pub use state::{History, ImageState, Snapshot};

#[cfg(feature = "python")]
pub use python::imagestag_editor;
