//! Non-destructive processing pipeline.
//!
//! Two kinds of change reach an [`ImageState`]:
//!
//! - **Adjustments** ([`ParameterSet`]) are never baked in. Every change
//!   recomputes `current` from `base` with the full parameter set, in the
//!   fixed order grayscale-forcing, brightness, contrast, saturation,
//!   rotation. Repeating a call with the same parameters is bit-identical.
//! - **Structural edits** ([`StructuralEdit`]) rewrite `base`. The previous
//!   base is pushed onto the bounded undo history and the active parameters
//!   are replayed on top of the new base.
//!
//! Every entry point is transactional: the new buffers are fully computed
//! before anything in the state is replaced.

use log::{debug, info};
use ndarray::{Array3, ArrayView3};

use crate::config::CorrectionLimits;
use crate::error::{Result, Stage};
use crate::filters::kernel::{Kernel, StructuringElement};
use crate::filters::morphology::MorphologyOp;
use crate::filters::{PixelOps, StandardPixelOps};
use crate::params::ParameterSet;
use crate::raster::Raster;
use crate::state::ImageState;

/// An operation that permanently changes the base image.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralEdit {
    /// Convert to a single luma channel and force grayscale from now on.
    Grayscale,
    LinearCorrection(f32),
    LogarithmicCorrection(f32),
    GammaCorrection(f32),
    Sharpen,
    BoxBlur { size: usize },
    GaussianBlur { sigma: f32 },
    MotionBlur { size: usize, angle: f32 },
    Emboss,
    Median { size: usize },
    /// Correlate with the kernel exactly as given.
    Convolve(Kernel),
    /// Correlate with the kernel divided by its sum (when non-zero).
    CustomFilter(Kernel),
    Morphology {
        op: MorphologyOp,
        element: StructuringElement,
    },
    /// Fold a quarter turn into the base.
    Rotate(i32),
}

impl StructuralEdit {
    pub fn name(&self) -> &'static str {
        match self {
            StructuralEdit::Grayscale => "grayscale",
            StructuralEdit::LinearCorrection(_) => "linear correction",
            StructuralEdit::LogarithmicCorrection(_) => "logarithmic correction",
            StructuralEdit::GammaCorrection(_) => "gamma correction",
            StructuralEdit::Sharpen => "sharpen",
            StructuralEdit::BoxBlur { .. } => "box blur",
            StructuralEdit::GaussianBlur { .. } => "gaussian blur",
            StructuralEdit::MotionBlur { .. } => "motion blur",
            StructuralEdit::Emboss => "emboss",
            StructuralEdit::Median { .. } => "median",
            StructuralEdit::Convolve(_) => "convolve",
            StructuralEdit::CustomFilter(_) => "custom filter",
            StructuralEdit::Morphology { op, .. } => op.as_str(),
            StructuralEdit::Rotate(_) => "rotate",
        }
    }
}

pub struct ProcessingPipeline<P: PixelOps = StandardPixelOps> {
    ops: P,
    limits: CorrectionLimits,
}

impl Default for ProcessingPipeline {
    fn default() -> Self {
        Self::new(CorrectionLimits::default())
    }
}

impl ProcessingPipeline {
    pub fn new(limits: CorrectionLimits) -> Self {
        Self::with_ops(StandardPixelOps, limits)
    }
}

impl<P: PixelOps> ProcessingPipeline<P> {
    pub fn with_ops(ops: P, limits: CorrectionLimits) -> Self {
        Self { ops, limits }
    }

    pub fn ops(&self) -> &P {
        &self.ops
    }

    pub fn limits(&self) -> &CorrectionLimits {
        &self.limits
    }

    /// Compute the displayed image for `base` under `params`.
    ///
    /// Identity stages are skipped. A failing stage is reported as
    /// `ProcessingFailed` carrying that stage.
    pub fn composite(&self, base: &Raster, grayscale: bool, params: &ParameterSet) -> Result<Raster> {
        let mut image: Array3<u8> = if grayscale && !base.is_grayscale() {
            debug!("replay: {}", Stage::Grayscale);
            self.ops
                .grayscale(base.view())
                .map_err(|e| e.at_stage(Stage::Grayscale))?
        } else {
            base.as_array().clone()
        };

        if params.brightness != 0.0 {
            debug!("replay: {} {}", Stage::Brightness, params.brightness);
            image = self
                .ops
                .brightness(image.view(), params.brightness)
                .map_err(|e| e.at_stage(Stage::Brightness))?;
        }
        if params.contrast != 1.0 {
            debug!("replay: {} {}", Stage::Contrast, params.contrast);
            image = self
                .ops
                .contrast(image.view(), params.contrast)
                .map_err(|e| e.at_stage(Stage::Contrast))?;
        }
        if params.saturation != 1.0 && !grayscale && image.dim().2 != 1 {
            debug!("replay: {} {}", Stage::Saturation, params.saturation);
            image = self
                .ops
                .saturation(image.view(), params.saturation)
                .map_err(|e| e.at_stage(Stage::Saturation))?;
        }
        if params.rotation != 0 {
            debug!("replay: {} {}", Stage::Rotation, params.rotation);
            image = self
                .ops
                .rotate(image.view(), params.rotation)
                .map_err(|e| e.at_stage(Stage::Rotation))?;
        }

        Raster::from_array(image)
    }

    /// Validate `params` as a whole and recompute `current` from `base`.
    pub fn apply_parameters(&self, state: &mut ImageState, params: ParameterSet) -> Result<()> {
        params.validate()?;
        let current = self.composite(&state.base, state.grayscale, &params)?;

        if params != state.params {
            state.modified = true;
        }
        state.params = params;
        state.current = current;
        Ok(())
    }

    /// Run one structural edit on `base` without touching any state.
    fn run_edit(&self, base: ArrayView3<u8>, edit: &StructuralEdit) -> Result<Array3<u8>> {
        let ops = &self.ops;
        match edit {
            StructuralEdit::Grayscale => ops.grayscale(base),
            StructuralEdit::LinearCorrection(factor) => {
                self.limits.linear.check("linear correction factor", *factor)?;
                ops.linear_correction(base, *factor)
            }
            StructuralEdit::LogarithmicCorrection(factor) => {
                self.limits
                    .logarithmic
                    .check("logarithmic correction factor", *factor)?;
                ops.logarithmic_correction(base, *factor)
            }
            StructuralEdit::GammaCorrection(gamma) => {
                self.limits.gamma.check("gamma", *gamma)?;
                ops.gamma_correction(base, *gamma)
            }
            StructuralEdit::Sharpen => ops.convolve(base, &Kernel::sharpen()),
            StructuralEdit::BoxBlur { size } => ops.convolve(base, &Kernel::box_blur(*size)?),
            StructuralEdit::GaussianBlur { sigma } => ops.convolve(base, &Kernel::gaussian(*sigma)?),
            StructuralEdit::MotionBlur { size, angle } => {
                ops.convolve(base, &Kernel::motion_blur(*size, *angle)?)
            }
            StructuralEdit::Emboss => ops.emboss(base),
            StructuralEdit::Median { size } => ops.median(base, *size),
            StructuralEdit::Convolve(kernel) => ops.convolve(base, kernel),
            StructuralEdit::CustomFilter(kernel) => ops.convolve(base, &kernel.clone().normalized()),
            StructuralEdit::Morphology { op, element } => ops.morphology(base, element, *op),
            StructuralEdit::Rotate(degrees) => ops.rotate(base, *degrees),
        }
    }

    /// Commit `edit` into `base` and replay the active parameters.
    pub fn apply_structural_edit(&self, state: &mut ImageState, edit: &StructuralEdit) -> Result<()> {
        debug!("structural edit: {}", edit.name());
        let base = Raster::from_array(self.run_edit(state.base.view(), edit)?)?;
        let grayscale = state.grayscale || matches!(edit, StructuralEdit::Grayscale);
        let current = self.composite(&base, grayscale, &state.params)?;

        state.history.push(state.snapshot());
        state.base = base;
        state.grayscale = grayscale;
        state.current = current;
        state.modified = true;
        Ok(())
    }

    /// Fold the rotation parameter into `base` and reset it to 0.
    ///
    /// Adjustments commute with quarter turns, so `current` is unchanged.
    /// The commit is a history entry: a following [`undo`](Self::undo)
    /// restores the unrotated base while `rotation` stays 0, so the committed
    /// turn disappears from `current`.
    pub fn commit_rotation(&self, state: &mut ImageState) -> Result<()> {
        let rotation = state.params.rotation;
        if rotation == 0 {
            return Ok(());
        }
        debug!("committing rotation {rotation}");
        let base = Raster::from_array(
            self.ops
                .rotate(state.base.view(), rotation)
                .map_err(|e| e.at_stage(Stage::Rotation))?,
        )?;
        let params = ParameterSet {
            rotation: 0,
            ..state.params
        };
        let current = self.composite(&base, state.grayscale, &params)?;

        state.history.push(state.snapshot());
        state.base = base;
        state.params = params;
        state.current = current;
        Ok(())
    }

    /// Restore the most recent structural snapshot.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&self, state: &mut ImageState) -> Result<bool> {
        let current = match state.history.peek() {
            Some(snapshot) => self.composite(&snapshot.base, snapshot.grayscale, &state.params)?,
            None => return Ok(false),
        };
        if let Some(snapshot) = state.history.pop() {
            debug!("undo: {} entries left", state.history.len());
            state.base = snapshot.base;
            state.grayscale = snapshot.grayscale;
            state.current = current;
            state.modified = true;
        }
        Ok(true)
    }

    /// Return to the loaded image: identity parameters, empty history.
    pub fn reset(&self, state: &mut ImageState) {
        info!("resetting image to original");
        state.base = state.original().clone();
        state.current = state.original().clone();
        state.params = ParameterSet::identity();
        state.grayscale = false;
        state.history.clear();
        state.modified = false;
    }
}
