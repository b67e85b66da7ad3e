//! Python bindings (feature `python`).
//!
//! Exposes [`ImageEditor`](crate::ImageEditor) as the `ImageEditor` class of
//! the `imagestag_editor` extension module. Images cross the boundary as
//! `(H, W, C)` u8 numpy arrays.

use std::path::PathBuf;

use numpy::{IntoPyArray, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

use crate::config::EditorSettings;
use crate::editor::ImageEditor;
use crate::error::EditorError;
use crate::filters::kernel::{Kernel, StructuringElement};
use crate::filters::morphology::MorphologyOp;
use crate::histogram::{Histogram, HistogramEngine, StandardHistogramEngine};
use crate::params::ParameterSet;
use crate::pipeline::StructuralEdit;

impl From<EditorError> for PyErr {
    fn from(err: EditorError) -> PyErr {
        match err {
            EditorError::Load { .. } | EditorError::Save { .. } | EditorError::Io(_) => {
                PyIOError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn histogram_dict<'py>(py: Python<'py>, histogram: &Histogram) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (name, bins) in histogram.channels() {
        dict.set_item(name, bins.to_vec())?;
    }
    Ok(dict)
}

/// Interactive editor over one image with a non-destructive pipeline.
#[pyclass(name = "ImageEditor")]
pub struct PyImageEditor {
    inner: ImageEditor,
}

#[pymethods]
impl PyImageEditor {
    /// Create an editor. Settings come from `settings_path` (JSON) when
    /// given, otherwise from defaults plus `IMAGESTAG_EDITOR_*` variables.
    #[new]
    #[pyo3(signature = (settings_path=None))]
    fn new(settings_path: Option<PathBuf>) -> PyResult<Self> {
        let settings = match settings_path {
            Some(path) => EditorSettings::load(path)?,
            None => EditorSettings::from_env()?,
        };
        Ok(Self {
            inner: ImageEditor::new(settings)?,
        })
    }

    fn load(&mut self, path: PathBuf) -> PyResult<()> {
        Ok(self.inner.load(path)?)
    }

    fn save(&mut self, path: PathBuf) -> PyResult<()> {
        Ok(self.inner.save(path)?)
    }

    #[getter]
    fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    #[getter]
    fn is_modified(&self) -> bool {
        self.inner.is_modified()
    }

    #[pyo3(signature = (brightness=0.0, contrast=1.0, saturation=1.0, rotation=0))]
    fn apply_parameters(
        &mut self,
        brightness: f32,
        contrast: f32,
        saturation: f32,
        rotation: i32,
    ) -> PyResult<()> {
        Ok(self.inner.apply_parameters(ParameterSet {
            brightness,
            contrast,
            saturation,
            rotation,
        })?)
    }

    /// Current parameters as `(brightness, contrast, saturation, rotation)`.
    fn parameters(&self) -> PyResult<(f32, f32, f32, i32)> {
        let p = self.inner.params()?;
        Ok((p.brightness, p.contrast, p.saturation, p.rotation))
    }

    fn rotate(&mut self, degrees: i32) -> PyResult<()> {
        Ok(self.inner.rotate(degrees)?)
    }

    fn commit_rotation(&mut self) -> PyResult<()> {
        Ok(self.inner.commit_rotation()?)
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    fn grayscale(&mut self) -> PyResult<()> {
        Ok(self.inner.convert_to_grayscale()?)
    }

    fn linear_correction(&mut self, factor: f32) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::LinearCorrection(factor))?)
    }

    fn logarithmic_correction(&mut self, factor: f32) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::LogarithmicCorrection(factor))?)
    }

    fn gamma_correction(&mut self, gamma: f32) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::GammaCorrection(gamma))?)
    }

    fn sharpen(&mut self) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::Sharpen)?)
    }

    #[pyo3(signature = (size=3))]
    fn box_blur(&mut self, size: usize) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::BoxBlur { size })?)
    }

    #[pyo3(signature = (sigma=1.0))]
    fn gaussian_blur(&mut self, sigma: f32) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::GaussianBlur { sigma })?)
    }

    #[pyo3(signature = (size=9, angle=0.0))]
    fn motion_blur(&mut self, size: usize, angle: f32) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::MotionBlur { size, angle })?)
    }

    fn emboss(&mut self) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::Emboss)?)
    }

    #[pyo3(signature = (size=3))]
    fn median(&mut self, size: usize) -> PyResult<()> {
        Ok(self.inner.apply_edit(&StructuralEdit::Median { size })?)
    }

    /// Correlate with a 2-D float kernel. `normalize` divides by its sum.
    #[pyo3(signature = (kernel, anchor=None, normalize=false))]
    fn convolve(
        &mut self,
        kernel: PyReadonlyArray2<'_, f32>,
        anchor: Option<(usize, usize)>,
        normalize: bool,
    ) -> PyResult<()> {
        let weights = kernel.as_array().to_owned();
        let kernel = match anchor {
            Some(anchor) => Kernel::new(weights, anchor)?,
            None => Kernel::centered(weights)?,
        };
        let edit = if normalize {
            StructuralEdit::CustomFilter(kernel)
        } else {
            StructuralEdit::Convolve(kernel)
        };
        Ok(self.inner.apply_edit(&edit)?)
    }

    /// Morphology with a 0/1 structuring element, e.g. `op="tophat"`.
    #[pyo3(signature = (op, kernel, anchor=None))]
    fn morphology(
        &mut self,
        op: &str,
        kernel: PyReadonlyArray2<'_, u8>,
        anchor: Option<(usize, usize)>,
    ) -> PyResult<()> {
        let op: MorphologyOp = op.parse()?;
        let cells = kernel.as_array().to_owned();
        let element = match anchor {
            Some(anchor) => StructuringElement::new(&cells, anchor)?,
            None => StructuringElement::centered(&cells)?,
        };
        Ok(self.inner.morphology(op, element)?)
    }

    fn undo(&mut self) -> PyResult<bool> {
        Ok(self.inner.undo()?)
    }

    fn reset(&mut self) -> PyResult<()> {
        Ok(self.inner.reset()?)
    }

    // ========================================================================
    // Read side
    // ========================================================================

    fn current<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(self.inner.current()?.as_array().clone().into_pyarray(py))
    }

    fn original<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(self.inner.original()?.as_array().clone().into_pyarray(py))
    }

    fn histogram<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        histogram_dict(py, &self.inner.histogram()?)
    }

    fn original_histogram<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        histogram_dict(py, &self.inner.original_histogram()?)
    }

    /// Info panel rows as a `{label: value}` dict.
    fn info<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (label, value) in self.inner.info_summary()? {
            dict.set_item(label, value)?;
        }
        Ok(dict)
    }

    /// PNG bytes of the current image scaled to the display box.
    fn preview_png<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        Ok(PyBytes::new(py, &self.inner.preview_png()?))
    }
}

/// Histogram of an `(H, W, C)` u8 array as a `{channel: counts}` dict.
#[pyfunction]
pub fn histogram<'py>(
    py: Python<'py>,
    image: PyReadonlyArray3<'py, u8>,
) -> PyResult<Bound<'py, PyDict>> {
    let histogram = StandardHistogramEngine.compute(image.as_array())?;
    histogram_dict(py, &histogram)
}

#[pymodule]
pub fn imagestag_editor(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyImageEditor>()?;
    m.add_function(wrap_pyfunction!(histogram, m)?)?;
    Ok(())
}
