//! The editor service: one active image, the pipeline, and the I/O seams.

use std::path::Path;

use log::info;

use crate::codec::{FileCodec, ImageCodec, ImageInfo};
use crate::config::EditorSettings;
use crate::error::{EditorError, Result};
use crate::filters::kernel::StructuringElement;
use crate::filters::morphology::MorphologyOp;
use crate::filters::{PixelOps, StandardPixelOps};
use crate::histogram::{Histogram, HistogramEngine, StandardHistogramEngine};
use crate::params::ParameterSet;
use crate::pipeline::{ProcessingPipeline, StructuralEdit};
use crate::preview::encode_preview;
use crate::raster::Raster;
use crate::state::ImageState;

/// Owns the active [`ImageState`] and composes codec, pipeline and
/// histogram engine around it.
///
/// Every operation except [`load`](Self::load) fails with
/// [`EditorError::NoImage`] until an image is loaded.
pub struct ImageEditor<
    C: ImageCodec = FileCodec,
    H: HistogramEngine = StandardHistogramEngine,
    P: PixelOps = StandardPixelOps,
> {
    codec: C,
    histogram: H,
    pipeline: ProcessingPipeline<P>,
    settings: EditorSettings,
    state: Option<ImageState>,
}

impl ImageEditor {
    /// Editor with the standard codec and engines configured by `settings`.
    pub fn new(settings: EditorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::with_parts(
            FileCodec::new(settings.jpeg_quality),
            StandardHistogramEngine,
            ProcessingPipeline::new(settings.correction_limits),
            settings,
        ))
    }
}

impl<C: ImageCodec, H: HistogramEngine, P: PixelOps> ImageEditor<C, H, P> {
    pub fn with_parts(
        codec: C,
        histogram: H,
        pipeline: ProcessingPipeline<P>,
        settings: EditorSettings,
    ) -> Self {
        Self {
            codec,
            histogram,
            pipeline,
            settings,
            state: None,
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Result<&ImageState> {
        self.state.as_ref().ok_or(EditorError::NoImage)
    }

    /// Decode `path` and make it the active image, replacing any previous one.
    ///
    /// On failure the previously loaded image stays active.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (raster, info) = self.codec.load(path)?;
        self.open(raster, Some((path, info)));
        Ok(())
    }

    /// Make an in-memory raster the active image.
    pub fn open_raster(&mut self, raster: Raster) {
        self.open(raster, None);
    }

    fn open(&mut self, raster: Raster, source: Option<(&Path, ImageInfo)>) {
        let mut state = ImageState::new(raster, self.settings.history_limit);
        if let Some((path, info)) = source {
            state = state.with_source(path, info);
        }
        self.state = Some(state);
    }

    /// Write the displayed (composited) image to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        self.codec.save(&state.current, path.as_ref())?;
        state.mark_saved();
        Ok(())
    }

    /// Drop the active image.
    pub fn close(&mut self) {
        if self.state.take().is_some() {
            info!("closed image");
        }
    }

    pub fn current(&self) -> Result<&Raster> {
        Ok(self.state()?.current())
    }

    pub fn original(&self) -> Result<&Raster> {
        Ok(self.state()?.original())
    }

    pub fn params(&self) -> Result<ParameterSet> {
        Ok(*self.state()?.params())
    }

    pub fn is_modified(&self) -> bool {
        self.state.as_ref().is_some_and(ImageState::is_modified)
    }

    pub fn image_info(&self) -> Result<Option<&ImageInfo>> {
        Ok(self.state()?.info())
    }

    /// Info panel rows: file facts plus the modification flag.
    pub fn info_summary(&self) -> Result<Vec<(&'static str, String)>> {
        let state = self.state()?;
        let mut rows = state.info().map(ImageInfo::summary).unwrap_or_default();
        let modified = if state.is_modified() { "Yes" } else { "No" };
        rows.push(("Modified", modified.to_string()));
        Ok(rows)
    }

    // ------------------------------------------------------------------
    // Adjustments
    // ------------------------------------------------------------------

    pub fn apply_parameters(&mut self, params: ParameterSet) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        self.pipeline.apply_parameters(state, params)
    }

    /// Advance the rotation parameter by a quarter-turn multiple.
    pub fn rotate(&mut self, degrees: i32) -> Result<()> {
        let params = self.params()?.rotated_by(degrees)?;
        self.apply_parameters(params)
    }

    pub fn commit_rotation(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        self.pipeline.commit_rotation(state)
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    pub fn apply_edit(&mut self, edit: &StructuralEdit) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        self.pipeline.apply_structural_edit(state, edit)
    }

    pub fn convert_to_grayscale(&mut self) -> Result<()> {
        self.apply_edit(&StructuralEdit::Grayscale)
    }

    pub fn morphology(&mut self, op: MorphologyOp, element: StructuringElement) -> Result<()> {
        self.apply_edit(&StructuralEdit::Morphology { op, element })
    }

    pub fn undo(&mut self) -> Result<bool> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        self.pipeline.undo(state)
    }

    pub fn reset(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(EditorError::NoImage)?;
        self.pipeline.reset(state);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read-side adapters
    // ------------------------------------------------------------------

    pub fn histogram(&self) -> Result<Histogram> {
        self.histogram.compute(self.current()?.view())
    }

    pub fn original_histogram(&self) -> Result<Histogram> {
        self.histogram.compute(self.original()?.view())
    }

    /// PNG bytes of the current image scaled to the configured display box.
    pub fn preview_png(&self) -> Result<Vec<u8>> {
        encode_preview(self.current()?, self.settings.max_display_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImageFileFormat;
    use image::GenericImageView;
    use tempfile::tempdir;

    fn editor_with(raster: Raster) -> ImageEditor {
        let mut editor = ImageEditor::new(EditorSettings::default()).unwrap();
        editor.open_raster(raster);
        editor
    }

    #[test]
    fn test_operations_need_an_image() {
        let mut editor = ImageEditor::new(EditorSettings::default()).unwrap();

        assert!(matches!(editor.current(), Err(EditorError::NoImage)));
        assert!(matches!(
            editor.apply_parameters(ParameterSet::identity()),
            Err(EditorError::NoImage)
        ));
        assert!(matches!(editor.reset(), Err(EditorError::NoImage)));
        assert!(matches!(editor.histogram(), Err(EditorError::NoImage)));
        assert!(matches!(editor.save("x.png"), Err(EditorError::NoImage)));
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let settings = EditorSettings {
            jpeg_quality: 0,
            ..EditorSettings::default()
        };
        assert!(matches!(
            ImageEditor::new(settings),
            Err(EditorError::Config(_))
        ));
    }

    #[test]
    fn test_load_edit_save_reload() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.png");
        let target = dir.path().join("edited.png");
        let codec = FileCodec::default();
        codec
            .save(&Raster::filled(12, 8, &[128, 128, 128]).unwrap(), &source)
            .unwrap();

        let mut editor = ImageEditor::new(EditorSettings::default()).unwrap();
        editor.load(&source).unwrap();
        let info = editor.image_info().unwrap().unwrap().clone();
        assert_eq!(info.format, ImageFileFormat::Png);
        assert_eq!(info.resolution(), (12, 8));

        editor
            .apply_parameters(ParameterSet {
                brightness: 50.0,
                ..ParameterSet::identity()
            })
            .unwrap();
        editor.rotate(90).unwrap();
        assert!(editor.is_modified());

        editor.save(&target).unwrap();
        assert!(!editor.is_modified());

        let (saved, _) = codec.load(&target).unwrap();
        assert_eq!((saved.width(), saved.height()), (8, 12));
        assert!(saved.as_array().iter().all(|&v| v == 192));
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let mut editor = editor_with(Raster::filled(3, 3, &[9]).unwrap());
        let err = editor.load("/definitely/missing/file.png").unwrap_err();

        assert!(matches!(err, EditorError::Load { .. }));
        assert_eq!(editor.current().unwrap().width(), 3);
    }

    #[test]
    fn test_load_resets_parameters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bmp");
        FileCodec::default()
            .save(&Raster::filled(4, 4, &[1, 2, 3]).unwrap(), &path)
            .unwrap();

        let mut editor = editor_with(Raster::filled(2, 2, &[50]).unwrap());
        editor.rotate(180).unwrap();
        editor.load(&path).unwrap();

        assert!(editor.params().unwrap().is_identity());
        assert!(!editor.state().unwrap().can_undo());
    }

    #[test]
    fn test_rotate_accumulates() {
        let mut editor = editor_with(Raster::filled(5, 2, &[10, 20, 30]).unwrap());
        editor.rotate(90).unwrap();
        editor.rotate(90).unwrap();
        editor.rotate(90).unwrap();
        assert_eq!(editor.params().unwrap().rotation, 270);
        editor.rotate(90).unwrap();
        assert_eq!(editor.params().unwrap().rotation, 0);
        assert_eq!(editor.current().unwrap(), editor.original().unwrap());
    }

    #[test]
    fn test_grayscale_histogram_switches_kind() {
        let mut editor = editor_with(Raster::filled(4, 3, &[200, 100, 50]).unwrap());
        assert!(matches!(editor.histogram().unwrap(), Histogram::Rgb { .. }));

        editor.convert_to_grayscale().unwrap();

        let hist = editor.histogram().unwrap();
        assert!(matches!(hist, Histogram::Grayscale { .. }));
        assert_eq!(hist.channel_totals(), vec![12]);
        assert!(matches!(
            editor.original_histogram().unwrap(),
            Histogram::Rgb { .. }
        ));
    }

    #[test]
    fn test_morphology_and_reset() {
        let mut samples = vec![0u8; 25];
        samples[12] = 255;
        let mut editor = editor_with(Raster::from_raw(5, 5, 1, samples).unwrap());

        editor
            .morphology(MorphologyOp::Dilate, StructuringElement::rect(3, 3).unwrap())
            .unwrap();
        let lit = editor.current().unwrap().as_array().iter().filter(|&&v| v == 255).count();
        assert_eq!(lit, 9);

        editor.reset().unwrap();
        assert_eq!(editor.current().unwrap(), editor.original().unwrap());
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_history_limit_from_settings() {
        let settings = EditorSettings {
            history_limit: 2,
            ..EditorSettings::default()
        };
        let mut editor = ImageEditor::new(settings).unwrap();
        editor.open_raster(Raster::filled(3, 3, &[90]).unwrap());

        for _ in 0..4 {
            editor.apply_edit(&StructuralEdit::Sharpen).unwrap();
        }
        assert!(editor.undo().unwrap());
        assert!(editor.undo().unwrap());
        assert!(!editor.undo().unwrap());
    }

    #[test]
    fn test_info_summary_reports_modified() {
        let mut editor = editor_with(Raster::filled(2, 2, &[0]).unwrap());
        assert_eq!(editor.info_summary().unwrap(), vec![("Modified", "No".to_string())]);
        editor.apply_edit(&StructuralEdit::Emboss).unwrap();
        assert_eq!(editor.info_summary().unwrap().last().unwrap().1, "Yes");
    }

    #[test]
    fn test_preview_respects_display_size() {
        let settings = EditorSettings {
            max_display_size: crate::config::DisplaySize {
                width: 20,
                height: 20,
            },
            ..EditorSettings::default()
        };
        let mut editor = ImageEditor::new(settings).unwrap();
        editor.open_raster(Raster::filled(80, 40, &[1, 2, 3]).unwrap());

        let png = editor.preview_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[test]
    fn test_close_drops_state() {
        let mut editor = editor_with(Raster::filled(2, 2, &[0]).unwrap());
        editor.close();
        assert!(!editor.is_loaded());
        assert!(matches!(editor.undo(), Err(EditorError::NoImage)));
    }
}
