//! Load/save boundary over the `image` crate.
//!
//! Decoded images become L, RGB or RGBA rasters; every other decoded layout
//! (16-bit, LumaA, float) is converted to 8-bit RGB. On save the format is
//! chosen from the lowercase file extension, falling back to PNG.

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{
    ColorType, DynamicImage, GenericImageView, GrayImage, ImageError, ImageFormat, RgbImage,
    RgbaImage,
};
use log::{info, warn};
use ndarray::{ErrorKind, ShapeError};
use serde::Serialize;

use crate::error::{EditorError, Result};
use crate::raster::{ColorModel, Raster};

/// Container formats the editor reports and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFileFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Gif,
    WebP,
    Other,
}

impl ImageFileFormat {
    /// Format implied by the file extension; unknown or missing is PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => ImageFileFormat::Jpeg,
            "bmp" => ImageFileFormat::Bmp,
            "tiff" | "tif" => ImageFileFormat::Tiff,
            "gif" => ImageFileFormat::Gif,
            "webp" => ImageFileFormat::WebP,
            _ => ImageFileFormat::Png,
        }
    }

    fn from_image_format(format: Option<ImageFormat>) -> Self {
        match format {
            Some(ImageFormat::Jpeg) => ImageFileFormat::Jpeg,
            Some(ImageFormat::Png) => ImageFileFormat::Png,
            Some(ImageFormat::Bmp) => ImageFileFormat::Bmp,
            Some(ImageFormat::Tiff) => ImageFileFormat::Tiff,
            Some(ImageFormat::Gif) => ImageFileFormat::Gif,
            Some(ImageFormat::WebP) => ImageFileFormat::WebP,
            _ => ImageFileFormat::Other,
        }
    }

    fn as_image_format(self) -> ImageFormat {
        match self {
            ImageFileFormat::Jpeg => ImageFormat::Jpeg,
            ImageFileFormat::Bmp => ImageFormat::Bmp,
            ImageFileFormat::Tiff => ImageFormat::Tiff,
            ImageFileFormat::Gif => ImageFormat::Gif,
            ImageFileFormat::WebP => ImageFormat::WebP,
            ImageFileFormat::Png | ImageFileFormat::Other => ImageFormat::Png,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            ImageFileFormat::Jpeg => "JPEG",
            ImageFileFormat::Png => "PNG",
            ImageFileFormat::Bmp => "BMP",
            ImageFileFormat::Tiff => "TIFF",
            ImageFileFormat::Gif => "GIF",
            ImageFileFormat::WebP => "WEBP",
            ImageFileFormat::Other => "OTHER",
        }
    }
}

impl fmt::Display for ImageFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// File-level facts about a loaded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub file_name: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    /// Bits per pixel of the decoded raster (8, 24 or 32).
    pub color_depth: u32,
    pub format: ImageFileFormat,
    pub color_model: ColorModel,
}

impl ImageInfo {
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / (1024.0 * 1024.0)
    }

    /// Label/value rows for an info panel.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("File name", self.file_name.clone()),
            (
                "File size",
                format!("{:.2} MB ({} bytes)", self.file_size_mb(), self.file_size),
            ),
            ("Resolution", format!("{} x {}", self.width, self.height)),
            ("Color depth", format!("{} bit", self.color_depth)),
            ("Format", self.format.to_string()),
            ("Color model", self.color_model.as_label().to_string()),
        ]
    }
}

/// Image file I/O capability consumed by the editor.
pub trait ImageCodec {
    fn load(&self, path: &Path) -> Result<(Raster, ImageInfo)>;
    fn save(&self, raster: &Raster, path: &Path) -> Result<()>;
}

/// [`ImageCodec`] reading and writing files with the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct FileCodec {
    jpeg_quality: u8,
}

impl Default for FileCodec {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl FileCodec {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn write_jpeg(&self, image: &DynamicImage, path: &Path) -> std::result::Result<(), ImageError> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = JpegEncoder::new_with_quality(writer, self.jpeg_quality);
        match image {
            DynamicImage::ImageLuma8(gray) => {
                encoder.encode(gray.as_raw(), gray.width(), gray.height(), ColorType::L8)
            }
            _ => {
                let rgb = image.to_rgb8();
                encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            }
        }
    }
}

fn load_error(path: &Path, source: ImageError) -> EditorError {
    EditorError::Load {
        path: path.to_path_buf(),
        source,
    }
}

fn save_error(path: &Path, source: ImageError) -> EditorError {
    EditorError::Save {
        path: path.to_path_buf(),
        source,
    }
}

/// Convert a decoded image into an L, RGB or RGBA raster.
pub(crate) fn from_dynamic(image: DynamicImage) -> Result<Raster> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let (channels, samples) = match image {
        DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        other => (3, other.to_rgb8().into_raw()),
    };
    Raster::from_raw(width, height, channels, samples)
}

/// Wrap a raster as a `DynamicImage` without changing its layout.
pub(crate) fn to_dynamic(raster: &Raster) -> Result<DynamicImage> {
    let (width, height) = (raster.width() as u32, raster.height() as u32);
    let samples = raster.to_raw();
    let image = match raster.color_model() {
        ColorModel::Grayscale => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        ColorModel::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        ColorModel::Rgba => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
    };
    image.ok_or_else(|| ShapeError::from_kind(ErrorKind::IncompatibleShape).into())
}

impl ImageCodec for FileCodec {
    fn load(&self, path: &Path) -> Result<(Raster, ImageInfo)> {
        let reader = image::io::Reader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| load_error(path, ImageError::IoError(e)))?;
        let format = ImageFileFormat::from_image_format(reader.format());
        let decoded = reader.decode().map_err(|e| load_error(path, e))?;

        let raster = from_dynamic(decoded)?;
        let (width, height) = (raster.width() as u32, raster.height() as u32);
        let color_model = raster.color_model();

        let info = ImageInfo {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_size: fs::metadata(path)?.len(),
            width,
            height,
            color_depth: color_model.color_depth(),
            format,
            color_model,
        };
        info!(
            "loaded {} ({}x{} {}, {})",
            path.display(),
            width,
            height,
            color_model.as_label(),
            format
        );
        Ok((raster, info))
    }

    fn save(&self, raster: &Raster, path: &Path) -> Result<()> {
        let format = ImageFileFormat::from_path(path);
        let image = to_dynamic(raster)?;

        let written = match format {
            ImageFileFormat::Jpeg => {
                if raster.color_model() == ColorModel::Rgba {
                    warn!("JPEG has no alpha channel; dropping alpha for {}", path.display());
                }
                self.write_jpeg(&image, path)
            }
            ImageFileFormat::Gif | ImageFileFormat::WebP => {
                DynamicImage::ImageRgba8(image.to_rgba8()).save_with_format(path, format.as_image_format())
            }
            _ => image.save_with_format(path, format.as_image_format()),
        };
        written.map_err(|e| save_error(path, e))?;

        info!("saved {} as {}", path.display(), format);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient(channels: usize) -> Raster {
        let samples = (0..6 * 4 * channels).map(|i| (i * 7 % 256) as u8).collect();
        Raster::from_raw(6, 4, channels, samples).unwrap()
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(ImageFileFormat::from_path(Path::new("a.JPG")), ImageFileFormat::Jpeg);
        assert_eq!(ImageFileFormat::from_path(Path::new("a.jpeg")), ImageFileFormat::Jpeg);
        assert_eq!(ImageFileFormat::from_path(Path::new("a.tif")), ImageFileFormat::Tiff);
        assert_eq!(ImageFileFormat::from_path(Path::new("a.webp")), ImageFileFormat::WebP);
        assert_eq!(ImageFileFormat::from_path(Path::new("a.xyz")), ImageFileFormat::Png);
        assert_eq!(ImageFileFormat::from_path(Path::new("noext")), ImageFileFormat::Png);
    }

    #[test]
    fn test_png_keeps_every_layout() {
        let dir = tempdir().unwrap();
        let codec = FileCodec::default();
        for channels in [1, 3, 4] {
            let path = dir.path().join(format!("img{channels}.png"));
            let raster = gradient(channels);
            codec.save(&raster, &path).unwrap();

            let (loaded, info) = codec.load(&path).unwrap();
            assert_eq!(loaded, raster);
            assert_eq!(info.format, ImageFileFormat::Png);
            assert_eq!(info.color_depth, 8 * channels as u32);
            assert_eq!(info.resolution(), (6, 4));
            assert!(info.file_size > 0);
        }
    }

    #[test]
    fn test_unknown_extension_written_as_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.data");
        let codec = FileCodec::default();
        codec.save(&gradient(3), &path).unwrap();

        let (_, info) = codec.load(&path).unwrap();
        assert_eq!(info.format, ImageFileFormat::Png);
        assert_eq!(info.file_name, "out.data");
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let codec = FileCodec::new(95);
        codec.save(&gradient(4), &path).unwrap();

        let (loaded, info) = codec.load(&path).unwrap();
        assert_eq!(loaded.channels(), 3);
        assert_eq!(info.format, ImageFileFormat::Jpeg);
        assert_eq!(info.color_model, ColorModel::Rgb);
    }

    #[test]
    fn test_bmp_round_trip_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img.bmp");
        let codec = FileCodec::default();
        let raster = gradient(3);
        codec.save(&raster, &path).unwrap();

        let (loaded, _) = codec.load(&path).unwrap();
        assert_eq!(loaded, raster);
    }

    #[test]
    fn test_tiff_keeps_every_layout() {
        let dir = tempdir().unwrap();
        let codec = FileCodec::default();
        for channels in [1, 3, 4] {
            let path = dir.path().join(format!("img{channels}.tiff"));
            let raster = gradient(channels);
            codec.save(&raster, &path).unwrap();

            let (loaded, info) = codec.load(&path).unwrap();
            assert_eq!(loaded, raster);
            assert_eq!(info.format, ImageFileFormat::Tiff);
        }
    }

    #[test]
    fn test_gif_and_webp_are_written_as_rgba() {
        let dir = tempdir().unwrap();
        let codec = FileCodec::default();
        for (ext, format) in [("gif", ImageFileFormat::Gif), ("webp", ImageFileFormat::WebP)] {
            for channels in [1, 3, 4] {
                let path = dir.path().join(format!("img{channels}.{ext}"));
                codec.save(&gradient(channels), &path).unwrap();

                let (loaded, info) = codec.load(&path).unwrap();
                assert_eq!(loaded.channels(), 4, "{ext} from {channels} channels");
                assert_eq!((loaded.width(), loaded.height()), (6, 4));
                assert_eq!(info.format, format);
                assert_eq!(info.color_model, ColorModel::Rgba);
            }
        }
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempdir().unwrap();
        let err = FileCodec::default()
            .load(&dir.path().join("missing.png"))
            .unwrap_err();
        assert!(matches!(err, EditorError::Load { .. }));
    }

    #[test]
    fn test_garbage_file_is_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(
            FileCodec::default().load(&path),
            Err(EditorError::Load { .. })
        ));
    }

    #[test]
    fn test_unwritable_path_is_save_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.jpg");
        assert!(matches!(
            FileCodec::default().save(&gradient(3), &path),
            Err(EditorError::Save { .. })
        ));
    }

    #[test]
    fn test_info_summary() {
        let info = ImageInfo {
            file_name: "a.png".into(),
            file_size: 2 * 1024 * 1024,
            width: 10,
            height: 20,
            color_depth: 24,
            format: ImageFileFormat::Png,
            color_model: ColorModel::Rgb,
        };
        let summary = info.summary();
        assert_eq!(summary[1].1, "2.00 MB (2097152 bytes)");
        assert_eq!(summary[2].1, "10 x 20");
    }
}
