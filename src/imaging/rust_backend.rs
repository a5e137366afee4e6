//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate, format sniffed from content |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder::new_lossless` |
//!
//! Outputs are written to a temporary sibling and renamed into place, so
//! encoding over the source file never leaves a truncated image behind.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, OutputFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is guessed from the bytes, not the extension: an optimized
/// slide keeps its original `.png` name but holds JPEG data.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    output.with_file_name(name)
}

/// Encode `img` to `path` in `format`.
fn save_image(img: &DynamicImage, path: &Path, format: OutputFormat) -> Result<(), BackendError> {
    let tmp = temp_path(path);
    match write_encoded(img, format, &tmp, path) {
        Ok(()) => fs::rename(&tmp, path).map_err(BackendError::Io),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Encode into `tmp` and flush it to disk. A buffered write error is
/// returned here rather than lost when the writer drops.
fn write_encoded(
    img: &DynamicImage,
    format: OutputFormat,
    tmp: &Path,
    output: &Path,
) -> Result<(), BackendError> {
    let file = fs::File::create(tmp).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);
    let result = match format {
        OutputFormat::Jpeg(quality) => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut writer,
                quality.value() as u8,
            );
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut writer);
            rgba.write_with_encoder(encoder)
        }
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("{format} encode failed for {}: {e}", output.display()))
    })?;
    let file = writer
        .into_inner()
        .map_err(|e| BackendError::Io(e.into_error()))?;
    file.sync_all().map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn encode(&self, params: &EncodeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let img = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(&img, &params.output, params.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create a small valid PNG file with an alpha channel.
    fn create_test_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_fn(width, height, |x, _| {
            image::Rgba([200, (x % 256) as u8, 40, 128])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn encode_resized_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("small.jpg");
        RustBackend::new()
            .encode(&EncodeParams {
                source,
                output: output.clone(),
                width: 200,
                height: 150,
                format: OutputFormat::Jpeg(Quality::new(80)),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (200, 150));
        assert!(!temp_path(&output).exists());
    }

    #[test]
    fn encode_lossless_webp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 64, 48);

        let output = tmp.path().join("source.webp");
        RustBackend::new()
            .encode(&EncodeParams {
                source,
                output: output.clone(),
                width: 64,
                height: 48,
                format: OutputFormat::WebP,
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (64, 48));
    }

    #[test]
    fn encode_in_place_over_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("slide.jpg");
        create_test_jpeg(&source, 300, 300);

        RustBackend::new()
            .encode(&EncodeParams {
                source: source.clone(),
                output: source.clone(),
                width: 100,
                height: 100,
                format: OutputFormat::Jpeg(Quality::new(80)),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&source).unwrap(), (100, 100));
    }

    #[test]
    fn png_source_rewritten_as_jpeg_is_still_decodable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("slide.png");
        create_test_png(&source, 80, 40);
        let backend = RustBackend::new();

        backend
            .encode(&EncodeParams {
                source: source.clone(),
                output: source.clone(),
                width: 40,
                height: 20,
                format: OutputFormat::Jpeg(Quality::new(80)),
            })
            .unwrap();

        let dims = backend.identify(&source).unwrap();
        assert_eq!((dims.width, dims.height), (40, 20));
        backend
            .encode(&EncodeParams {
                source: source.clone(),
                output: tmp.path().join("slide.webp"),
                width: 40,
                height: 20,
                format: OutputFormat::WebP,
            })
            .unwrap();
    }

    #[test]
    fn failed_write_leaves_existing_output_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("slide.jpg");
        create_test_jpeg(&source, 40, 40);
        // The temp file cannot be created where a directory already sits.
        std::fs::create_dir(temp_path(&source)).unwrap();

        let result = RustBackend::new().encode(&EncodeParams {
            source: source.clone(),
            output: source.clone(),
            width: 20,
            height: 20,
            format: OutputFormat::Jpeg(Quality::new(80)),
        });
        assert!(matches!(result, Err(BackendError::Io(_))));
        assert_eq!(image::image_dimensions(&source).unwrap(), (40, 40));
    }

    #[test]
    fn encoded_output_is_complete_after_rename() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("slide.png");
        create_test_png(&source, 120, 90);
        let output = tmp.path().join("slide-hd.jpg");

        RustBackend::new()
            .encode(&EncodeParams {
                source,
                output: output.clone(),
                width: 120,
                height: 90,
                format: OutputFormat::Jpeg(Quality::new(90)),
            })
            .unwrap();

        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 90));
        assert!(!temp_path(&output).exists());
    }

    #[test]
    fn encode_undecodable_source_errors_without_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();
        let output = tmp.path().join("broken-hd.jpg");

        let result = RustBackend::new().encode(&EncodeParams {
            source,
            output: output.clone(),
            width: 10,
            height: 10,
            format: OutputFormat::Jpeg(Quality::new(90)),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
    }
}
