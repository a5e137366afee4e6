//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take the
//! optimizer settings, compute parameters, and call the backend.
//!
//! Optimizing one slide `<stem>.<ext>` produces, in order:
//!
//! | Output | Source | Size | Format |
//! |---|---|---|---|
//! | `<stem>-hd.jpg` | original | full | JPEG, HD quality |
//! | `<stem>-hd.webp` | original | full | WebP |
//! | `<stem>.<ext>` (in place) | original | fit inside max bounds | JPEG |
//! | `<stem>.webp` | optimized | as optimized | WebP |
//!
//! The HD JPEG doubles as the "already optimized" marker: a slide that has
//! one is skipped.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within;
use super::params::{EncodeParams, OutputFormat, Quality};
use crate::config::ImagesConfig;
use crate::naming;
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: Quality,
    pub hd_jpeg_quality: Quality,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self::from(&ImagesConfig::default())
    }
}

impl From<&ImagesConfig> for OptimizeSettings {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            jpeg_quality: Quality::new(config.jpeg_quality),
            hd_jpeg_quality: Quality::new(config.hd_jpeg_quality),
        }
    }
}

/// Paths of every file produced for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPaths {
    pub hd_jpeg: PathBuf,
    pub hd_webp: PathBuf,
    /// The source file itself; overwritten with the optimized JPEG.
    pub optimized: PathBuf,
    pub webp: PathBuf,
}

impl VariantPaths {
    pub fn for_source(source: &Path) -> Self {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = naming::stem(&file_name);
        Self {
            hd_jpeg: source.with_file_name(format!("{stem}-hd.jpg")),
            hd_webp: source.with_file_name(format!("{stem}-hd.webp")),
            optimized: source.to_path_buf(),
            webp: source.with_file_name(format!("{stem}.webp")),
        }
    }
}

/// Plan the four encodes for a slide without executing them.
pub fn plan_variants(
    source: &Path,
    original: (u32, u32),
    settings: &OptimizeSettings,
) -> Vec<EncodeParams> {
    let paths = VariantPaths::for_source(source);
    let (width, height) = original;
    let (opt_w, opt_h) = fit_within(original, (settings.max_width, settings.max_height));
    let encode = |source: &Path, output: PathBuf, width, height, format| EncodeParams {
        source: source.to_path_buf(),
        output,
        width,
        height,
        format,
    };

    vec![
        encode(
            source,
            paths.hd_jpeg,
            width,
            height,
            OutputFormat::Jpeg(settings.hd_jpeg_quality),
        ),
        encode(source, paths.hd_webp, width, height, OutputFormat::WebP),
        encode(
            source,
            paths.optimized.clone(),
            opt_w,
            opt_h,
            OutputFormat::Jpeg(settings.jpeg_quality),
        ),
        // From the optimized file, already at its final size
        encode(&paths.optimized, paths.webp, opt_w, opt_h, OutputFormat::WebP),
    ]
}

/// What happened to one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Processed {
        original_bytes: u64,
        optimized_bytes: u64,
        webp_bytes: u64,
        hd_bytes: u64,
        dimensions: (u32, u32),
    },
    /// An HD companion already exists.
    Skipped { bytes: u64 },
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Optimize one slide in place and write its companions.
pub fn optimize_image(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &OptimizeSettings,
) -> Result<ImageOutcome> {
    let original_bytes = file_size(source)?;
    let paths = VariantPaths::for_source(source);
    if paths.hd_jpeg.exists() {
        return Ok(ImageOutcome::Skipped {
            bytes: original_bytes,
        });
    }

    let original = get_dimensions(backend, source)?;
    let plan = plan_variants(source, original, settings);
    for params in &plan {
        backend.encode(params)?;
    }

    Ok(ImageOutcome::Processed {
        original_bytes,
        optimized_bytes: file_size(&paths.optimized)?,
        webp_bytes: file_size(&paths.webp)?,
        hd_bytes: file_size(&paths.hd_jpeg)?,
        dimensions: (plan[2].width, plan[2].height),
    })
}
