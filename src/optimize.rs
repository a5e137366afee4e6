//! Slideshow image optimizer.
//!
//! Walks every slideshow directory under the slideshows root, and for each
//! base image writes the HD and WebP companions the slideshow markup links
//! to (see [`crate::imaging::operations`] for the variant table).
//!
//! Images are processed in parallel on a rayon pool sized by
//! `processing.max_processes`. A failing image is recorded in the report and
//! does not stop the others.

use crate::config::{ProcessingConfig, effective_threads};
use crate::imaging::{ImageBackend, ImageOutcome, OptimizeSettings, optimize_image};
use crate::naming;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResult {
    Done(ImageOutcome),
    Failed { original_bytes: u64, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub file_name: String,
    pub result: ImageResult,
}

/// All images of one slideshow directory, in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    pub name: String,
    pub images: Vec<ImageReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub directories: Vec<DirectoryReport>,
}

impl OptimizeReport {
    fn images(&self) -> impl Iterator<Item = &ImageReport> {
        self.directories.iter().flat_map(|d| d.images.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.images().next().is_none()
    }

    pub fn processed(&self) -> usize {
        self.images()
            .filter(|i| matches!(i.result, ImageResult::Done(ImageOutcome::Processed { .. })))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.images()
            .filter(|i| matches!(i.result, ImageResult::Done(ImageOutcome::Skipped { .. })))
            .count()
    }

    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.images()
            .filter_map(|i| match &i.result {
                ImageResult::Failed { message, .. } => Some((i.file_name.as_str(), message.as_str())),
                ImageResult::Done(_) => None,
            })
            .collect()
    }

    /// Total size of the inputs before optimization.
    pub fn original_bytes(&self) -> u64 {
        self.images()
            .map(|i| match &i.result {
                ImageResult::Done(ImageOutcome::Processed { original_bytes, .. }) => *original_bytes,
                ImageResult::Done(ImageOutcome::Skipped { bytes }) => *bytes,
                ImageResult::Failed { original_bytes, .. } => *original_bytes,
            })
            .sum()
    }

    /// Total size served to browsers afterwards: the smaller of the optimized
    /// JPEG and WebP for processed images, the unchanged size otherwise.
    pub fn optimized_bytes(&self) -> u64 {
        self.images()
            .map(|i| match &i.result {
                ImageResult::Done(ImageOutcome::Processed {
                    optimized_bytes,
                    webp_bytes,
                    ..
                }) => (*optimized_bytes).min(*webp_bytes),
                ImageResult::Done(ImageOutcome::Skipped { bytes }) => *bytes,
                ImageResult::Failed { original_bytes, .. } => *original_bytes,
            })
            .sum()
    }

    /// Whole-run savings in percent, rounded. `None` when nothing was read.
    pub fn savings_percent(&self) -> Option<i64> {
        savings_percent(self.original_bytes(), self.optimized_bytes())
    }
}

/// `round((1 - after / before) * 100)`.
pub fn savings_percent(before: u64, after: u64) -> Option<i64> {
    (before > 0).then(|| ((1.0 - after as f64 / before as f64) * 100.0).round() as i64)
}

/// Base images of every slideshow directory, grouped by directory.
///
/// A missing root yields nothing.
pub fn find_images(root: &Path) -> Result<Vec<(String, Vec<PathBuf>)>, OptimizeError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = list(root)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();
    dirs.sort();

    let mut found = Vec::new();
    for dir in dirs {
        let mut images: Vec<PathBuf> = list(&dir)?
            .into_iter()
            .filter(|p| p.is_file() && naming::is_base_image(&file_name(p)))
            .collect();
        if images.is_empty() {
            continue;
        }
        images.sort_by(|a, b| naming::natural_cmp(&file_name(a), &file_name(b)));
        found.push((file_name(&dir), images));
    }
    Ok(found)
}

fn list(dir: &Path) -> Result<Vec<PathBuf>, OptimizeError> {
    let io_err = |source| OptimizeError::Io {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(io_err))
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn optimize_one(backend: &impl ImageBackend, path: &Path, settings: &OptimizeSettings) -> ImageReport {
    let result = match optimize_image(backend, path, settings) {
        Ok(outcome) => ImageResult::Done(outcome),
        Err(e) => ImageResult::Failed {
            original_bytes: fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            message: e.to_string(),
        },
    };
    ImageReport {
        file_name: file_name(path),
        result,
    }
}

/// Optimize every slideshow image under `root`.
pub fn optimize(
    root: &Path,
    settings: &OptimizeSettings,
    processing: &ProcessingConfig,
    backend: &impl ImageBackend,
) -> Result<OptimizeReport, OptimizeError> {
    let found = find_images(root)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(effective_threads(processing))
        .build()?;

    let directories = pool.install(|| {
        found
            .into_iter()
            .map(|(name, images)| DirectoryReport {
                name,
                images: images
                    .par_iter()
                    .map(|path| optimize_one(backend, path, settings))
                    .collect(),
            })
            .collect()
    });
    Ok(OptimizeReport { directories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::write_file;
    use tempfile::TempDir;

    fn dims(n: usize) -> Vec<Dimensions> {
        vec![
            Dimensions {
                width: 4000,
                height: 3000
            };
            n
        ]
    }

    fn single_thread() -> ProcessingConfig {
        ProcessingConfig {
            max_processes: Some(1),
        }
    }

    #[test]
    fn find_images_groups_and_filters() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "hero/img10.jpg", "x");
        write_file(tmp.path(), "hero/img2.PNG", "x");
        write_file(tmp.path(), "hero/img2-hd.jpg", "x");
        write_file(tmp.path(), "hero/img2.webp", "x");
        write_file(tmp.path(), "hero/hero-placeholder.jpg", "x");
        write_file(tmp.path(), "empty/readme.txt", "x");
        write_file(tmp.path(), "about/a.jpeg", "x");
        write_file(tmp.path(), "loose.jpg", "x");

        let found = find_images(tmp.path()).unwrap();
        let summary: Vec<(String, Vec<String>)> = found
            .iter()
            .map(|(dir, images)| (dir.clone(), images.iter().map(|p| file_name(p)).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("about".to_string(), vec!["a.jpeg".to_string()]),
                (
                    "hero".to_string(),
                    vec!["img2.PNG".to_string(), "img10.jpg".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn find_images_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(find_images(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn optimize_processes_and_skips() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "hero/1.jpg", &"x".repeat(2000));
        write_file(tmp.path(), "hero/2.jpg", &"x".repeat(1000));
        write_file(tmp.path(), "hero/2-hd.jpg", "hd");
        let backend = MockBackend::with_dimensions(dims(1));

        let report = optimize(
            tmp.path(),
            &OptimizeSettings::default(),
            &single_thread(),
            &backend,
        )
        .unwrap();

        assert_eq!(report.processed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(report.errors().is_empty());
        assert_eq!(report.original_bytes(), 3000);
        // Mock output for 1.jpg is "1440x1080" (9 bytes) for both JPEG and WebP
        assert_eq!(report.optimized_bytes(), 1009);
        assert_eq!(report.savings_percent(), Some(66));
        assert!(tmp.path().join("hero/1-hd.jpg").exists());
        assert!(tmp.path().join("hero/1.webp").exists());
    }

    #[test]
    fn optimize_records_failures_and_continues() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a/1.jpg", "one");
        write_file(tmp.path(), "b/2.jpg", "two");
        // Only one set of dimensions: the second identify fails
        let backend = MockBackend::with_dimensions(dims(1));

        let report = optimize(
            tmp.path(),
            &OptimizeSettings::default(),
            &single_thread(),
            &backend,
        )
        .unwrap();

        assert_eq!(report.processed(), 1);
        let errors = report.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "2.jpg");
        assert!(errors[0].1.contains("No mock dimensions"));
    }

    #[test]
    fn empty_report() {
        let report = OptimizeReport::default();
        assert!(report.is_empty());
        assert_eq!(report.savings_percent(), None);
    }

    #[test]
    fn savings_rounding() {
        assert_eq!(savings_percent(1000, 250), Some(75));
        assert_eq!(savings_percent(3, 2), Some(33));
        assert_eq!(savings_percent(100, 120), Some(-20));
        assert_eq!(savings_percent(0, 0), None);
    }
}
