//! The build pipeline.
//!
//! ```text
//! lock ─▶ clean output ─▶ copy assets ─▶ emit pages ─▶ category pages ─▶ report ─▶ unlock
//! ```
//!
//! Every step runs to completion before the next starts. The first fatal
//! error aborts the build; missing optional inputs (assets directory,
//! catalog, category template) are recorded in the [`BuildSummary`] instead.
//!
//! The output directory is owned by one build at a time. A lock file
//! `<output>.lock` next to it is created exclusively on entry and removed on
//! exit, so a second build against the same output fails with
//! [`BuildError::Locked`] instead of racing the first one's clean step.

use crate::assets::{self, ASSETS_OUTPUT_DIR, AssetCopy, AssetError};
use crate::catalog::{self, CatalogError, CatalogOutcome};
use crate::config::{BuildConfig, ConfigError};
use crate::pages::{self, EmittedPage, PageError};
use crate::report::{self, BuildReport, ReportError};
use crate::slideshow::{SlideshowError, SlideshowSource};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{} is locked by another build (remove {} if no build is running)", output.display(), lock.display())]
    Locked { output: PathBuf, lock: PathBuf },
    #[error("invalid output directory {}: {reason}", path.display())]
    InvalidOutput { path: PathBuf, reason: String },
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Slideshow(#[from] SlideshowError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Everything a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub assets: AssetCopy,
    pub pages: Vec<EmittedPage>,
    pub categories: Vec<EmittedPage>,
    /// Why category generation was skipped, if it was.
    pub catalog_skipped: Option<String>,
    pub report: BuildReport,
}

/// What a build would produce, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub assets_present: bool,
    pub pages: Vec<EmittedPage>,
    pub categories: Vec<EmittedPage>,
    pub catalog_skipped: Option<String>,
}

/// Exclusive claim on an output directory, released on drop.
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
}

impl BuildLock {
    pub fn acquire(output: &Path) -> Result<Self, BuildError> {
        let path = lock_path(output)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BuildError::Locked {
                    output: output.to_path_buf(),
                    lock: path,
                });
            }
            Err(source) => return Err(BuildError::Io { path, source }),
        };
        // Lock contents are informational only.
        let _ = writeln!(file, "{}", std::process::id());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// `<output>.lock`, a sibling of the output directory.
pub fn lock_path(output: &Path) -> Result<PathBuf, BuildError> {
    let name = output
        .file_name()
        .ok_or_else(|| BuildError::InvalidOutput {
            path: output.to_path_buf(),
            reason: "must name a directory".into(),
        })?;
    let mut lock_name = name.to_os_string();
    lock_name.push(".lock");
    Ok(output.with_file_name(lock_name))
}

/// `path` made absolute with symlinks resolved. The longest existing
/// prefix is canonicalized and any not-yet-created tail is appended as is.
fn resolve_path(path: &Path) -> Result<PathBuf, BuildError> {
    let absolute = std::path::absolute(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return Ok(tail
                .iter()
                .rev()
                .fold(canonical, |resolved, name| resolved.join(name)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

/// The output tree is wiped on every build and filled from the inputs, so
/// it must not hold any input and must not sit inside a copied or scanned
/// directory.
fn guard_output(config: &BuildConfig) -> Result<(), BuildError> {
    let output = resolve_path(&config.output)?;
    let reject = |reason: String| -> Result<(), BuildError> {
        Err(BuildError::InvalidOutput {
            path: config.output.clone(),
            reason,
        })
    };

    let inputs = [
        ("source directory", config.source.clone()),
        ("assets directory", config.assets_dir()),
        ("pages directory", config.pages_dir()),
        ("slideshows directory", config.slideshows_dir()),
        ("catalog", config.catalog_path()),
        ("category template", config.category_template_path()),
    ];
    for (what, input) in &inputs {
        if resolve_path(input)?.starts_with(&output) {
            return reject(format!("contains the {what}"));
        }
    }

    for (what, dir) in &inputs[1..4] {
        if output.starts_with(resolve_path(dir)?) {
            return reject(format!("is inside the {what}"));
        }
    }
    Ok(())
}

fn clean_output(output: &Path) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Io {
        path: output.to_path_buf(),
        source,
    };
    if output.exists() {
        fs::remove_dir_all(output).map_err(io_err)?;
    }
    fs::create_dir_all(output).map_err(io_err)
}

fn slideshow_source(config: &BuildConfig) -> SlideshowSource {
    SlideshowSource::new(
        config.slideshows_dir(),
        config.site.paths.slideshow_url_base(),
    )
}

/// Run the full pipeline for `config`.
pub fn build(config: &BuildConfig) -> Result<BuildSummary, BuildError> {
    guard_output(config)?;
    let _lock = BuildLock::acquire(&config.output)?;

    clean_output(&config.output)?;
    let assets = assets::copy_assets(
        &config.assets_dir(),
        &config.output.join(ASSETS_OUTPUT_DIR),
    )?;

    let slideshows = slideshow_source(config);
    let pages = pages::emit_all(
        &config.pages_dir(),
        &config.site.entry_page,
        &slideshows,
        &config.output,
    )?;

    let (categories, catalog_skipped) = match catalog::generate(
        &config.catalog_path(),
        &config.category_template_path(),
        &slideshows,
        &config.output,
    )? {
        CatalogOutcome::Generated(pages) => (pages, None),
        CatalogOutcome::Skipped(reason) => (Vec::new(), Some(reason)),
    };

    let report = report::collect(&config.output)?;
    Ok(BuildSummary {
        assets,
        pages,
        categories,
        catalog_skipped,
        report,
    })
}

/// Validate the source tree and plan the build without writing.
pub fn check(config: &BuildConfig) -> Result<CheckSummary, BuildError> {
    let slideshows = slideshow_source(config);
    let pages: Vec<EmittedPage> =
        pages::render_all(&config.pages_dir(), &config.site.entry_page, &slideshows)?
            .into_iter()
            .map(|page| page.info)
            .collect();

    let catalog_path = config.catalog_path();
    let template_path = config.category_template_path();
    let (categories, catalog_skipped) = match catalog::skip_reason(&catalog_path, &template_path)
    {
        Some(reason) => (Vec::new(), Some(reason)),
        None => {
            let rendered: Vec<EmittedPage> =
                catalog::render_all(&catalog_path, &template_path, &slideshows)?
                    .into_iter()
                    .map(|page| page.info)
                    .collect();
            (rendered, None)
        }
    };

    Ok(CheckSummary {
        assets_present: config.assets_dir().is_dir(),
        pages,
        categories,
        catalog_skipped,
    })
}
