//! Page emission: the two-stage transform from source HTML to output HTML.
//!
//! Every page goes through the same fixed pipeline:
//!
//! ```text
//! SourcePage ──expand()──▶ ExpandedPage ──rewrite()──▶ RewrittenPage ──write()──▶ disk
//!             slideshow tokens          root-absolute → relative
//! ```
//!
//! Rewriting has to see token-free markup so the asset URLs inside generated
//! slide fragments are relativized too. The ordering is carried by the types:
//! only an [`ExpandedPage`] can be rewritten, and only a [`RewrittenPage`]
//! can be written.
//!
//! ## Placement
//!
//! The configured entry page lands at the output root (depth 0); every other
//! page in the pages directory lands under `pages/` (depth 1). Subdirectories
//! of the pages directory are not scanned.

use crate::rewrite::{self, OutputDepth};
use crate::slideshow::{self, SlideshowError, SlideshowSource};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output directory (relative to the output root) for depth-1 pages.
pub const PAGES_OUTPUT_DIR: &str = "pages";

#[derive(Error, Debug)]
pub enum PageError {
    #[error("pages directory not found: {}", .0.display())]
    MissingPagesDir(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Slideshow(#[from] SlideshowError),
}

/// A page as authored, before any transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// Where the page came from (for reporting).
    pub source: PathBuf,
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub depth: OutputDepth,
    text: String,
}

impl SourcePage {
    pub fn new(source: PathBuf, output: PathBuf, depth: OutputDepth, text: String) -> Self {
        Self {
            source,
            output,
            depth,
            text,
        }
    }

    /// Read a hand-written page and place it according to `entry_page`.
    pub fn read(path: &Path, entry_page: &str) -> Result<Self, PageError> {
        let text = fs::read_to_string(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let (output, depth) = placement(&file_name, entry_page);
        Ok(Self::new(path.to_path_buf(), output, depth, text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Stage 1: replace slideshow tokens.
    pub fn expand(self, slideshows: &SlideshowSource) -> Result<ExpandedPage, PageError> {
        let expansion = slideshow::expand(&self.text, slideshows)?;
        Ok(ExpandedPage {
            source: self.source,
            output: self.output,
            depth: self.depth,
            text: expansion.text,
            slideshows: expansion.slideshows,
        })
    }
}

/// Output location and depth for a page file name.
pub fn placement(file_name: &str, entry_page: &str) -> (PathBuf, OutputDepth) {
    if file_name == entry_page {
        (PathBuf::from(file_name), OutputDepth::Root)
    } else {
        (
            Path::new(PAGES_OUTPUT_DIR).join(file_name),
            OutputDepth::Page,
        )
    }
}

/// A page whose slideshow tokens have been expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPage {
    source: PathBuf,
    output: PathBuf,
    depth: OutputDepth,
    text: String,
    slideshows: Vec<(String, usize)>,
}

impl ExpandedPage {
    /// Stage 2: relativize root-absolute references for the page's depth.
    pub fn rewrite(self) -> RewrittenPage {
        RewrittenPage {
            text: rewrite::rewrite(&self.text, self.depth),
            info: EmittedPage {
                source: self.source,
                output: self.output,
                depth: self.depth,
                slideshows: self.slideshows,
            },
        }
    }
}

/// Final page text, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenPage {
    pub text: String,
    pub info: EmittedPage,
}

impl RewrittenPage {
    /// Write under `output_root`, creating parent directories.
    pub fn write(self, output_root: &Path) -> Result<EmittedPage, PageError> {
        let dest = output_root.join(&self.info.output);
        let write_err = |source| PageError::Write {
            path: dest.clone(),
            source,
        };
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&dest, self.text).map_err(write_err)?;
        Ok(self.info)
    }
}

/// What was emitted for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedPage {
    pub source: PathBuf,
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub depth: OutputDepth,
    /// Slideshows expanded into the page, with slide counts.
    pub slideshows: Vec<(String, usize)>,
}

/// List the `.html` files directly inside `pages_dir`, sorted by name.
///
/// A missing directory is fatal: there is no site without pages.
pub fn discover(pages_dir: &Path) -> Result<Vec<PathBuf>, PageError> {
    if !pages_dir.is_dir() {
        return Err(PageError::MissingPagesDir(pages_dir.to_path_buf()));
    }
    let read_err = |source| PageError::Read {
        path: pages_dir.to_path_buf(),
        source,
    };
    let mut pages = Vec::new();
    for entry in fs::read_dir(pages_dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_html = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("html"));
        if is_html && path.is_file() {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

/// Read, expand and rewrite every page without touching the output tree.
pub fn render_all(
    pages_dir: &Path,
    entry_page: &str,
    slideshows: &SlideshowSource,
) -> Result<Vec<RewrittenPage>, PageError> {
    discover(pages_dir)?
        .iter()
        .map(|path| Ok(SourcePage::read(path, entry_page)?.expand(slideshows)?.rewrite()))
        .collect()
}

/// Render every page, then write them all. Nothing is written if any page
/// fails to render.
pub fn emit_all(
    pages_dir: &Path,
    entry_page: &str,
    slideshows: &SlideshowSource,
    output_root: &Path,
) -> Result<Vec<EmittedPage>, PageError> {
    render_all(pages_dir, entry_page, slideshows)?
        .into_iter()
        .map(|page| page.write(output_root))
        .collect()
}
