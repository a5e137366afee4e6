//! Static asset copy.
//!
//! The assets directory (stylesheets, scripts, fonts, slideshow images) is
//! copied byte-for-byte to `<output>/assets`, preserving structure. Nothing
//! is transformed: asset files are opaque to the build.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Output directory (relative to the output root) for copied assets.
pub const ASSETS_OUTPUT_DIR: &str = "assets";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to copy {} → {}: {source}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result of the asset stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCopy {
    Copied { files: usize },
    /// The source assets directory does not exist.
    Missing,
}

/// Copy `src` recursively into `dst`. A missing `src` is not an error.
pub fn copy_assets(src: &Path, dst: &Path) -> Result<AssetCopy, AssetError> {
    if !src.is_dir() {
        return Ok(AssetCopy::Missing);
    }
    let mut files = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        // WalkDir yields paths rooted at `src`
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let dest = dst.join(relative);
        let io_err = |source| AssetError::Io {
            from: entry.path().to_path_buf(),
            to: dest.clone(),
            source,
        };
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(io_err)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            fs::copy(entry.path(), &dest).map_err(io_err)?;
            files += 1;
        }
    }
    Ok(AssetCopy::Copied { files })
}
