//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` that lives in
//! the site source root. Stock defaults describe the standard layout, so a
//! site that follows it needs no config file at all.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! entry_page = "index.html"   # Page written to the output root
//!
//! [paths]
//! assets = "assets"                       # Copied verbatim to <output>/assets
//! pages = "pages"                         # Hand-written HTML pages
//! slideshows = "assets/images/slideshows" # One directory per slideshow
//! catalog = "data/catalog.json"           # Optional product catalog
//! category_template = "templates/category.html"
//!
//! [images]
//! max_width = 1920          # Optimized slide bounds
//! max_height = 1080
//! jpeg_quality = 80         # Optimized JPEG quality (1-100)
//! hd_jpeg_quality = 90      # HD companion JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel optimizer workers (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file inside the source root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Filename (inside the pages directory) of the page emitted at the output root.
    pub entry_page: String,
    /// Source layout, relative to the source root.
    pub paths: PathsConfig,
    /// Slideshow image optimization settings.
    pub images: ImagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            entry_page: "index.html".to_string(),
            paths: PathsConfig::default(),
            images: ImagesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, quality) in [
            ("images.jpeg_quality", self.images.jpeg_quality),
            ("images.hd_jpeg_quality", self.images.hd_jpeg_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if self.images.max_width == 0 || self.images.max_height == 0 {
            return Err(ConfigError::Validation(
                "images.max_width and images.max_height must be non-zero".into(),
            ));
        }
        if self.entry_page.contains(['/', '\\']) || !self.entry_page.ends_with(".html") {
            return Err(ConfigError::Validation(
                "entry_page must be a bare .html filename".into(),
            ));
        }
        for (key, value) in [
            ("paths.assets", &self.paths.assets),
            ("paths.pages", &self.paths.pages),
            ("paths.slideshows", &self.paths.slideshows),
            ("paths.catalog", &self.paths.catalog),
            ("paths.category_template", &self.paths.category_template),
        ] {
            if !is_plain_relative(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a relative path without '..'"
                )));
            }
        }
        // Slide URLs are emitted root-absolute under the assets prefix so the
        // path rewriter can relativize them like any other asset.
        if Path::new(&self.paths.assets) != Path::new("assets")
            || !Path::new(&self.paths.slideshows).starts_with(&self.paths.assets)
        {
            return Err(ConfigError::Validation(
                "paths.assets must be \"assets\" and paths.slideshows must live inside it".into(),
            ));
        }
        Ok(())
    }
}

fn is_plain_relative(value: &str) -> bool {
    let path = Path::new(value);
    !value.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Source layout, every path relative to the source root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub assets: String,
    pub pages: String,
    pub slideshows: String,
    pub catalog: String,
    pub category_template: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets: "assets".to_string(),
            pages: "pages".to_string(),
            slideshows: "assets/images/slideshows".to_string(),
            catalog: "data/catalog.json".to_string(),
            category_template: "templates/category.html".to_string(),
        }
    }
}

impl PathsConfig {
    /// URL prefix (root-absolute, no trailing slash) under which slideshow
    /// images are served.
    pub fn slideshow_url_base(&self) -> String {
        let trimmed = self.slideshows.trim_start_matches("./").trim_matches('/');
        format!("/{trimmed}")
    }
}

/// Slideshow image optimization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Maximum width of the optimized (non-HD) slide.
    pub max_width: u32,
    /// Maximum height of the optimized (non-HD) slide.
    pub max_height: u32,
    /// JPEG quality for the optimized slide.
    pub jpeg_quality: u32,
    /// JPEG quality for the full-resolution HD companion.
    pub hd_jpeg_quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            jpeg_quality: 80,
            hd_jpeg_quality: 90,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image optimization workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Everything the build pipeline needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site source root (contains `assets/`, `pages/`, ...).
    pub source: PathBuf,
    /// Output directory; wiped and regenerated on every build.
    pub output: PathBuf,
    pub site: SiteConfig,
}

impl BuildConfig {
    /// Load `config.toml` from `source` and pair it with the output directory.
    pub fn load(source: &Path, output: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            site: load_config(source)?,
        })
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.source.join(&self.site.paths.assets)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.source.join(&self.site.paths.pages)
    }

    pub fn slideshows_dir(&self) -> PathBuf {
        self.source.join(&self.site.paths.slideshows)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.source.join(&self.site.paths.catalog)
    }

    pub fn category_template_path(&self) -> PathBuf {
        self.source.join(&self.site.paths.category_template)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Every default as a TOML table, the base layer user values merge onto.
fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Lay `overlay` over `base`. Tables merge per key, recursively; any other
/// overlay value replaces the base value outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let merged = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// The user's `config.toml` under `root`, if there is one.
fn read_overlay(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str(&text)?))
}

/// Load the site config for a source root.
///
/// A missing `config.toml` yields the defaults. Present keys override the
/// defaults; unknown keys and out-of-range values are errors.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match read_overlay(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Street Jewls Build Configuration
# ================================
# All settings are optional. Values shown below are the defaults.
# Place this file at the root of the site source tree.
# Unknown keys will cause an error.

# Page (inside the pages directory) written to the output root as the
# site entry document. Every other page goes under pages/.
entry_page = "index.html"

# ---------------------------------------------------------------------------
# Source layout (relative to the source root)
# ---------------------------------------------------------------------------
[paths]
# Static assets, copied verbatim to <output>/assets.
assets = "assets"

# Hand-written HTML pages. May contain {{SLIDESHOW:<name>}} tokens.
pages = "pages"

# One subdirectory per slideshow. Must live inside the assets directory.
slideshows = "assets/images/slideshows"

# Optional product catalog and category page template. When either is
# missing, category pages are not generated.
catalog = "data/catalog.json"
category_template = "templates/category.html"

# ---------------------------------------------------------------------------
# Slideshow image optimization (the `optimize` command)
# ---------------------------------------------------------------------------
[images]
# Bounds of the optimized slide. Images are never enlarged.
max_width = 1920
max_height = 1080

# JPEG quality (1-100) of the optimized slide and of the HD companion.
jpeg_quality = 80
hd_jpeg_quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-optimization workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
