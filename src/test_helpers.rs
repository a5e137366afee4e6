//! Shared test utilities for the street-jewls test suite.
//!
//! Tests build small site source trees in a `TempDir` instead of relying on
//! checked-in fixtures, so every test states the inputs it depends on.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_site();
//! write_file(tmp.path(), "pages/contact.html", "<a href=\"/\">home</a>");
//! let config = build_config(&tmp);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{BuildConfig, SiteConfig};

// =========================================================================
// File helpers
// =========================================================================

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Read `root/rel` as UTF-8. Panics with the path on failure.
pub fn read_file(root: &Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// =========================================================================
// Site fixtures
// =========================================================================

/// A minimal site: an entry page, one sub-page and one asset.
///
/// ```text
/// src/
/// ├── assets/css/site.css
/// └── pages/
///     ├── index.html
///     └── about.html
/// ```
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    write_file(&src, "assets/css/site.css", "body { margin: 0; }");
    write_file(
        &src,
        "pages/index.html",
        r#"<link href="/assets/css/site.css"><a href="/pages/about.html">About</a>"#,
    );
    write_file(&src, "pages/about.html", r#"<a href="/">Home</a>"#);
    tmp
}

/// Source root of a tree made by [`setup_site`].
pub fn source_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("src")
}

/// Output root used by tests built on [`setup_site`].
pub fn output_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("dist")
}

/// Default build configuration for a tree made by [`setup_site`].
pub fn build_config(tmp: &TempDir) -> BuildConfig {
    BuildConfig {
        source: source_dir(tmp),
        output: output_dir(tmp),
        site: SiteConfig::default(),
    }
}

/// A single-category catalog whose one product has no badge.
pub const WHEELS_CATALOG: &str = r#"{
  "categories": [
    {
      "id": "wheels",
      "name": "Wheels",
      "japanese": "ホイール",
      "eyebrow": "Parts",
      "description": "Forged and cast wheels.",
      "products": [
        { "id": "w1", "brand": "X", "title": "Y", "price": 199.5 }
      ]
    }
  ]
}"#;

/// A category template using every placeholder.
pub const CATEGORY_TEMPLATE: &str = concat!(
    r#"<html data-category="{{ID}}"><head><link href="/assets/css/site.css"></head>"#,
    r#"<body><a href="/">Home</a><p>{{EYEBROW}}</p><h1>{{NAME}}</h1><h2>{{JAPANESE}}</h2>"#,
    r#"<p>{{DESCRIPTION}}</p><div class="product-grid">{{PRODUCTS}}</div></body></html>"#,
);
