//! # Street Jewls
//!
//! Build tool for the Street Jewls brochure site. Pages are hand-written HTML
//! authored as if served from the domain root; the build turns them into a
//! static tree that works from any base URL, including `file://`.
//!
//! # Pipeline
//!
//! ```text
//! source/                              dist/
//! ├── assets/          ── copy ──▶     ├── assets/
//! ├── pages/*.html     ── expand ─▶    ├── index.html          (depth 0)
//! │                       rewrite      ├── pages/*.html        (depth 1)
//! ├── data/catalog.json ─ render ─▶    └── pages/parts/*.html  (depth 2)
//! └── templates/category.html
//! ```
//!
//! 1. **Expand**: `{{SLIDESHOW:<name>}}` tokens become slide markup built from
//!    the images in `assets/images/slideshows/<name>/`.
//! 2. **Rewrite**: root-absolute references (`/assets/`, `/pages/`, `/`)
//!    become relative to where the page lands.
//!
//! Expansion always runs first so the image URLs it generates are rewritten
//! too; the page types in [`pages`] make the other order unrepresentable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | The build and check entry points, output lock |
//! | [`rewrite`] | Root-absolute → relative path rewriting by output depth |
//! | [`slideshow`] | Slideshow directory resolution and slide markup |
//! | [`pages`] | Source page → output page pipeline and placement |
//! | [`catalog`] | Category pages from the JSON product catalog |
//! | [`assets`] | Verbatim asset tree copy |
//! | [`report`] | Output file count and size |
//! | [`optimize`] | Slideshow image optimizer (HD + WebP companions) |
//! | [`imaging`] | Image backend, dimension math, variant planning |
//! | [`naming`] | Filename conventions: natural order, variants, alt text |
//! | [`config`] | `config.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |

pub mod assets;
pub mod catalog;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod optimize;
pub mod output;
pub mod pages;
pub mod report;
pub mod rewrite;
pub mod site;
pub mod slideshow;

#[cfg(test)]
pub(crate) mod test_helpers;
