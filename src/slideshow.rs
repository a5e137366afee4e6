//! Slideshow resolution and markup generation.
//!
//! A page opts into a slideshow with a `{{SLIDESHOW:<name>}}` token. At build
//! time the token is replaced by one slide fragment per image found in
//! `<slideshows>/<name>/`, ordered naturally (see [`crate::naming`]).
//!
//! ## Variants
//!
//! The optimizer leaves up to four files per slide:
//!
//! ```text
//! hero/
//! ├── 01-ring.jpg        # base image (always present)
//! ├── 01-ring.webp       # → <picture> with a WebP <source>
//! ├── 01-ring-hd.jpg     # → data-hd-src
//! └── 01-ring-hd.webp    # → data-hd-webp
//! ```
//!
//! Companion detection is a set lookup over a single directory listing.
//!
//! ## Markup
//!
//! Slide URLs are emitted root-absolute (`/assets/images/slideshows/...`) so
//! the path rewriter relativizes them together with the rest of the page.
//! The first slide is active and eagerly loaded; the rest are lazy. The HD
//! attributes are plain data for the client script that swaps in full
//! resolution on demand.

use crate::naming;
use maud::{Markup, html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideshowError {
    #[error("failed to list slideshow {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything outside the RFC 3986 unreserved set is escaped, so spaces,
/// brackets and parentheses in filenames survive as URL path segments.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{SLIDESHOW:([a-z0-9-]+)\}\}").expect("valid token regex"));

/// One slide: a base image plus which companions exist next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDescriptor {
    /// Base image filename, e.g. `01-ring.jpg`.
    pub file_name: String,
    /// Filename without extension, e.g. `01-ring`.
    pub base_name: String,
    pub has_webp: bool,
    pub has_hd: bool,
    pub has_hd_webp: bool,
}

impl SlideDescriptor {
    pub fn webp_name(&self) -> String {
        format!("{}.webp", self.base_name)
    }

    pub fn hd_name(&self) -> String {
        format!("{}-hd.jpg", self.base_name)
    }

    pub fn hd_webp_name(&self) -> String {
        format!("{}-hd.webp", self.base_name)
    }
}

/// Scan `<root>/<name>` and return its slides in natural order.
///
/// A missing directory yields no slides; it is not an error.
pub fn resolve(root: &Path, name: &str) -> Result<Vec<SlideDescriptor>, SlideshowError> {
    let dir = root.join(name);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| SlideshowError::Io {
        path: dir.clone(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            files.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    let names: HashSet<&str> = files.iter().map(String::as_str).collect();
    let mut bases: Vec<&String> = files.iter().filter(|f| naming::is_base_image(f)).collect();
    bases.sort_by(|a, b| naming::natural_cmp(a, b));

    Ok(bases
        .into_iter()
        .map(|file_name| {
            let base_name = naming::stem(file_name).to_string();
            let mut slide = SlideDescriptor {
                file_name: file_name.clone(),
                base_name,
                has_webp: false,
                has_hd: false,
                has_hd_webp: false,
            };
            slide.has_webp = names.contains(slide.webp_name().as_str());
            slide.has_hd = names.contains(slide.hd_name().as_str());
            slide.has_hd_webp = names.contains(slide.hd_webp_name().as_str());
            slide
        })
        .collect())
}

/// Root-absolute URL of a file inside slideshow `name`.
fn slide_url(url_base: &str, name: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        url_base,
        name,
        utf8_percent_encode(file_name, FILENAME_ENCODE_SET)
    )
}

/// Render the markup for slideshow `name`.
///
/// `url_base` is the root-absolute URL of the slideshows directory, without
/// a trailing slash.
pub fn render(name: &str, slides: &[SlideDescriptor], url_base: &str) -> String {
    if slides.is_empty() {
        return render_placeholder(name, url_base).into_string();
    }
    html! {
        @for (idx, slide) in slides.iter().enumerate() {
            (render_slide(name, idx, slide, url_base))
        }
    }
    .into_string()
}

fn render_placeholder(name: &str, url_base: &str) -> Markup {
    html! {
        div.slideshow__placeholder data-slideshow=(name) {
            p { "Add images to " code { (url_base) "/" (name) "/" } }
            p.slideshow__formats { "Accepted formats: JPG, JPEG, PNG" }
        }
    }
}

fn render_slide(name: &str, idx: usize, slide: &SlideDescriptor, url_base: &str) -> Markup {
    let first = idx == 0;
    let src = slide_url(url_base, name, &slide.file_name);
    let alt = naming::alt_text(&slide.file_name, idx + 1);
    let loading = if first { "eager" } else { "lazy" };
    let hd_src = slide
        .has_hd
        .then(|| slide_url(url_base, name, &slide.hd_name()));
    let hd_webp = (slide.has_hd && slide.has_hd_webp)
        .then(|| slide_url(url_base, name, &slide.hd_webp_name()));

    html! {
        div.slideshow__slide.is-active[first] data-index=(idx) {
            @if slide.has_webp {
                picture {
                    source type="image/webp" srcset=(slide_url(url_base, name, &slide.webp_name()));
                    img src=(src) alt=(alt) loading=(loading) data-hd-src=[hd_src.as_deref()] data-hd-webp=[hd_webp.as_deref()];
                }
            } @else {
                img src=(src) alt=(alt) loading=(loading) data-hd-src=[hd_src.as_deref()] data-hd-webp=[hd_webp.as_deref()];
            }
        }
    }
}

/// Where slideshow directories live on disk and how they are addressed.
#[derive(Debug, Clone)]
pub struct SlideshowSource {
    pub root: PathBuf,
    pub url_base: String,
}

impl SlideshowSource {
    pub fn new(root: impl Into<PathBuf>, url_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_base: url_base.into(),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Vec<SlideDescriptor>, SlideshowError> {
        resolve(&self.root, name)
    }

    pub fn render(&self, name: &str, slides: &[SlideDescriptor]) -> String {
        render(name, slides, &self.url_base)
    }
}

/// Page text with every slideshow token replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Each distinct slideshow referenced, with its slide count, in order of
    /// first appearance.
    pub slideshows: Vec<(String, usize)>,
}

/// Names referenced by `{{SLIDESHOW:<name>}}` tokens, deduplicated, in order
/// of first appearance.
pub fn token_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TOKEN
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Replace every slideshow token in `text`. Each distinct name is resolved
/// once; repeated tokens get identical markup.
pub fn expand(text: &str, source: &SlideshowSource) -> Result<Expansion, SlideshowError> {
    let names = token_names(text);
    if names.is_empty() {
        return Ok(Expansion {
            text: text.to_string(),
            slideshows: Vec::new(),
        });
    }

    let mut rendered = BTreeMap::new();
    let mut slideshows = Vec::with_capacity(names.len());
    for name in names {
        let slides = source.resolve(&name)?;
        slideshows.push((name.clone(), slides.len()));
        rendered.insert(name.clone(), source.render(&name, &slides));
    }

    let text = TOKEN
        .replace_all(text, |caps: &Captures| rendered[&caps[1]].clone())
        .into_owned();
    Ok(Expansion { text, slideshows })
}
