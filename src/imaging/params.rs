//! Parameter types for image operations.
//!
//! These structs describe *what* to encode, not *how*. They are the interface
//! between [`operations`](super::operations) (which decides which variants a
//! slide needs) and the [`backend`](super::backend) (which does the pixel
//! work), so operations can be tested against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: JPEG at a quality, or lossless WebP.
//! - [`EncodeParams`]: Source, output path, target dimensions and format.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoded output format.
///
/// WebP is always lossless: the `image` crate only ships a lossless WebP
/// encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg(Quality),
    WebP,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg(q) => write!(f, "jpeg q{}", q.value()),
            OutputFormat::WebP => write!(f, "webp lossless"),
        }
    }
}

/// Decode `source`, scale to `width`×`height`, encode to `output`.
///
/// `output` may equal `source`; backends must fully decode before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}
