//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3 via `image::DynamicImage::resize_exact` |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//! | **Encode → WebP** | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::fit_within;
pub use operations::{
    ImageOutcome, OptimizeSettings, VariantPaths, get_dimensions, optimize_image, plan_variants,
};
pub use params::{EncodeParams, OutputFormat, Quality};
pub use rust_backend::RustBackend;
