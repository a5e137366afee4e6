//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `max` while keeping the
/// source aspect ratio. Images are never enlarged.
///
/// Width is constrained first, then height, each step rounding to the nearest
/// pixel. Neither edge goes below 1.
///
/// # Examples
/// ```
/// # use street_jewls::imaging::fit_within;
/// // 4000x3000 into 1920x1080 → width-bound 1920x1440, then height-bound
/// assert_eq!(fit_within((4000, 3000), (1920, 1080)), (1440, 1080));
///
/// // Already small enough → unchanged
/// assert_eq!(fit_within((800, 600), (1920, 1080)), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (mut width, mut height) = source;
    let (max_w, max_h) = max;

    if width > max_w {
        height = (max_w as f64 / width as f64 * height as f64).round() as u32;
        width = max_w;
    }
    if height > max_h {
        width = (max_h as f64 / height as f64 * width as f64).round() as u32;
        height = max_h;
    }
    (width.max(1), height.max(1))
}
