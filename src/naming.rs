//! Centralized filename conventions for slideshow images.
//!
//! Slideshow directories hold a flat list of images. Everything the build and
//! the optimizer need to know about a file is derived from its name:
//!
//! - **Natural order**: the first run of digits in the filename is the primary
//!   sort key (`img2.jpg` before `img10.jpg`); names without digits sort as 0.
//! - **Variants**: `<stem>.webp`, `<stem>-hd.jpg` and `<stem>-hd.webp` are
//!   companions of the base image `<stem>.<jpg|jpeg|png>`.
//! - **Placeholders**: any name containing `-placeholder` is never a slide.
//! - **Alt text**: derived from the stem with punctuation and the trailing
//!   sequence number removed.

use std::cmp::Ordering;
use std::path::Path;

/// Marker that identifies a full-resolution companion image.
pub const HD_MARKER: &str = "-hd.";
/// Marker that identifies placeholder artwork shipped with an empty slideshow.
pub const PLACEHOLDER_MARKER: &str = "-placeholder";
/// Extensions (lowercase) accepted as slide sources.
pub const BASE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Lowercased extension of a filename, empty if none.
pub fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Filename without its final extension.
pub fn stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

/// Whether a filename is a slide source: a JPEG/PNG that is neither an HD
/// companion nor a placeholder.
pub fn is_base_image(file_name: &str) -> bool {
    BASE_EXTENSIONS.contains(&extension(file_name).as_str())
        && !file_name.contains(HD_MARKER)
        && !file_name.contains(PLACEHOLDER_MARKER)
}

/// Natural sort key: the first run of ASCII digits as an integer.
///
/// - `"img10.jpg"` → 10
/// - `"03-ring.jpg"` → 3
/// - `"cover.jpg"` → 0
///
/// Digit runs too long for `u64` saturate to `u64::MAX`; the filename
/// tie-break in [`natural_cmp`] keeps the order total.
pub fn sort_key(file_name: &str) -> u64 {
    let digits: String = file_name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}

/// Compare two filenames by [`sort_key`], then lexicographically.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

/// Alt text for a slide image.
///
/// Strips the extension, bracket/paren/hyphen characters and a trailing digit
/// run, then trims. Falls back to `Slide N` (1-based `position`) when nothing
/// is left.
///
/// - `"[Ring] (Gold)-12.jpg"` → `"Ring Gold"`
/// - `"07.jpg"` → `"Slide 1"` at position 1
pub fn alt_text(file_name: &str, position: usize) -> String {
    let cleaned: String = stem(file_name)
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '-'))
        .collect();
    let without_number = cleaned.trim_end_matches(|c: char| c.is_ascii_digit());
    let alt = without_number.trim();
    if alt.is_empty() {
        format!("Slide {position}")
    } else {
        alt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_first_digit_run() {
        assert_eq!(sort_key("img10.jpg"), 10);
        assert_eq!(sort_key("03-ring-2.jpg"), 3);
        assert_eq!(sort_key("a1b22.png"), 1);
    }

    #[test]
    fn sort_key_absent_digits_is_zero() {
        assert_eq!(sort_key("cover.jpg"), 0);
    }

    #[test]
    fn sort_key_overflow_saturates() {
        assert_eq!(sort_key("99999999999999999999999.jpg"), u64::MAX);
    }

    #[test]
    fn natural_order() {
        let mut names = vec!["img10.jpg", "img2.jpg", "img1.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["img1.jpg", "img2.jpg", "img10.jpg"]);
    }

    #[test]
    fn natural_order_ties_break_lexicographically() {
        let mut names = vec!["b1.jpg", "a01.jpg", "a1.jpg", "cover.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["cover.jpg", "a01.jpg", "a1.jpg", "b1.jpg"]);
    }

    #[test]
    fn distinct_names_never_compare_equal() {
        assert_ne!(natural_cmp("a1.jpg", "a01.jpg"), Ordering::Equal);
        assert_eq!(natural_cmp("a1.jpg", "a1.jpg"), Ordering::Equal);
    }

    #[test]
    fn base_image_classification() {
        assert!(is_base_image("ring.jpg"));
        assert!(is_base_image("RING.JPEG"));
        assert!(is_base_image("ring.png"));
        assert!(!is_base_image("ring.webp"));
        assert!(!is_base_image("ring-hd.jpg"));
        assert!(!is_base_image("slideshow-placeholder.jpg"));
        assert!(!is_base_image("notes.txt"));
    }

    #[test]
    fn stem_strips_last_extension_only() {
        assert_eq!(stem("a.b.jpg"), "a.b");
        assert_eq!(stem("noext"), "noext");
        assert_eq!(stem(".hidden"), ".hidden");
    }

    #[test]
    fn alt_text_strips_punctuation_and_number() {
        assert_eq!(alt_text("[Ring] (Gold)-12.jpg", 1), "Ring Gold");
        assert_eq!(alt_text("street-jewls-03.jpg", 3), "streetjewls");
        assert_eq!(alt_text("  Chain Link 4 .png", 1), "Chain Link 4");
    }

    #[test]
    fn alt_text_keeps_braces() {
        assert_eq!(alt_text("{Limited} Pendant-2.jpg", 1), "{Limited} Pendant");
    }

    #[test]
    fn alt_text_falls_back_to_position() {
        assert_eq!(alt_text("07.jpg", 1), "Slide 1");
        assert_eq!(alt_text("(12).jpg", 5), "Slide 5");
    }
}
