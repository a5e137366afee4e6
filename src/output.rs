//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Every emitted entity is shown as a header line (positional index + what it
//! is) with details indented below it, so a build log reads as an inventory
//! of the site.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Assets
//!     12 files → assets/
//!
//! Pages
//!     001 index.html → index.html
//!         Slideshow hero: 3 slides
//!     002 about.html → pages/about.html
//!
//! Categories
//!     001 wheels → pages/parts/wheels.html
//!
//! Built 17 files (42.3 KB)
//! ```
//!
//! ## Optimize
//!
//! ```text
//! hero/
//!     001 01-ring.jpg
//!         Optimized: 4.20 MB → 512.0 KB (-88%)
//!         WebP: 498.1 KB (-88%)
//!         HD saved: 2.10 MB
//!     002 02-chain.jpg (already processed)
//!
//! Summary
//!     Processed: 1 images
//!     Skipped: 1 images
//!     Errors: 0
//!     Original size: 4.50 MB
//!     Optimized size: 798.1 KB
//!     Total savings: 83%
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::assets::AssetCopy;
use crate::imaging::ImageOutcome;
use crate::optimize::{ImageResult, OptimizeReport, savings_percent};
use crate::pages::EmittedPage;
use crate::report::format_bytes;
use crate::site::{BuildSummary, CheckSummary};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// One emitted page with its slideshows.
///
/// ```text
///     001 about.html → pages/about.html
///         Slideshow hero: 3 slides
///         Slideshow shop: placeholder
/// ```
fn page_lines(index: usize, label: &str, page: &EmittedPage) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{} {} \u{2192} {}",
        indent(1),
        format_index(index),
        label,
        display_path(&page.output)
    )];
    for (name, count) in &page.slideshows {
        let detail = match count {
            0 => "placeholder".to_string(),
            n => plural(*n, "slide", "slides"),
        };
        lines.push(format!("{}Slideshow {}: {}", indent(2), name, detail));
    }
    lines
}

fn page_label(page: &EmittedPage) -> String {
    page.source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Category pages are labeled by their id (the output file stem).
fn category_label(page: &EmittedPage) -> String {
    page.output
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn pages_section(pages: &[EmittedPage]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in pages.iter().enumerate() {
        lines.extend(page_lines(i + 1, &page_label(page), page));
    }
    lines
}

fn categories_section(categories: &[EmittedPage], skipped: Option<&str>) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    if let Some(reason) = skipped {
        lines.push(format!("{}Skipped ({})", indent(1), reason));
        return lines;
    }
    if categories.is_empty() {
        lines.push(format!("{}No categories in catalog", indent(1)));
    }
    for (i, page) in categories.iter().enumerate() {
        lines.extend(page_lines(i + 1, &category_label(page), page));
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

/// Format the result of a build.
pub fn format_build_output(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec!["Assets".to_string()];
    match summary.assets {
        AssetCopy::Copied { files } => lines.push(format!(
            "{}{} \u{2192} assets/",
            indent(1),
            plural(files, "file", "files")
        )),
        AssetCopy::Missing => lines.push(format!("{}No assets directory, skipped", indent(1))),
    }

    lines.push(String::new());
    lines.extend(pages_section(&summary.pages));
    lines.push(String::new());
    lines.extend(categories_section(
        &summary.categories,
        summary.catalog_skipped.as_deref(),
    ));

    lines.push(String::new());
    lines.push(format!(
        "Built {} ({})",
        plural(summary.report.file_count, "file", "files"),
        format_bytes(summary.report.total_bytes)
    ));
    lines
}

pub fn print_build_output(summary: &BuildSummary) {
    for line in format_build_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format what a build would emit.
pub fn format_check_output(summary: &CheckSummary) -> Vec<String> {
    let mut lines = vec!["Assets".to_string()];
    lines.push(if summary.assets_present {
        format!("{}assets/ present", indent(1))
    } else {
        format!("{}No assets directory, will be skipped", indent(1))
    });

    lines.push(String::new());
    lines.extend(pages_section(&summary.pages));
    lines.push(String::new());
    lines.extend(categories_section(
        &summary.categories,
        summary.catalog_skipped.as_deref(),
    ));

    let placeholders: Vec<&str> = summary
        .pages
        .iter()
        .chain(&summary.categories)
        .flat_map(|p| &p.slideshows)
        .filter(|(_, count)| *count == 0)
        .map(|(name, _)| name.as_str())
        .collect();
    if !placeholders.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Warning: empty slideshows render placeholders: {}",
            placeholders.join(", ")
        ));
    }
    lines
}

pub fn print_check_output(summary: &CheckSummary) {
    for line in format_check_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Optimize
// ============================================================================

fn image_lines(index: usize, file_name: &str, result: &ImageResult) -> Vec<String> {
    let header = format!("{}{} {}", indent(1), format_index(index), file_name);
    match result {
        ImageResult::Done(ImageOutcome::Skipped { .. }) => {
            vec![format!("{header} (already processed)")]
        }
        ImageResult::Failed { message, .. } => vec![format!("{header}: {message}")],
        ImageResult::Done(ImageOutcome::Processed {
            original_bytes,
            optimized_bytes,
            webp_bytes,
            hd_bytes,
            ..
        }) => {
            let savings = |after: u64| {
                savings_percent(*original_bytes, after)
                    .map(|p| format!(" (-{p}%)"))
                    .unwrap_or_default()
            };
            vec![
                header,
                format!(
                    "{}Optimized: {} \u{2192} {}{}",
                    indent(2),
                    format_bytes(*original_bytes),
                    format_bytes(*optimized_bytes),
                    savings(*optimized_bytes)
                ),
                format!(
                    "{}WebP: {}{}",
                    indent(2),
                    format_bytes(*webp_bytes),
                    savings(*webp_bytes)
                ),
                format!("{}HD saved: {}", indent(2), format_bytes(*hd_bytes)),
            ]
        }
    }
}

/// Format an optimizer run.
pub fn format_optimize_output(report: &OptimizeReport, root: &Path) -> Vec<String> {
    if report.is_empty() {
        return vec![
            "No images found in slideshow directories.".to_string(),
            format!("{}Add images to: {}/*/", indent(1), display_path(root)),
        ];
    }

    let mut lines = Vec::new();
    for dir in &report.directories {
        lines.push(format!("{}/", dir.name));
        for (i, image) in dir.images.iter().enumerate() {
            lines.extend(image_lines(i + 1, &image.file_name, &image.result));
        }
        lines.push(String::new());
    }

    let errors = report.errors();
    lines.push("Summary".to_string());
    lines.push(format!("{}Processed: {} images", indent(1), report.processed()));
    lines.push(format!("{}Skipped: {} images", indent(1), report.skipped()));
    lines.push(format!("{}Errors: {}", indent(1), errors.len()));
    lines.push(format!(
        "{}Original size: {}",
        indent(1),
        format_bytes(report.original_bytes())
    ));
    lines.push(format!(
        "{}Optimized size: {}",
        indent(1),
        format_bytes(report.optimized_bytes())
    ));
    if let Some(p) = report.savings_percent() {
        lines.push(format!("{}Total savings: {}%", indent(1), p));
    }

    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors".to_string());
        for (file, message) in errors {
            lines.push(format!("{}{}: {}", indent(1), file, message));
        }
    }
    lines
}

pub fn print_optimize_output(report: &OptimizeReport, root: &Path) {
    for line in format_optimize_output(report, root) {
        println!("{}", line);
    }
}
