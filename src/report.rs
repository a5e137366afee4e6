//! Build report: file count and total size of the finished output tree.

use std::fmt;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to walk output: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub file_count: usize,
    pub total_bytes: u64,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files ({})",
            self.file_count,
            format_bytes(self.total_bytes)
        )
    }
}

/// Count files and sum their sizes under `output`.
pub fn collect(output: &Path) -> Result<BuildReport, ReportError> {
    let mut report = BuildReport::default();
    for entry in WalkDir::new(output) {
        let entry = entry?;
        if entry.file_type().is_file() {
            report.file_count += 1;
            report.total_bytes += entry.metadata()?.len();
        }
    }
    Ok(report)
}

/// Human-readable size: `B` below 1 KB, `KB` with one decimal below 1 MB,
/// `MB` with two decimals above.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 256 * 1024), "5.25 MB");
    }

    #[test]
    fn collect_counts_nested_files() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "index.html", "12345");
        write_file(tmp.path(), "pages/a.html", "123");
        write_file(tmp.path(), "pages/parts/b.html", "12");
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let report = collect(tmp.path()).unwrap();
        assert_eq!(
            report,
            BuildReport {
                file_count: 3,
                total_bytes: 10
            }
        );
        assert_eq!(report.to_string(), "3 files (10 B)");
    }

    #[test]
    fn collect_missing_output_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(collect(&tmp.path().join("nope")).is_err());
    }
}
