//! CLI output formatting for the end-of-run summary.
//!
//! Log lines (through `tracing`) report progress as it happens; this module
//! prints the inventory once the batch is done, so the result of a large run
//! can be read without scrolling through the log.
//!
//! # Output Format
//!
//! ```text
//! Saved
//! 001 dawn.jpg → dawn_border-s_exif.jpg
//! 002 trips/rome.png → rome_border-s_exif.png
//!
//! Skipped
//! 001 notes.gif
//!     Reason: matches no include pattern
//!
//! Failed
//! 001 broken.jpg
//!     Error: Image processing failed: ...
//!
//! Bordered 2 images, skipped 1, failed 1
//! ```
//!
//! Paths are shown relative to the directory the run was started on. Outputs sit
//! next to their source, so only the output's file name follows the arrow
//! when they share a directory.
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` for testability and a `print_*`
//! wrapper writes to stdout. Format functions are pure: no I/O, no side effects.

use crate::process::BatchReport;
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

/// `path` relative to `root`, or as given when it is not underneath.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// `source → output`, abbreviating the output when it sits next to its source.
fn saved_line(source: &Path, output: &Path, root: &Path) -> String {
    let target = if source.parent() == output.parent() {
        output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| output.display().to_string())
    } else {
        display_path(output, root)
    };
    format!("{} → {}", display_path(source, root), target)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Batch summary
// ============================================================================

/// Format the end-of-run summary.
///
/// Empty sections are left out; the closing totals line is always present.
pub fn format_batch_summary(report: &BatchReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.saved.is_empty() {
        lines.push("Saved".to_string());
        for (i, saved) in report.saved.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                saved_line(&saved.source, &saved.output, root)
            ));
        }
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for (i, skipped) in report.skipped.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                display_path(&skipped.path, root)
            ));
            lines.push(format!("{}Reason: {}", indent(1), skipped.reason));
        }
        lines.push(String::new());
    }

    if !report.failed.is_empty() {
        lines.push("Failed".to_string());
        for (i, failed) in report.failed.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                display_path(&failed.path, root)
            ));
            lines.push(format!("{}Error: {}", indent(1), failed.error));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Bordered {}, skipped {}, failed {}",
        plural(report.saved.len(), "image"),
        report.skipped.len(),
        report.failed.len()
    ));
    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_batch_summary(report: &BatchReport, root: &Path) {
    for line in format_batch_summary(report, root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Failed, Saved};
    use crate::scan::Skipped;
    use std::path::PathBuf;

    fn saved(source: &str, output: &str) -> Saved {
        Saved {
            source: PathBuf::from(source),
            output: PathBuf::from(output),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn display_path_relative_to_root() {
        assert_eq!(
            display_path(Path::new("/photos/trips/rome.jpg"), Path::new("/photos")),
            "trips/rome.jpg"
        );
    }

    #[test]
    fn display_path_outside_root_is_unchanged() {
        assert_eq!(
            display_path(Path::new("/elsewhere/a.jpg"), Path::new("/photos")),
            "/elsewhere/a.jpg"
        );
    }

    #[test]
    fn saved_line_abbreviates_sibling_output() {
        assert_eq!(
            saved_line(
                Path::new("/photos/trips/rome.jpg"),
                Path::new("/photos/trips/rome_border-l.jpg"),
                Path::new("/photos"),
            ),
            "trips/rome.jpg → rome_border-l.jpg"
        );
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "image"), "1 image");
        assert_eq!(plural(0, "image"), "0 images");
        assert_eq!(plural(3, "image"), "3 images");
    }

    // =========================================================================
    // Summary tests
    // =========================================================================

    #[test]
    fn empty_report_is_totals_only() {
        let lines = format_batch_summary(&BatchReport::default(), Path::new("/photos"));
        assert_eq!(lines, vec!["Bordered 0 images, skipped 0, failed 0"]);
    }

    #[test]
    fn full_report_lists_every_section() {
        let report = BatchReport {
            saved: vec![
                saved("/photos/dawn.jpg", "/photos/dawn_border-s_exif.jpg"),
                saved("/photos/trips/rome.png", "/photos/trips/rome_border-s_exif.png"),
            ],
            skipped: vec![Skipped {
                path: PathBuf::from("/photos/notes.gif"),
                reason: "matches no include pattern".to_string(),
            }],
            failed: vec![Failed {
                path: PathBuf::from("/photos/broken.jpg"),
                error: "Image processing failed: bad header".to_string(),
            }],
        };

        let lines = format_batch_summary(&report, Path::new("/photos"));
        assert_eq!(
            lines,
            vec![
                "Saved",
                "001 dawn.jpg → dawn_border-s_exif.jpg",
                "002 trips/rome.png → rome_border-s_exif.png",
                "",
                "Skipped",
                "001 notes.gif",
                "    Reason: matches no include pattern",
                "",
                "Failed",
                "001 broken.jpg",
                "    Error: Image processing failed: bad header",
                "",
                "Bordered 2 images, skipped 1, failed 1",
            ]
        );
    }

    #[test]
    fn single_saved_uses_singular() {
        let report = BatchReport {
            saved: vec![saved("/p/a.jpg", "/p/a_border-p.jpg")],
            ..BatchReport::default()
        };
        let lines = format_batch_summary(&report, Path::new("/p"));
        assert_eq!(lines.last().unwrap(), "Bordered 1 image, skipped 0, failed 0");
    }
}
