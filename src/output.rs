//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.
//!
//! # Output Format
//!
//! ## Conversion
//!
//! ```text
//! [Convert] icons/logo.png -> icons/logo.ico
//!     OK: 7 sizes, 48213 bytes
//! [Convert] icons/broken.png -> icons/broken.ico
//!     FAIL (decode): decode error: Failed to decode image: ...
//! Done. Total: 2, Success: 1, Failed: 1
//! ```
//!
//! ## Inspect
//!
//! ```text
//! icons/logo.ico (3 images, 9120 bytes)
//!     001 16x16  32bpp  812 bytes @ 54
//!     002 32x32  32bpp  1630 bytes @ 866
//!     003 256x256  32bpp  6624 bytes @ 2496
//! ```

use crate::batch::{BatchSummary, FileReport, FileStatus};
use crate::container::ContainerInfo;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Conversion output
// ============================================================================

/// Format one converted (or failed) file.
pub fn format_file_report(report: &FileReport) -> Vec<String> {
    let mut lines = vec![format!(
        "[Convert] {} -> {}",
        report.input.display(),
        report.output.display()
    )];
    match &report.status {
        FileStatus::Converted { bytes, sizes } => {
            let noun = if sizes.len() == 1 { "size" } else { "sizes" };
            lines.push(format!(
                "{}OK: {} {}, {} bytes",
                indent(1),
                sizes.len(),
                noun,
                bytes
            ));
        }
        FileStatus::Failed { kind, error, .. } => {
            lines.push(format!("{}FAIL ({}): {}", indent(1), kind, error));
        }
    }
    lines
}

/// Print one file report to stdout.
pub fn print_file_report(report: &FileReport) {
    for line in format_file_report(report) {
        println!("{}", line);
    }
}

/// Format the batch header line.
pub fn format_batch_header(dir: &Path) -> String {
    format!("Batch converting images in: {}", dir.display())
}

/// Format the aggregate counts line.
pub fn format_summary(summary: &BatchSummary) -> String {
    format!(
        "Done. Total: {}, Success: {}, Failed: {}",
        summary.total, summary.succeeded, summary.failed
    )
}

// ============================================================================
// Inspect output
// ============================================================================

/// Format the directory of an existing icon file.
pub fn format_container_info(path: &Path, info: &ContainerInfo) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} images, {} bytes)",
        path.display(),
        info.entries.len(),
        info.file_len
    )];
    for (i, entry) in info.entries.iter().enumerate() {
        let edge = entry.declared_edge();
        let height = if entry.height == 0 {
            256
        } else {
            entry.height as u32
        };
        lines.push(format!(
            "{}{} {}x{}  {}bpp  {} bytes @ {}",
            indent(1),
            format_index(i + 1),
            edge,
            height,
            entry.bits_per_pixel,
            entry.length,
            entry.offset
        ));
    }
    lines
}

/// Print an icon directory to stdout.
pub fn print_container_info(path: &Path, info: &ContainerInfo) {
    for line in format_container_info(path, info) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{IconVariant, encode_container, parse_container};
    use crate::convert::ConversionStage;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn format_converted_file() {
        let report = FileReport {
            input: PathBuf::from("icons/logo.png"),
            output: PathBuf::from("icons/logo.ico"),
            status: FileStatus::Converted {
                bytes: 48213,
                sizes: vec![16, 24, 32, 48, 64, 128, 256],
            },
        };
        assert_eq!(
            format_file_report(&report),
            vec![
                "[Convert] icons/logo.png -> icons/logo.ico",
                "    OK: 7 sizes, 48213 bytes",
            ]
        );
    }

    #[test]
    fn format_single_size_is_singular() {
        let report = FileReport {
            input: PathBuf::from("a.png"),
            output: PathBuf::from("a.ico"),
            status: FileStatus::Converted {
                bytes: 100,
                sizes: vec![16],
            },
        };
        assert_eq!(format_file_report(&report)[1], "    OK: 1 size, 100 bytes");
    }

    #[test]
    fn format_failed_file() {
        let report = FileReport {
            input: PathBuf::from("bad.png"),
            output: PathBuf::from("bad.ico"),
            status: FileStatus::Failed {
                kind: "decode".to_string(),
                stage: ConversionStage::Idle,
                error: "not an image".to_string(),
            },
        };
        assert_eq!(format_file_report(&report)[1], "    FAIL (decode): not an image");
    }

    #[test]
    fn format_summary_counts() {
        let summary = BatchSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
        };
        assert_eq!(
            format_summary(&summary),
            "Done. Total: 3, Success: 2, Failed: 1"
        );
    }

    #[test]
    fn format_inspect_lists_entries() {
        let bytes = encode_container(&[
            IconVariant::new(16, vec![0; 10]),
            IconVariant::new(256, vec![0; 20]),
        ])
        .unwrap();
        let info = parse_container(&bytes).unwrap();

        let lines = format_container_info(Path::new("x.ico"), &info);
        assert_eq!(lines[0], "x.ico (2 images, 68 bytes)");
        assert_eq!(lines[1], "    001 16x16  32bpp  10 bytes @ 38");
        assert_eq!(lines[2], "    002 256x256  32bpp  20 bytes @ 48");
    }
}
