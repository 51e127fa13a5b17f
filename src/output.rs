//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Sources: images/photo_*.{jpg,jpeg,png}
//! Large:   images/optimized/large (fit 1600px)
//! Thumbs:  images/optimized/thumbs (480px square)
//!
//! 001 photo_dawn
//!     Source: images/photo_dawn.jpg
//!     large jpg: encoded
//!     large webp: exists, skipped
//!     ...
//! 002 photo_broken
//!     Source: images/photo_broken.png
//!     Failed: Failed to decode images/photo_broken.png: ...
//!
//! Done. Processed 1 image(s) in 2.41s (6 encoded, 0 existing)
//! 1 image(s) failed
//! Large:  images/optimized/large/*@1600.{jpg,webp,avif}
//! Thumbs: images/optimized/thumbs/*@480.{jpg,webp,avif}
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 photo_dawn: complete
//! 002 photo_new: 6 missing
//!     photo_new@1600.jpg
//!     ...
//!
//! 2 source(s), 6 variant(s) missing
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and, where main needs one, a `print_*` wrapper that writes to
//! stdout. Format functions are pure: no I/O, no side effects.
//! Paths are shown relative to the project root.

use crate::naming::SOURCE_EXTENSIONS;
use crate::process::{BatchSummary, ProcessConfig, ProcessEvent};
use crate::types::{Encoding, SourceImage, VariantStatus};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Path relative to `root` when it lies inside it, as written otherwise.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_duration(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

fn output_glob(dir: &Path, size: u32, root: &Path) -> String {
    let extensions: Vec<&str> = Encoding::ALL.iter().map(|e| e.extension()).collect();
    format!(
        "{}/*@{}.{{{}}}",
        display_path(dir, root),
        size,
        extensions.join(",")
    )
}

// ============================================================================
// Run output
// ============================================================================

/// Lines printed before processing starts.
pub fn format_run_header(
    config: &ProcessConfig,
    source_dir: &Path,
    prefix: &str,
    root: &Path,
) -> Vec<String> {
    vec![
        format!(
            "Sources: {}/{}*.{{{}}}",
            display_path(source_dir, root),
            prefix,
            SOURCE_EXTENSIONS.join(",")
        ),
        format!(
            "Large:   {} (fit {}px)",
            display_path(&config.large.output_dir, root),
            config.large.size
        ),
        format!(
            "Thumbs:  {} ({}px square)",
            display_path(&config.thumbnail.output_dir, root),
            config.thumbnail.size
        ),
        String::new(),
    ]
}

/// Message for a run that found no sources.
pub fn format_nothing_to_do(source_dir: &Path, root: &Path) -> Vec<String> {
    vec![format!(
        "No source images found in {}. Nothing to do.",
        display_path(source_dir, root)
    )]
}

/// Format a single process progress event as display lines.
///
/// Each source leads with its positional index and base name; the source path
/// and per-variant status are shown as indented context.
pub fn format_process_event(event: &ProcessEvent, root: &Path) -> Vec<String> {
    match event {
        ProcessEvent::ImageProcessed {
            index,
            source_path,
            variants,
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(*index), file_stem(source_path)),
                format!("    Source: {}", display_path(source_path, root)),
            ];
            for variant in variants {
                let status = match variant.status {
                    VariantStatus::Encoded => "encoded",
                    VariantStatus::Skipped => "exists, skipped",
                };
                lines.push(format!("    {}: {}", variant.label(), status));
            }
            lines
        }
        ProcessEvent::ImageFailed {
            index,
            source_path,
            error,
        } => vec![
            format!("{} {}", format_index(*index), file_stem(source_path)),
            format!("    Source: {}", display_path(source_path, root)),
            format!("    Failed: {}", error),
        ],
    }
}

/// Final summary with counts, elapsed time and where the outputs are.
pub fn format_summary(summary: &BatchSummary, config: &ProcessConfig, root: &Path) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Done. Processed {} image(s) in {} ({} encoded, {} existing)",
            summary.processed(),
            format_duration(summary.elapsed),
            summary.count(VariantStatus::Encoded),
            summary.count(VariantStatus::Skipped),
        ),
    ];

    let failed = summary.failures().count();
    if failed > 0 {
        lines.push(format!("{} image(s) failed", failed));
    }

    lines.push(format!(
        "Large:  {}",
        output_glob(&config.large.output_dir, config.large.size, root)
    ));
    lines.push(format!(
        "Thumbs: {}",
        output_glob(&config.thumbnail.output_dir, config.thumbnail.size, root)
    ));
    lines
}

/// Print the final summary to stdout.
pub fn print_summary(summary: &BatchSummary, config: &ProcessConfig, root: &Path) {
    for line in format_summary(summary, config, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the `check` listing: per source, which variants are still missing.
pub fn format_check_output(entries: &[(SourceImage, Vec<PathBuf>)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total_missing = 0;

    for (pos, (source, missing)) in entries.iter().enumerate() {
        let header = format!("{} {}", format_index(pos + 1), source.base_name);
        if missing.is_empty() {
            lines.push(format!("{}: complete", header));
            continue;
        }
        total_missing += missing.len();
        lines.push(format!("{}: {} missing", header, missing.len()));
        for path in missing {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            lines.push(format!("    {}", name));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} source(s), {} variant(s) missing",
        entries.len(),
        total_missing
    ));
    lines
}

/// Print the `check` listing to stdout.
pub fn print_check_output(entries: &[(SourceImage, Vec<PathBuf>)]) {
    for line in format_check_output(entries) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizeConfig;
    use crate::process::SourceOutcome;
    use crate::types::{SizeClass, VariantInfo};

    fn root() -> PathBuf {
        PathBuf::from("/site")
    }

    fn process_config() -> ProcessConfig {
        let config = OptimizeConfig::default();
        ProcessConfig::new(&config, &config.paths.resolve(&root()))
    }

    fn variant(class: SizeClass, encoding: Encoding, status: VariantStatus) -> VariantInfo {
        VariantInfo {
            class,
            encoding,
            path: PathBuf::from("/unused"),
            status,
        }
    }

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn display_path_strips_root() {
        assert_eq!(
            display_path(Path::new("/site/images/photo_a.jpg"), &root()),
            "images/photo_a.jpg"
        );
        assert_eq!(
            display_path(Path::new("/elsewhere/photo_a.jpg"), &root()),
            "/elsewhere/photo_a.jpg"
        );
    }

    #[test]
    fn format_duration_switches_units() {
        assert_eq!(format_duration(Duration::from_millis(340)), "340ms");
        assert_eq!(format_duration(Duration::from_millis(2410)), "2.41s");
    }

    #[test]
    fn run_header_lists_locations() {
        let lines = format_run_header(
            &process_config(),
            Path::new("/site/images"),
            "photo_",
            &root(),
        );
        assert_eq!(lines[0], "Sources: images/photo_*.{jpg,jpeg,png}");
        assert_eq!(lines[1], "Large:   images/optimized/large (fit 1600px)");
        assert_eq!(lines[2], "Thumbs:  images/optimized/thumbs (480px square)");
    }

    #[test]
    fn nothing_to_do_message() {
        let lines = format_nothing_to_do(Path::new("/site/images"), &root());
        assert_eq!(lines, vec!["No source images found in images. Nothing to do."]);
    }

    #[test]
    fn format_processed_event() {
        let event = ProcessEvent::ImageProcessed {
            index: 1,
            source_path: PathBuf::from("/site/images/photo_dawn.jpg"),
            variants: vec![
                variant(SizeClass::Large, Encoding::Jpeg, VariantStatus::Skipped),
                variant(SizeClass::Large, Encoding::Webp, VariantStatus::Encoded),
                variant(SizeClass::Thumb, Encoding::Avif, VariantStatus::Encoded),
            ],
        };
        let lines = format_process_event(&event, &root());
        assert_eq!(lines[0], "001 photo_dawn");
        assert_eq!(lines[1], "    Source: images/photo_dawn.jpg");
        assert_eq!(lines[2], "    large jpg: exists, skipped");
        assert_eq!(lines[3], "    large webp: encoded");
        assert_eq!(lines[4], "    thumb avif: encoded");
    }

    #[test]
    fn format_failed_event() {
        let event = ProcessEvent::ImageFailed {
            index: 12,
            source_path: PathBuf::from("/site/images/photo_broken.png"),
            error: "Failed to decode: bad header".to_string(),
        };
        let lines = format_process_event(&event, &root());
        assert_eq!(
            lines,
            vec![
                "012 photo_broken",
                "    Source: images/photo_broken.png",
                "    Failed: Failed to decode: bad header",
            ]
        );
    }

    #[test]
    fn summary_reports_counts_and_globs() {
        let source = SourceImage {
            path: PathBuf::from("/site/images/photo_a.jpg"),
            base_name: "photo_a".to_string(),
        };
        let summary = BatchSummary {
            outcomes: vec![
                SourceOutcome {
                    source: source.clone(),
                    result: Ok(vec![
                        variant(SizeClass::Large, Encoding::Jpeg, VariantStatus::Encoded),
                        variant(SizeClass::Large, Encoding::Webp, VariantStatus::Skipped),
                    ]),
                },
                SourceOutcome {
                    source,
                    result: Err("boom".to_string()),
                },
            ],
            elapsed: Duration::from_millis(1500),
        };

        let lines = format_summary(&summary, &process_config(), &root());
        assert_eq!(lines[0], "");
        assert_eq!(
            lines[1],
            "Done. Processed 1 image(s) in 1.50s (1 encoded, 1 existing)"
        );
        assert_eq!(lines[2], "1 image(s) failed");
        assert_eq!(lines[3], "Large:  images/optimized/large/*@1600.{jpg,webp,avif}");
        assert_eq!(lines[4], "Thumbs: images/optimized/thumbs/*@480.{jpg,webp,avif}");
    }

    #[test]
    fn summary_without_failures_omits_failure_line() {
        let summary = BatchSummary {
            outcomes: Vec::new(),
            elapsed: Duration::from_millis(3),
        };
        let lines = format_summary(&summary, &process_config(), &root());
        assert_eq!(lines.len(), 4);
        assert!(!lines.iter().any(|l| l.contains("failed")));
    }

    #[test]
    fn check_output_lists_missing_files() {
        let complete = SourceImage {
            path: PathBuf::from("/site/images/photo_a.jpg"),
            base_name: "photo_a".to_string(),
        };
        let partial = SourceImage {
            path: PathBuf::from("/site/images/photo_b.png"),
            base_name: "photo_b".to_string(),
        };
        let entries = vec![
            (complete, Vec::new()),
            (
                partial,
                vec![
                    PathBuf::from("/site/images/optimized/large/photo_b@1600.avif"),
                    PathBuf::from("/site/images/optimized/thumbs/photo_b@480.avif"),
                ],
            ),
        ];

        let lines = format_check_output(&entries);
        assert_eq!(
            lines,
            vec![
                "001 photo_a: complete",
                "002 photo_b: 2 missing",
                "    photo_b@1600.avif",
                "    photo_b@480.avif",
                "",
                "2 source(s), 2 variant(s) missing",
            ]
        );
    }
}
