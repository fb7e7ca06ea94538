//! CLI output formatting for `check`, `apply` and `probe`.
//!
//! # Output Format
//!
//! ## Check / Apply
//!
//! ```text
//! Image Dimension Fixer
//! Mode: dry run (no files will be modified)
//!
//! menu/index.html (2 changes)
//!     ../img/rye.jpg → 1024x683
//!     - <img src="../img/rye.jpg" alt="Rye">
//!     + <img width="1024" height="683" src="../img/rye.jpg" alt="Rye">
//!     /img/logo.svg → 240x135
//!     - <img src="/img/logo.svg">
//!     + <img width="240" height="135" src="/img/logo.svg">
//!
//! Summary
//!     Pages scanned:     3
//!     Images found:      5
//!     Images fixed:      4
//!     Skipped:           0
//!     Undetermined:      1
//!
//! Warnings
//!     menu/index.html: Cannot read dimensions for "../img/missing.gif"
//!
//! Dry run: no files were modified. Run `dimfix apply` to write 4 changes.
//! ```
//!
//! ## Probe
//!
//! ```text
//! img/rye.jpg: JPEG 1024x683
//! img/broken.png: PNG (dimensions unknown)
//! notes.txt: not a recognized image
//! gone.webp: unreadable (No such file or directory (os error 2))
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::fix::{FixReport, Mode, PageReport};
use crate::imaging::{detect_format, dimensions_from_bytes};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Collapse whitespace runs so a multi-line tag previews on one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

const ELLIPSIS: &str = "...";

/// Fit text into `max` characters, the last three being `...` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let cut = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    format!("{}{ELLIPSIS}", &text[..cut])
}

fn preview(tag: &str, width: usize) -> String {
    truncate(&single_line(tag), width)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

// ============================================================================
// Check / Apply
// ============================================================================

pub fn format_header(mode: Mode) -> Vec<String> {
    let mode_line = match mode {
        Mode::DryRun => "Mode: dry run (no files will be modified)",
        Mode::Apply => "Mode: apply (files will be modified)",
    };
    vec!["Image Dimension Fixer".to_string(), mode_line.to_string()]
}

/// One page's changes. Pages without changes produce no lines.
pub fn format_page_report(report: &PageReport, preview_width: usize) -> Vec<String> {
    if report.changes.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "{} ({})",
        report.path,
        plural(report.changes.len(), "change", "changes")
    )];
    for change in &report.changes {
        lines.push(format!(
            "{}{} \u{2192} {}",
            indent(1),
            change.src,
            change.dimensions
        ));
        lines.push(format!("{}- {}", indent(1), preview(&change.old, preview_width)));
        lines.push(format!("{}+ {}", indent(1), preview(&change.new, preview_width)));
    }
    lines
}

pub fn format_summary(report: &FixReport, max_warnings: usize) -> Vec<String> {
    let stats = &report.stats;
    let mut lines = vec![
        "Summary".to_string(),
        format!("{}Pages scanned:     {}", indent(1), stats.pages_scanned),
        format!("{}Images found:      {}", indent(1), stats.images_found),
        format!("{}Images fixed:      {}", indent(1), stats.images_fixed),
        format!("{}Skipped:           {}", indent(1), stats.images_skipped),
        format!("{}Undetermined:      {}", indent(1), stats.images_undetermined),
    ];

    let warnings: Vec<&str> = report.warnings().collect();
    if !warnings.is_empty() {
        lines.push(String::new());
        if warnings.len() <= max_warnings {
            lines.push("Warnings".to_string());
        } else {
            lines.push(format!(
                "{} (showing first {})",
                plural(warnings.len(), "warning", "warnings"),
                max_warnings
            ));
        }
        for warning in warnings.iter().take(max_warnings) {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }

    lines.push(String::new());
    let changes = plural(stats.images_fixed, "change", "changes");
    lines.push(match report.mode {
        Mode::DryRun if stats.images_fixed == 0 => {
            "Dry run: nothing to fix.".to_string()
        }
        Mode::DryRun => {
            format!("Dry run: no files were modified. Run `dimfix apply` to write {changes}.")
        }
        Mode::Apply => format!(
            "Applied {} to {}",
            changes,
            plural(report.changed_pages().count(), "page", "pages")
        ),
    });
    lines
}

pub fn print_fix_report(report: &FixReport, preview_width: usize, max_warnings: usize) {
    for line in format_header(report.mode) {
        println!("{}", line);
    }
    for page in report.changed_pages() {
        println!();
        for line in format_page_report(page, preview_width) {
            println!("{}", line);
        }
    }
    println!();
    for line in format_summary(report, max_warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// Probe
// ============================================================================

/// One line per file. `contents` is the result of reading it, so a missing
/// file is reported like any other undetermined image.
pub fn format_probe(path: &Path, contents: Result<&[u8], &std::io::Error>) -> String {
    let data = match contents {
        Ok(data) => data,
        Err(e) => return format!("{}: unreadable ({})", path.display(), e),
    };
    match (detect_format(data), dimensions_from_bytes(data)) {
        (Some(format), Some(dims)) => format!("{}: {} {}", path.display(), format, dims),
        (Some(format), None) => format!("{}: {} (dimensions unknown)", path.display(), format),
        (None, _) => format!("{}: not a recognized image", path.display()),
    }
}

pub fn print_probe(path: &Path, contents: Result<&[u8], &std::io::Error>) {
    println!("{}", format_probe(path, contents));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::{FixStats, TagChange};
    use crate::imaging::Dimensions;
    use crate::test_helpers::{jpeg_bytes, png_bytes};
    use std::path::PathBuf;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn change(src: &str, width: u32, height: u32) -> TagChange {
        TagChange {
            src: src.to_string(),
            dimensions: dims(width, height),
            old: format!(r#"<img src="{src}">"#),
            new: format!(r#"<img width="{width}" height="{height}" src="{src}">"#),
        }
    }

    fn page_report(path: &str, changes: Vec<TagChange>, warnings: Vec<&str>) -> PageReport {
        PageReport {
            path: path.to_string(),
            full_path: PathBuf::from("/site").join(path),
            stats: FixStats {
                pages_scanned: 1,
                images_found: changes.len() + warnings.len(),
                images_fixed: changes.len(),
                images_skipped: 0,
                images_undetermined: warnings.len(),
            },
            content: (!changes.is_empty()).then(String::new),
            changes,
            warnings: warnings.into_iter().map(String::from).collect(),
        }
    }

    fn fix_report(mode: Mode, pages: Vec<PageReport>) -> FixReport {
        let mut stats = FixStats::default();
        for page in &pages {
            stats += page.stats;
        }
        FixReport { mode, pages, stats }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn truncate_short() {
        assert_eq!(truncate("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate(&text, 40), text);
    }

    #[test]
    fn truncate_long() {
        let text = "a".repeat(50);
        let cut = truncate(&text, 40);
        assert_eq!(cut, format!("{}...", "a".repeat(37)));
        assert_eq!(cut.chars().count(), 40);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }

    #[test]
    fn preview_collapses_whitespace() {
        assert_eq!(
            preview("<img\n    src=\"a.png\"\n    alt=\"\">", 80),
            r#"<img src="a.png" alt="">"#
        );
    }

    // =========================================================================
    // Check / Apply
    // =========================================================================

    #[test]
    fn header_names_mode() {
        assert_eq!(
            format_header(Mode::DryRun)[1],
            "Mode: dry run (no files will be modified)"
        );
        assert_eq!(format_header(Mode::Apply)[1], "Mode: apply (files will be modified)");
    }

    #[test]
    fn page_report_lines() {
        let report = page_report("menu/index.html", vec![change("../img/rye.jpg", 1024, 683)], vec![]);
        assert_eq!(
            format_page_report(&report, 80),
            vec![
                "menu/index.html (1 change)",
                "    ../img/rye.jpg \u{2192} 1024x683",
                r#"    - <img src="../img/rye.jpg">"#,
                r#"    + <img width="1024" height="683" src="../img/rye.jpg">"#,
            ]
        );
    }

    #[test]
    fn page_report_truncates_previews() {
        let report = page_report("index.html", vec![change("a.png", 1, 1)], vec![]);
        let lines = format_page_report(&report, 10);
        assert_eq!(lines[2], "    - <img sr...");
        assert_eq!(lines[3], "    + <img wi...");
    }

    #[test]
    fn unchanged_page_prints_nothing() {
        let report = page_report("index.html", vec![], vec!["index.html: x"]);
        assert!(format_page_report(&report, 80).is_empty());
    }

    #[test]
    fn summary_counts_and_dry_run_hint() {
        let report = fix_report(
            Mode::DryRun,
            vec![page_report("index.html", vec![change("a.png", 1, 1), change("b.png", 2, 2)], vec![])],
        );
        let lines = format_summary(&report, 10);
        assert_eq!(lines[0], "Summary");
        assert_eq!(lines[1], "    Pages scanned:     1");
        assert_eq!(lines[3], "    Images fixed:      2");
        assert_eq!(
            lines.last().unwrap(),
            "Dry run: no files were modified. Run `dimfix apply` to write 2 changes."
        );
        assert!(!lines.iter().any(|l| l.contains("Warnings")));
    }

    #[test]
    fn summary_dry_run_with_nothing_to_fix() {
        let report = fix_report(Mode::DryRun, vec![page_report("index.html", vec![], vec![])]);
        assert_eq!(format_summary(&report, 10).last().unwrap(), "Dry run: nothing to fix.");
    }

    #[test]
    fn summary_applied_line() {
        let report = fix_report(
            Mode::Apply,
            vec![
                page_report("a.html", vec![change("a.png", 1, 1)], vec![]),
                page_report("b.html", vec![], vec![]),
            ],
        );
        assert_eq!(format_summary(&report, 10).last().unwrap(), "Applied 1 change to 1 page");
    }

    #[test]
    fn summary_lists_all_warnings_within_limit() {
        let report = fix_report(
            Mode::DryRun,
            vec![page_report("a.html", vec![], vec!["w1", "w2"])],
        );
        let lines = format_summary(&report, 2);
        let at = lines.iter().position(|l| l == "Warnings").unwrap();
        assert_eq!(lines[at + 1], "    w1");
        assert_eq!(lines[at + 2], "    w2");
    }

    #[test]
    fn summary_caps_warnings_over_limit() {
        let report = fix_report(
            Mode::DryRun,
            vec![
                page_report("a.html", vec![], vec!["w1", "w2"]),
                page_report("b.html", vec![], vec!["w3"]),
            ],
        );
        let lines = format_summary(&report, 2);
        let at = lines
            .iter()
            .position(|l| l == "3 warnings (showing first 2)")
            .unwrap();
        assert_eq!(lines[at + 1], "    w1");
        assert_eq!(lines[at + 2], "    w2");
        assert!(!lines.iter().any(|l| l.contains("w3")));
    }

    // =========================================================================
    // Probe
    // =========================================================================

    #[test]
    fn probe_lines() {
        let path = Path::new("img/rye.jpg");
        assert_eq!(
            format_probe(path, Ok(jpeg_bytes(1024, 683).as_slice())),
            "img/rye.jpg: JPEG 1024x683"
        );
        assert_eq!(
            format_probe(path, Ok(&png_bytes(100, 100)[..20])),
            "img/rye.jpg: PNG (dimensions unknown)"
        );
        assert_eq!(
            format_probe(path, Ok(b"plain text".as_slice())),
            "img/rye.jpg: not a recognized image"
        );
    }

    #[test]
    fn probe_unreadable_file() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            format_probe(Path::new("img/none.png"), Err(&err)),
            "img/none.png: unreadable (gone)"
        );
    }
}
