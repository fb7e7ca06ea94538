//! Dimension fixing: per page and per site.
//!
//! For every `<img>` tag in a page, in document order:
//!
//! | Tag | Outcome |
//! |---|---|
//! | already has `width` and `height` | skipped |
//! | no quoted `src` | skipped |
//! | remote URL or `data:` URI | skipped |
//! | probe can't tell the size | undetermined (warning) |
//! | otherwise | rewritten with the missing attribute(s) |
//!
//! Tags are spliced back by byte range, so two identical tags in the same
//! page are each rewritten and nothing else in the page moves.
//!
//! ## Parallel Processing
//!
//! Pages are analysed in parallel using [rayon](https://docs.rs/rayon).
//! Reports are collected in page order, so output is identical from run to
//! run. In [`Mode::Apply`] the changed pages are written only after every
//! page has been analysed: a page that fails to read aborts the run before
//! anything is modified.

use crate::config::FixConfig;
use crate::imaging::{DimensionProbe, Dimensions, HeaderProbe};
use crate::markup::{find_img_tags, with_dimensions};
use crate::resolve::resolve_image_path;
use crate::scan::{self, ScanError};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum FixError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Failed to read page {path}: {source}")]
    ReadPage {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Page is not valid UTF-8: {0}")]
    NotUtf8(PathBuf),
    #[error("Failed to write page {path}: {source}")]
    WritePage {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether changes are only reported or also written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    DryRun,
    Apply,
}

/// One rewritten `<img>` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChange {
    pub src: String,
    pub dimensions: Dimensions,
    pub old: String,
    pub new: String,
}

/// Tag and page counters. Summed across pages for the site total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixStats {
    pub pages_scanned: usize,
    pub images_found: usize,
    pub images_fixed: usize,
    /// Already dimensioned, no `src`, or not a local file.
    pub images_skipped: usize,
    /// Local reference whose dimensions couldn't be read.
    pub images_undetermined: usize,
}

impl std::ops::AddAssign for FixStats {
    fn add_assign(&mut self, other: Self) {
        self.pages_scanned += other.pages_scanned;
        self.images_found += other.images_found;
        self.images_fixed += other.images_fixed;
        self.images_skipped += other.images_skipped;
        self.images_undetermined += other.images_undetermined;
    }
}

/// Result of fixing a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Page path relative to the site root, `/`-separated.
    pub path: String,
    #[serde(skip)]
    pub full_path: PathBuf,
    pub changes: Vec<TagChange>,
    /// `"<page>: Cannot read dimensions for \"<src>\""`, one per undetermined tag.
    pub warnings: Vec<String>,
    pub stats: FixStats,
    /// Rewritten page content; `None` when nothing changed.
    #[serde(skip)]
    pub content: Option<String>,
}

/// Result of fixing a whole site.
#[derive(Debug, Clone, Serialize)]
pub struct FixReport {
    pub mode: Mode,
    pub pages: Vec<PageReport>,
    pub stats: FixStats,
}

impl FixReport {
    /// All warnings in page order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.warnings.iter().map(String::as_str))
    }

    /// Pages with at least one change.
    pub fn changed_pages(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|p| !p.changes.is_empty())
    }
}

/// Relative, `/`-separated display path for reports.
pub fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Fix every `<img>` in one page's content.
///
/// Pure apart from the probe: nothing is read or written here.
pub fn fix_page(
    content: &str,
    page: &Path,
    root: &Path,
    probe: &impl DimensionProbe,
) -> PageReport {
    let rel = display_path(page, root);
    let mut stats = FixStats {
        pages_scanned: 1,
        ..FixStats::default()
    };
    let mut changes = Vec::new();
    let mut warnings = Vec::new();
    let mut output = String::with_capacity(content.len());
    let mut copied_up_to = 0;

    for tag in find_img_tags(content) {
        stats.images_found += 1;

        if tag.is_dimensioned() {
            stats.images_skipped += 1;
            continue;
        }
        let Some(src) = tag.src.as_deref() else {
            stats.images_skipped += 1;
            continue;
        };
        let Some(image_path) = resolve_image_path(src, page, root) else {
            stats.images_skipped += 1;
            continue;
        };
        let Some(dimensions) = probe.identify(&image_path) else {
            warn!(page = %rel, src, "cannot read image dimensions");
            stats.images_undetermined += 1;
            warnings.push(format!("{rel}: Cannot read dimensions for \"{src}\""));
            continue;
        };

        let new_tag = with_dimensions(&tag, dimensions);
        output.push_str(&content[copied_up_to..tag.range.start]);
        output.push_str(&new_tag);
        copied_up_to = tag.range.end;

        stats.images_fixed += 1;
        changes.push(TagChange {
            src: src.to_string(),
            dimensions,
            old: tag.text.clone(),
            new: new_tag,
        });
    }

    let content = if changes.is_empty() {
        None
    } else {
        output.push_str(&content[copied_up_to..]);
        Some(output)
    };

    PageReport {
        path: rel,
        full_path: page.to_path_buf(),
        changes,
        warnings,
        stats,
        content,
    }
}

/// Fix every page below `root` using the header-sniffing probe.
pub fn fix_site(root: &Path, config: &FixConfig, mode: Mode) -> Result<FixReport, FixError> {
    fix_site_with_probe(&HeaderProbe::new(), root, config, mode)
}

/// Fix every page below `root` using a specific probe (allows testing with mock).
pub fn fix_site_with_probe(
    probe: &impl DimensionProbe,
    root: &Path,
    config: &FixConfig,
    mode: Mode,
) -> Result<FixReport, FixError> {
    let pages = scan::find_pages(root, &config.scan)?;

    let reports: Vec<PageReport> = pages
        .par_iter()
        .map(|page| {
            let content = load_page(page)?;
            let report = fix_page(&content, page, root, probe);
            info!(
                page = %report.path,
                images = report.stats.images_found,
                fixable = report.changes.len(),
                "page scanned"
            );
            Ok(report)
        })
        .collect::<Result<_, FixError>>()?;

    if mode == Mode::Apply {
        for report in &reports {
            if let Some(content) = &report.content {
                std::fs::write(&report.full_path, content).map_err(|source| {
                    FixError::WritePage {
                        path: report.full_path.clone(),
                        source,
                    }
                })?;
                info!(page = %report.path, changes = report.changes.len(), "page updated");
            }
        }
    }

    let mut stats = FixStats::default();
    for report in &reports {
        stats += report.stats;
    }

    Ok(FixReport {
        mode,
        pages: reports,
        stats,
    })
}

fn load_page(path: &Path) -> Result<String, FixError> {
    let bytes = std::fs::read(path).map_err(|source| FixError::ReadPage {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| FixError::NotUtf8(path.to_path_buf()))
}
