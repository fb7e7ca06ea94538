//! Page discovery.
//!
//! Walks the site root and collects every markup file the fixer should
//! inspect. Which files count as pages and which directories are skipped is
//! driven by [`ScanConfig`]:
//!
//! ```text
//! site/                       # --root
//! ├── index.html              ✓
//! ├── menu/
//! │   └── index.htm           ✓
//! ├── src/
//! │   └── Gallery.tsx         ✓
//! ├── img/
//! │   └── bread.jpg           (not markup)
//! ├── node_modules/           skipped (skip_dirs)
//! └── .git/                   skipped (skip_hidden)
//! ```
//!
//! Results are sorted so reports and diffs come out in a stable order.

use crate::config::ScanConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Site root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Find all markup pages below `root`.
pub fn find_pages(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut pages = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry, config));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_page(entry.path(), config) {
            pages.push(entry.into_path());
        }
    }

    pages.sort();
    debug!(root = %root.display(), count = pages.len(), "found pages");
    Ok(pages)
}

fn is_skipped_dir(entry: &DirEntry, config: &ScanConfig) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    (config.skip_hidden && name.starts_with('.')) || config.skip_dirs.iter().any(|d| *d == name)
}

fn is_page(path: &Path, config: &ScanConfig) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
