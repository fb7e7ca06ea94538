//! Map an `<img src>` value to a file on disk.
//!
//! | `src` | Resolves to |
//! |---|---|
//! | `https://cdn…/a.png`, `//cdn…/a.png`, `data:…` | nothing (not local) |
//! | `/img/a.png` | `<root>/img/a.png` |
//! | `img/a.png`, `../img/a.png` | relative to the page's directory |
//!
//! Query strings and fragments (`a.png?v=3#x`) are dropped. The result is
//! normalized lexically (`.` and `..` folded) without touching the
//! filesystem, so a missing image still yields a path to report.

use std::path::{Component, Path, PathBuf};

/// Resolve `src` as referenced from `page`, or `None` if it isn't a local file.
pub fn resolve_image_path(src: &str, page: &Path, root: &Path) -> Option<PathBuf> {
    let src = src.trim();
    if is_remote(src) {
        return None;
    }

    let path_part = src.split(['?', '#']).next().unwrap_or_default();
    if path_part.is_empty() {
        return None;
    }

    let joined = match path_part.strip_prefix('/') {
        Some(from_root) => root.join(from_root),
        None => page.parent().unwrap_or(root).join(path_part),
    };
    Some(normalize(&joined))
}

/// Protocol-relative (`//host/…`) or carrying a URL scheme (`https:`, `data:`, `blob:` …).
fn is_remote(src: &str) -> bool {
    if src.starts_with("//") {
        return true;
    }
    match src.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
