//! SVG dimensions from the root element's attributes.
//!
//! Resolution order (first available wins):
//!   1. `viewBox="min-x min-y width height"` — width/height rounded
//!   2. `width="N"` and `height="N"` — both required, plain pixels only
//!
//! Only the opening `<svg ...>` tag is inspected, so `width` on a nested
//! `<rect>` or `stroke-width` can't leak into the result.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static SVG_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<svg\b([^>]*)>").expect("valid svg tag regex"));

static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)viewBox\s*=\s*["']([^"']*)["']"#).expect("valid viewBox regex")
});

static WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)width\s*=\s*["']\s*(\d+)\s*(?:px)?\s*["']"#).expect("valid width regex")
});

static HEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)height\s*=\s*["']\s*(\d+)\s*(?:px)?\s*["']"#)
        .expect("valid height regex")
});

const UTF8_BOM: &str = "\u{FEFF}";

/// True when the text starts (after an optional BOM and whitespace) with an
/// XML declaration or an `<svg` tag.
pub(crate) fn looks_like_svg(data: &[u8]) -> bool {
    // The prefix is all we need; don't decode a whole file just to classify it.
    let head = &data[..data.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches(UTF8_BOM).trim_start();
    text.starts_with("<?xml") || text.starts_with("<svg")
}

pub(crate) fn svg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let text: Cow<'_, str> = String::from_utf8_lossy(data);
    let attributes = SVG_OPEN_TAG.captures(&text)?.get(1)?.as_str();
    view_box_dimensions(attributes).or_else(|| explicit_dimensions(attributes))
}

/// The last two of the four viewBox numbers are the extent; the origin is
/// irrelevant for sizing even when it isn't `0 0`.
fn view_box_dimensions(attributes: &str) -> Option<(u32, u32)> {
    let value = VIEW_BOX.captures(attributes)?.get(1)?.as_str();
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;
    let [_, _, width, height] = numbers[..] else {
        return None;
    };
    Some((round_to_pixels(width)?, round_to_pixels(height)?))
}

fn explicit_dimensions(attributes: &str) -> Option<(u32, u32)> {
    let width = WIDTH.captures(attributes)?.get(1)?.as_str().parse().ok()?;
    let height = HEIGHT.captures(attributes)?.get(1)?.as_str().parse().ok()?;
    Some((width, height))
}

fn round_to_pixels(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded.is_finite() && rounded >= 1.0 && rounded <= f64::from(u32::MAX))
        .then_some(rounded as u32)
}
