//! `<img>` tag discovery and rewriting.
//!
//! Markup is treated as text, not parsed into a DOM: pages may be HTML,
//! JSX or TSX, and the only edit ever made is inserting `width`/`height`
//! into an existing tag. Everything outside the tag is left byte-for-byte
//! intact.
//!
//! ## Rewrite rules
//!
//! ```text
//! <img src="a.png" alt="">          →  <img width="800" height="600" src="a.png" alt="">
//! <img src="a.png" width="800">     →  <img src="a.png" width="800" height="600">
//! <img alt="" src='b.gif' />        →  <img alt="" width="1" height="1" src='b.gif' />
//! ```
//!
//! - `width` goes immediately before `src` (appended when there is no `src`)
//! - `height` goes immediately after `width`
//! - an attribute that is already present is never duplicated or changed
//! - `/>` vs `>` is preserved, as is whitespace before it
//!
//! Attributes are split into name/value pairs first, so `width=` inside an
//! `alt` string or a JSX `{…}` expression is never taken for an attribute.

use crate::imaging::Dimensions;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::LazyLock;

/// `>` inside a quoted value or a `{…}` expression does not end the tag.
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s+((?:"[^"]*"|'[^']*'|\{[^}]*\}|[^>"'{])*?)(/?)>"#)
        .expect("valid img tag regex")
});

/// One `name`, `name=value` or `{…}` spread inside a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    /// Raw value including its quotes or braces; `None` for a bare name.
    pub value: Option<String>,
    /// Byte range of the whole attribute within [`ImgTag::attributes`].
    pub range: Range<usize>,
}

impl Attribute {
    /// Value between matching `"` or `'` quotes.
    pub fn quoted_value(&self) -> Option<&str> {
        let value = self.value.as_deref()?;
        let quote = value.chars().next().filter(|c| matches!(c, '"' | '\''))?;
        value.strip_prefix(quote)?.strip_suffix(quote)
    }
}

/// One `<img ...>` occurrence in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImgTag {
    /// Byte range of the whole tag within the page.
    pub range: Range<usize>,
    /// The tag exactly as it appears in the page.
    pub text: String,
    /// Raw attribute text between `<img` and the closing `>` / `/>`.
    pub attributes: String,
    pub attrs: Vec<Attribute>,
    pub self_closing: bool,
    /// Quoted, non-empty `src` value.
    pub src: Option<String>,
    pub has_width: bool,
    pub has_height: bool,
}

impl ImgTag {
    /// Both `width` and `height` are already present.
    pub fn is_dimensioned(&self) -> bool {
        self.has_width && self.has_height
    }

    fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// Find every `<img>` tag in document order.
pub fn find_img_tags(content: &str) -> Vec<ImgTag> {
    IMG_TAG
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attributes = caps.get(1)?.as_str();
            let mut tag = ImgTag {
                range: whole.range(),
                text: whole.as_str().to_string(),
                attributes: attributes.to_string(),
                attrs: parse_attributes(attributes),
                self_closing: caps.get(2).is_some_and(|m| !m.is_empty()),
                src: None,
                has_width: false,
                has_height: false,
            };
            tag.src = tag
                .attr("src")
                .and_then(Attribute::quoted_value)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            tag.has_width = tag.attr("width").is_some();
            tag.has_height = tag.attr("height").is_some();
            Some(tag)
        })
        .collect()
}

/// Split raw attribute text into attributes.
///
/// Values may be `"…"`, `'…'`, `{…}` (nested braces balanced) or bare up to
/// the next whitespace. An unterminated value runs to the end of the text.
pub fn parse_attributes(text: &str) -> Vec<Attribute> {
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        // JSX spread: `{...props}`
        if b == b'{' {
            pos = value_end(bytes, pos);
            continue;
        }

        let start = pos;
        while pos < bytes.len() && !ends_name(bytes[pos]) {
            pos += 1;
        }
        if pos == start {
            // stray `=`, quote or `/`
            pos += 1;
            continue;
        }
        let name = &text[start..pos];

        let mut value = None;
        let equals = skip_whitespace(bytes, pos);
        if bytes.get(equals) == Some(&b'=') {
            let value_start = skip_whitespace(bytes, equals + 1);
            pos = value_end(bytes, value_start);
            value = Some(text[value_start..pos].to_string());
        }

        attrs.push(Attribute {
            name: name.to_string(),
            value,
            range: start..pos,
        });
    }
    attrs
}

fn ends_name(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'=' | b'/' | b'"' | b'\'' | b'{' | b'>')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

fn value_end(bytes: &[u8], start: usize) -> usize {
    let rest = &bytes[start.min(bytes.len())..];
    match rest.first() {
        Some(&(quote @ (b'"' | b'\''))) => rest[1..]
            .iter()
            .position(|&b| b == quote)
            .map_or(bytes.len(), |i| start + i + 2),
        Some(b'{') => {
            let mut depth = 0usize;
            for (i, &b) in rest.iter().enumerate() {
                match b {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            return start + i + 1;
                        }
                    }
                    _ => {}
                }
            }
            bytes.len()
        }
        _ => rest
            .iter()
            .position(u8::is_ascii_whitespace)
            .map_or(bytes.len(), |i| start + i),
    }
}

/// Render `tag` with whichever of `width`/`height` it is missing.
pub fn with_dimensions(tag: &ImgTag, dims: Dimensions) -> String {
    let width = format!("width=\"{}\"", dims.width);
    let height = format!("height=\"{}\"", dims.height);
    let raw = &tag.attributes;
    let end = raw.trim_end().len();

    let (at, insert) = match (tag.has_width, tag.has_height) {
        (true, true) => (end, String::new()),
        (true, false) => match tag.attr("width") {
            Some(w) => (w.range.end, format!(" {height}")),
            None => (end, format!(" {height}")),
        },
        (false, true) => before_src_or_append(tag, end, width),
        (false, false) => before_src_or_append(tag, end, format!("{width} {height}")),
    };

    let mut attrs = raw.clone();
    attrs.insert_str(at, &insert);
    let closing = if tag.self_closing { "/>" } else { ">" };
    format!("<img {}{closing}", attrs.trim_start())
}

fn before_src_or_append(tag: &ImgTag, end: usize, new_attrs: String) -> (usize, String) {
    match tag.attr("src") {
        Some(src) => (src.range.start, format!("{new_attrs} ")),
        None if end == 0 => (0, new_attrs),
        None => (end, format!(" {new_attrs}")),
    }
}
