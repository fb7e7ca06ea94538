//! # dimfix
//!
//! Adds missing `width`/`height` attributes to `<img>` tags in a static
//! site, so browsers can reserve layout space before images load.
//!
//! Image sizes are read from file headers only: no decoding, no image
//! library, no system dependencies.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      site root  →  page list        (walk, filter by extension)
//! 2. Fix       page       →  PageReport       (find tags, resolve src, sniff size, rewrite)
//! 3. Report    FixReport  →  stdout / pages   (print diff, write back in apply mode)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the site root and collects markup pages |
//! | [`markup`] | Finds `<img>` tags and renders them with added dimensions |
//! | [`resolve`] | Maps an `src` value to a local file path |
//! | [`imaging`] | Header sniffing for PNG, JPEG, GIF, WebP and SVG |
//! | [`fix`] | Per-page and per-site fixing, parallel over pages |
//! | [`config`] | `dimfix.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for reports and probes |
//!
//! # Design Decisions
//!
//! ## Headers, Not Decoders
//!
//! Every supported format stores its canvas size in the first few dozen
//! bytes (JPEG: in the first SOF segment). Reading those is orders of
//! magnitude cheaper than decoding, and a truncated or corrupt file simply
//! yields "unknown" instead of an error.
//!
//! ## Text Edits, Not a DOM
//!
//! Pages may be HTML, JSX or TSX. Rather than parse three grammars, tags are
//! located with a regex and spliced back by byte range, so the rest of the
//! file is never reformatted.
//!
//! ## Dry Run by Default
//!
//! `check` reports what would change; only `apply` writes. A run that hits an
//! unreadable page fails before any page is written.

pub mod config;
pub mod fix;
pub mod imaging;
pub mod markup;
pub mod output;
pub mod resolve;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
