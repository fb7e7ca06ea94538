//! Dimension probe trait and the shared [`Dimensions`] type.
//!
//! The [`DimensionProbe`] trait is the one operation the fixer needs from the
//! imaging layer: given a path, tell me its pixel size or admit you can't.
//!
//! The production implementation is [`HeaderProbe`], which sniffs the file
//! header via [`read_dimensions`](super::header::read_dimensions).

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Pixel size of an image. Both edges are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Returns `None` if either edge is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Something that can tell the pixel size of an image file.
///
/// `None` means "undetermined": missing file, unreadable file, unknown
/// format and truncated headers all collapse into it, because the caller
/// handles every one of them the same way (leave the tag alone, warn).
pub trait DimensionProbe: Sync {
    fn identify(&self, path: &Path) -> Option<Dimensions>;
}

/// Header-sniffing probe backed by [`read_dimensions`](super::header::read_dimensions).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderProbe;

impl HeaderProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DimensionProbe for HeaderProbe {
    fn identify(&self, path: &Path) -> Option<Dimensions> {
        super::header::read_dimensions(path)
    }
}
