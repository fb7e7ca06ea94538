//! Signature-based format detection and header parsing for binary formats.
//!
//! Every reader here works on a borrowed byte slice and goes through
//! [`bytes_at`], which returns `None` instead of indexing past the end. A
//! truncated or corrupt header therefore ends up as "undetermined", the same
//! as an unknown format or a missing file; nothing in this module panics on
//! hostile input.
//!
//! Formats are tried in a fixed order (PNG, JPEG, GIF, WebP, SVG). The first
//! signature that matches owns the file: a PNG signature followed by garbage
//! is a broken PNG, not a candidate for the next format.

use super::probe::Dimensions;
use super::svg;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Image formats whose dimensions can be sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Svg,
}

impl ImageFormat {
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::WebP => "WebP",
            ImageFormat::Svg => "SVG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8];
const GIF_SIGNATURE: &[u8] = b"GIF";
const RIFF_SIGNATURE: &[u8] = b"RIFF";
const WEBP_FORM_TYPE: &[u8] = b"WEBP";

/// Classify a byte buffer by its leading signature.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if data.starts_with(JPEG_SIGNATURE) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(GIF_SIGNATURE) {
        Some(ImageFormat::Gif)
    } else if data.starts_with(RIFF_SIGNATURE) && data.get(8..12) == Some(WEBP_FORM_TYPE) {
        Some(ImageFormat::WebP)
    } else if svg::looks_like_svg(data) {
        Some(ImageFormat::Svg)
    } else {
        None
    }
}

/// Read a file and sniff its pixel dimensions.
///
/// Returns `None` for a missing or unreadable file as well as for any file
/// whose header can't be understood. Never returns zero-sized dimensions.
pub fn read_dimensions(path: &Path) -> Option<Dimensions> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "image not readable");
            return None;
        }
    };

    let dims = dimensions_from_bytes(&data);
    debug!(
        path = %path.display(),
        format = ?detect_format(&data),
        dimensions = ?dims,
        "sniffed image header"
    );
    dims
}

/// Sniff pixel dimensions from an in-memory file.
pub fn dimensions_from_bytes(data: &[u8]) -> Option<Dimensions> {
    let (width, height) = match detect_format(data)? {
        ImageFormat::Png => png_dimensions(data),
        ImageFormat::Jpeg => jpeg_dimensions(data),
        ImageFormat::Gif => gif_dimensions(data),
        ImageFormat::WebP => webp_dimensions(data),
        ImageFormat::Svg => svg::svg_dimensions(data),
    }?;
    Dimensions::new(width, height)
}

// ---------------------------------------------------------------------------
// Bounds-checked readers
// ---------------------------------------------------------------------------

/// Copy `N` bytes starting at `offset`, or `None` if they aren't all there.
fn bytes_at<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    data.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

fn be_u16(data: &[u8], offset: usize) -> Option<u16> {
    bytes_at(data, offset).map(u16::from_be_bytes)
}

fn be_u32(data: &[u8], offset: usize) -> Option<u32> {
    bytes_at(data, offset).map(u32::from_be_bytes)
}

fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    bytes_at(data, offset).map(u16::from_le_bytes)
}

fn le_u24(data: &[u8], offset: usize) -> Option<u32> {
    bytes_at(data, offset).map(|[b0, b1, b2]: [u8; 3]| u32::from_le_bytes([b0, b1, b2, 0]))
}

fn le_u32(data: &[u8], offset: usize) -> Option<u32> {
    bytes_at(data, offset).map(u32::from_le_bytes)
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

/// IHDR is always the first chunk: 8-byte signature, 4-byte length,
/// `IHDR`, then width and height.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Some((be_u32(data, 16)?, be_u32(data, 20)?))
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

const JPEG_SOS: u8 = 0xDA;
const JPEG_EOI: u8 = 0xD9;

/// Start-Of-Frame markers: `C0`–`CF` minus DHT (`C4`), JPG (`C8`) and
/// DAC (`CC`), which share the range but carry no frame header.
fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Walk marker segments until the first SOF.
///
/// Segment layout: `FF`, marker, BE u16 length (which counts itself but not
/// the two marker bytes), payload. In a SOF payload the precision byte comes
/// first, then height, then width.
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = JPEG_SIGNATURE.len();
    loop {
        let [prefix, marker] = bytes_at::<2>(data, pos)?;
        if prefix != 0xFF {
            return None;
        }
        // Fill bytes: any number of FF may pad the gap before a marker.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if is_sof_marker(marker) {
            let height = be_u16(data, pos + 5)?;
            let width = be_u16(data, pos + 7)?;
            return Some((width.into(), height.into()));
        }
        // Entropy-coded data or end of image: no frame header is coming.
        if marker == JPEG_SOS || marker == JPEG_EOI {
            return None;
        }
        let length = be_u16(data, pos + 2)?;
        pos += 2 + usize::from(length);
    }
}

// ---------------------------------------------------------------------------
// GIF
// ---------------------------------------------------------------------------

/// Logical Screen Descriptor follows the 6-byte `GIF87a`/`GIF89a` header.
fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Some((le_u16(data, 6)?.into(), le_u16(data, 8)?.into()))
}

// ---------------------------------------------------------------------------
// WebP
// ---------------------------------------------------------------------------

const WEBP_DIMENSION_MASK: u32 = 0x3FFF;

/// Dispatch on the first chunk's FourCC at offset 12.
fn webp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    match data.get(12..16)? {
        // Lossy: after the 3-byte frame tag and `9D 01 2A` start code. The
        // top two bits of each field are a scaling hint.
        b"VP8 " => {
            let width = u32::from(le_u16(data, 26)?) & WEBP_DIMENSION_MASK;
            let height = u32::from(le_u16(data, 28)?) & WEBP_DIMENSION_MASK;
            Some((width, height))
        }
        // Lossless: after the `2F` signature byte, two 14-bit fields
        // storing dimension minus one.
        b"VP8L" => {
            let bits = le_u32(data, 21)?;
            let width = (bits & WEBP_DIMENSION_MASK) + 1;
            let height = ((bits >> 14) & WEBP_DIMENSION_MASK) + 1;
            Some((width, height))
        }
        // Extended: flags and reserved bytes, then two 24-bit canvas
        // fields storing dimension minus one.
        b"VP8X" => Some((le_u24(data, 24)? + 1, le_u24(data, 27)? + 1)),
        _ => None,
    }
}
