//! Shared test utilities for the dimfix test suite.
//!
//! Provides minimal, hand-assembled image headers (enough bytes for the
//! sniffer, no pixel data) and a helper for laying out a throwaway site.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let site = setup_site(&[
//!     ("index.html", page(r#"<img src="img/logo.png">"#)),
//!     ("img/logo.png", png_bytes(64, 32)),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Image headers
// =========================================================================

/// PNG signature plus a complete IHDR chunk (CRC left zeroed).
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    // bit depth, colour type, compression, filter, interlace
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data
}

/// A baseline SOF0 segment for a 3-component image.
pub fn sof0_segment(width: u16, height: u16) -> Vec<u8> {
    let mut seg = vec![0xFF, 0xC0, 0x00, 0x11, 0x08];
    seg.extend_from_slice(&height.to_be_bytes());
    seg.extend_from_slice(&width.to_be_bytes());
    seg.push(3);
    for id in 1..=3u8 {
        seg.extend_from_slice(&[id, 0x11, 0x00]);
    }
    seg
}

/// SOI, APP0 (JFIF), DQT, SOF0, EOI.
pub fn jpeg_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    // APP0: length 16 = 2 (length) + 5 ("JFIF\0") + 9
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\0");
    data.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    // DQT: length 67 = 2 + 1 (table id) + 64 (table)
    data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[0x01; 64]);
    data.extend_from_slice(&sof0_segment(width, height));
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// Index of the first `FF <marker>` pair.
pub fn find_marker(data: &[u8], marker: u8) -> Option<usize> {
    data.windows(2).position(|w| w == [0xFF, marker])
}

/// GIF89a header plus Logical Screen Descriptor and trailer.
pub fn gif_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut data = b"GIF89a".to_vec();
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    // flags, background colour index, pixel aspect ratio
    data.extend_from_slice(&[0x00, 0x00, 0x00]);
    data.push(0x3B);
    data
}

fn riff_webp(chunk: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut body = b"WEBP".to_vec();
    body.extend_from_slice(chunk);
    body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    body.extend_from_slice(payload);

    let mut data = b"RIFF".to_vec();
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    data.extend_from_slice(&body);
    data
}

/// Lossy WebP: frame tag, start code, 14-bit width/height.
pub fn webp_vp8_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut payload = vec![0x10, 0x02, 0x00, 0x9D, 0x01, 0x2A];
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    riff_webp(b"VP8 ", &payload)
}

/// Lossless WebP: signature byte, then (width-1) and (height-1) packed as
/// two 14-bit fields. Both edges must be in `1..=16384`.
pub fn webp_vp8l_bytes(width: u32, height: u32) -> Vec<u8> {
    let bits = (width - 1) | ((height - 1) << 14);
    let mut payload = vec![0x2F];
    payload.extend_from_slice(&bits.to_le_bytes());
    riff_webp(b"VP8L", &payload)
}

/// Extended WebP: flags, reserved, then (width-1) and (height-1) as 24-bit LE.
pub fn webp_vp8x_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00, 0x00, 0x00];
    payload.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    payload.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
    riff_webp(b"VP8X", &payload)
}

// =========================================================================
// Site fixtures
// =========================================================================

/// Wrap a body fragment in a minimal HTML document.
pub fn page(body: &str) -> Vec<u8> {
    format!("<!doctype html>\n<html><body>\n{body}\n</body></html>\n").into_bytes()
}

/// Write each `(relative path, contents)` pair into a fresh temp directory.
pub fn setup_site(files: &[(&str, Vec<u8>)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        write_file(tmp.path(), rel, contents);
    }
    tmp
}

pub fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn read_page(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}
