//! Image dimension sniffing — reads headers, never decodes pixels.
//!
//! | Format | Signature | Where the size lives |
//! |---|---|---|
//! | **PNG** | `89 50 4E 47` | IHDR, BE u32 at 16 / 20 |
//! | **JPEG** | `FF D8` | first SOF segment, BE u16 at +7 / +5 |
//! | **GIF** | `GIF` | Logical Screen Descriptor, LE u16 at 6 / 8 |
//! | **WebP** | `RIFF....WEBP` | `VP8 ` / `VP8L` / `VP8X` chunk header |
//! | **SVG** | `<?xml` / `<svg` | `viewBox`, else `width` / `height` |
//!
//! The module is split into:
//! - **Header**: signature dispatch and the binary formats
//! - **SVG**: attribute inspection for vector images
//! - **Probe**: [`DimensionProbe`] trait + [`HeaderProbe`], the seam the fixer
//!   talks to so it can be tested with a mock

pub mod header;
pub mod probe;
mod svg;

pub use header::{ImageFormat, detect_format, dimensions_from_bytes, read_dimensions};
pub use probe::{DimensionProbe, Dimensions, HeaderProbe};
