//! Image header probing.
//!
//! Infers the format and pixel dimensions of an image from its leading
//! bytes. Every parser here works on a possibly truncated prefix: when the
//! bytes needed are not present yet, the probe reports `SizeProbe::Unknown`
//! and the caller decides whether to read more.
//!
//! Formats:
//! - PNG: IHDR chunk at a fixed offset (first 24 bytes)
//! - GIF: logical screen descriptor (first 10 bytes)
//! - ICO/CUR: directory entries, largest image, declared and embedded sizes
//! - JPEG: marker walk up to the first SOF segment
//! - WebP: RIFF header plus VP8, VP8L or VP8X chunk
//! - SVG: root element `width`/`height`/`viewBox` attributes

mod gif;
mod ico;
mod jpeg;
mod png;
mod reader;
mod svg;
mod webp;

use crate::models::ImageFormat;

pub use reader::{probe_prefix, ProbeReader};

/// Format and dimensions recovered from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Size announced by a container directory (ICO) when it differs in
    /// provenance from the embedded image's own header.
    pub declared: Option<(u32, u32)>,
}

impl ImageInfo {
    pub(crate) fn new(format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            declared: None,
        }
    }
}

/// Result of a header probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeProbe {
    /// The header was complete and parsed.
    Known(ImageInfo),
    /// Not enough data, or not a recognized image.
    Unknown,
}

impl SizeProbe {
    pub fn info(&self) -> Option<&ImageInfo> {
        match self {
            SizeProbe::Known(info) => Some(info),
            SizeProbe::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, SizeProbe::Known(_))
    }
}

impl From<Option<ImageInfo>> for SizeProbe {
    fn from(info: Option<ImageInfo>) -> Self {
        info.map_or(SizeProbe::Unknown, SizeProbe::Known)
    }
}

/// Identifies the image format from magic bytes.
///
/// Needs only the first 12 bytes for binary formats; SVG is recognized by
/// an `<svg` element near the start of the text.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if png::is_png(bytes) {
        Some(ImageFormat::Png)
    } else if gif::is_gif(bytes) {
        Some(ImageFormat::Gif)
    } else if jpeg::is_jpeg(bytes) {
        Some(ImageFormat::Jpeg)
    } else if webp::is_webp(bytes) {
        Some(ImageFormat::Webp)
    } else if ico::is_ico(bytes) {
        Some(ImageFormat::Ico)
    } else if svg::is_svg(bytes) {
        Some(ImageFormat::Svg)
    } else {
        None
    }
}

/// Probes the dimensions of an image from its leading bytes.
///
/// `hint` is the declared or guessed format; it is only consulted when the
/// magic bytes are inconclusive (SVG documents preceded by long comments).
pub fn probe(bytes: &[u8], hint: Option<ImageFormat>) -> SizeProbe {
    let format = match sniff_format(bytes) {
        Some(format) => format,
        None if hint == Some(ImageFormat::Svg) && svg::is_svg_document(bytes) => ImageFormat::Svg,
        None => return SizeProbe::Unknown,
    };

    let info = match format {
        ImageFormat::Png => png::dimensions(bytes),
        ImageFormat::Gif => gif::dimensions(bytes),
        ImageFormat::Ico => ico::dimensions(bytes),
        ImageFormat::Jpeg => jpeg::dimensions(bytes),
        ImageFormat::Webp => webp::dimensions(bytes),
        ImageFormat::Svg => svg::dimensions(bytes),
        ImageFormat::Unknown => None,
    };
    info.into()
}

#[inline]
pub(crate) fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]))
}

#[inline]
pub(crate) fn le_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]))
}

#[inline]
pub(crate) fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

#[inline]
pub(crate) fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}


#[cfg(test)]
mod tests {
    use super::fixtures::encode;
    use super::*;
    use image::ImageFormat as CodecFormat;

    #[test]
    fn test_sniff_format_recognizes_supported_formats() {
        assert_eq!(
            sniff_format(&encode(4, 4, CodecFormat::Png)),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            sniff_format(&encode(4, 4, CodecFormat::Gif)),
            Some(ImageFormat::Gif)
        );
        assert_eq!(
            sniff_format(&encode(4, 4, CodecFormat::Jpeg)),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            sniff_format(&encode(4, 4, CodecFormat::WebP)),
            Some(ImageFormat::Webp)
        );
        assert_eq!(
            sniff_format(&encode(16, 16, CodecFormat::Ico)),
            Some(ImageFormat::Ico)
        );
        assert_eq!(
            sniff_format(b"<?xml version=\"1.0\"?><svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Some(ImageFormat::Svg)
        );
    }

    #[test]
    fn test_sniff_format_rejects_html_and_empty() {
        assert_eq!(sniff_format(b"<!DOCTYPE html><html></html>"), None);
        assert_eq!(sniff_format(b""), None);
        assert_eq!(sniff_format(b"{\"icons\": []}"), None);
    }

    #[test]
    fn test_probe_matches_codec_dimensions() {
        for (format, expected) in [
            (CodecFormat::Png, ImageFormat::Png),
            (CodecFormat::Gif, ImageFormat::Gif),
            (CodecFormat::Jpeg, ImageFormat::Jpeg),
            (CodecFormat::WebP, ImageFormat::Webp),
            (CodecFormat::Ico, ImageFormat::Ico),
        ] {
            let bytes = encode(48, 24, format);
            let decoded = image::load_from_memory(&bytes).expect("fixture decodes");
            let info = *probe(&bytes, None).info().expect("probe succeeds");
            assert_eq!(info.format, expected);
            assert_eq!((info.width, info.height), (decoded.width(), decoded.height()));
        }
    }

    #[test]
    fn test_probe_png_prefix_of_64_bytes_matches_full_file() {
        let bytes = encode(120, 90, CodecFormat::Png);
        assert!(bytes.len() > 64);
        assert_eq!(probe(&bytes[..64], None), probe(&bytes, None));
        assert_eq!(
            probe(&bytes[..64], None).info().map(|i| (i.width, i.height)),
            Some((120, 90))
        );
    }

    #[test]
    fn test_probe_truncated_prefixes_never_panic() {
        for format in [
            CodecFormat::Png,
            CodecFormat::Gif,
            CodecFormat::Jpeg,
            CodecFormat::WebP,
            CodecFormat::Ico,
        ] {
            let bytes = encode(20, 10, format);
            for len in 0..bytes.len().min(200) {
                if let SizeProbe::Known(info) = probe(&bytes[..len], None) {
                    assert_eq!((info.width, info.height), (20, 10), "{format:?} at {len}");
                }
            }
        }
    }

    #[test]
    fn test_probe_svg_needs_hint_after_long_preamble() {
        let mut svg = String::from("<!--");
        svg.push_str(&"x".repeat(2000));
        svg.push_str("--><svg width=\"10\" height=\"20\"></svg>");
        assert_eq!(probe(svg.as_bytes(), None), SizeProbe::Unknown);
        let info = *probe(svg.as_bytes(), Some(ImageFormat::Svg))
            .info()
            .expect("hinted probe succeeds");
        assert_eq!((info.width, info.height), (10, 20));
    }
}
