//! Full-image confirmation with the `image` codec.

use bytes::Bytes;
use log::debug;

use crate::models::{DecodedImage, ImageFormat};
use crate::probe::{probe, SizeProbe};

fn codec_format(format: ImageFormat) -> Option<image::ImageFormat> {
    match format {
        ImageFormat::Ico => Some(image::ImageFormat::Ico),
        ImageFormat::Png => Some(image::ImageFormat::Png),
        ImageFormat::Gif => Some(image::ImageFormat::Gif),
        ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
        ImageFormat::Webp => Some(image::ImageFormat::WebP),
        ImageFormat::Svg | ImageFormat::Unknown => None,
    }
}

/// Decodes a complete resource of the sniffed `format`.
///
/// Returns the authoritative dimensions and decoded image, or `None` when
/// the codec rejects the bytes. SVG is not rasterized: its size comes from
/// the root element and the source is kept as is.
pub fn decode(bytes: Bytes, format: ImageFormat) -> Option<(u32, u32, DecodedImage)> {
    if format == ImageFormat::Svg {
        let (width, height) = match probe(&bytes, Some(ImageFormat::Svg)) {
            SizeProbe::Known(info) => (info.width, info.height),
            SizeProbe::Unknown => (0, 0),
        };
        return Some((width, height, DecodedImage::Vector(bytes)));
    }

    let codec = codec_format(format)?;
    match image::load_from_memory_with_format(&bytes, codec) {
        Ok(img) => Some((img.width(), img.height(), DecodedImage::Bitmap(img))),
        Err(e) => {
            debug!("Codec rejected {format} favicon ({} bytes): {e}", bytes.len());
            None
        }
    }
}
