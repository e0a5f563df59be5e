use super::{le_u16, le_u32, ImageInfo};
use crate::models::ImageFormat;

const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;

#[inline]
pub fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

#[inline]
fn le_u24(data: &[u8], at: usize) -> Option<u32> {
    let slice = data.get(at..at + 3)?;
    Some(u32::from(slice[0]) | u32::from(slice[1]) << 8 | u32::from(slice[2]) << 16)
}

/// Reads the canvas size from the first chunk after the RIFF header.
pub fn dimensions(data: &[u8]) -> Option<ImageInfo> {
    if !is_webp(data) {
        return None;
    }

    let (width, height) = match data.get(12..16)? {
        // Lossy: frame tag (3 bytes), start code, 14-bit sizes
        b"VP8 " => {
            if data.get(23..26)? != VP8_START_CODE {
                return None;
            }
            (
                u32::from(le_u16(data, 26)? & 0x3FFF),
                u32::from(le_u16(data, 28)? & 0x3FFF),
            )
        }
        // Lossless: signature byte, then 14-bit width-1 and height-1
        b"VP8L" => {
            if *data.get(20)? != VP8L_SIGNATURE {
                return None;
            }
            let bits = le_u32(data, 21)?;
            ((bits & 0x3FFF) + 1, ((bits >> 14) & 0x3FFF) + 1)
        }
        // Extended: 24-bit canvas width-1 and height-1
        b"VP8X" => (le_u24(data, 24)? + 1, le_u24(data, 27)? + 1),
        _ => return None,
    };

    Some(ImageInfo::new(ImageFormat::Webp, width, height))
}
