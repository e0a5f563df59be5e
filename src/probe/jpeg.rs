use super::{be_u16, ImageInfo};
use crate::models::ImageFormat;

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

#[inline]
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 3 && data[..2] == JPEG_SOI && data[2] == 0xFF
}

/// Start-of-frame markers carry the frame size. C4 (DHT), C8 (JPG) and CC
/// (DAC) share the range but are not frames.
#[inline]
fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Walks marker segments from SOI until a SOF segment and reads its frame
/// size. Returns `None` when the walk runs off the end of the buffer.
pub fn dimensions(data: &[u8]) -> Option<ImageInfo> {
    if !is_jpeg(data) {
        return None;
    }

    let mut pos = 2;

    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return None;
        }

        let marker = data[pos + 1];

        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }

        // Standalone markers without a length field
        if marker == 0x01 || matches!(marker, 0xD0..=0xD7) {
            pos += 2;
            continue;
        }

        // Scan data or end of image before any frame header
        if marker == 0xD9 || marker == 0xDA {
            return None;
        }

        if is_sof_marker(marker) {
            // FF Cx, length(2), precision(1), height(2), width(2)
            let height = be_u16(data, pos + 5)?;
            let width = be_u16(data, pos + 7)?;
            if width == 0 || height == 0 {
                return None;
            }
            return Some(ImageInfo::new(
                ImageFormat::Jpeg,
                u32::from(width),
                u32::from(height),
            ));
        }

        let seg_len = usize::from(be_u16(data, pos + 2)?);
        if seg_len < 2 {
            return None;
        }

        pos += 2 + seg_len;
    }

    None
}
