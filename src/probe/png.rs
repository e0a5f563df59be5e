use super::{be_u32, ImageInfo};
use crate::models::ImageFormat;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const IHDR_CHUNK_TYPE: &[u8; 4] = b"IHDR";

#[inline]
pub fn is_png(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == PNG_SIGNATURE
}

/// True when `data` is a (possibly incomplete) prefix of a PNG signature.
#[inline]
pub fn starts_like_png(data: &[u8]) -> bool {
    let n = data.len().min(PNG_SIGNATURE.len());
    n > 0 && data[..n] == PNG_SIGNATURE[..n]
}

/// Reads width and height from the IHDR chunk, which the format requires to
/// come first. Needs the first 24 bytes.
pub fn dimensions(data: &[u8]) -> Option<ImageInfo> {
    if !is_png(data) || data.len() < 24 {
        return None;
    }

    if &data[12..16] != IHDR_CHUNK_TYPE {
        return None;
    }

    let width = be_u32(data, 16)?;
    let height = be_u32(data, 20)?;
    Some(ImageInfo::new(ImageFormat::Png, width, height))
}
