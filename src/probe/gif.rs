use super::{le_u16, ImageInfo};
use crate::models::ImageFormat;

#[inline]
pub fn is_gif(data: &[u8]) -> bool {
    data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")
}

/// Reads the logical screen size, stored little-endian right after the
/// six-byte signature.
pub fn dimensions(data: &[u8]) -> Option<ImageInfo> {
    if !is_gif(data) {
        return None;
    }
    let width = le_u16(data, 6)?;
    let height = le_u16(data, 8)?;
    Some(ImageInfo::new(
        ImageFormat::Gif,
        u32::from(width),
        u32::from(height),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_from_screen_descriptor() {
        let data = b"GIF89a\xf4\x01\xc8\x00";
        let info = dimensions(data).expect("10 bytes are enough");
        assert_eq!((info.width, info.height), (500, 200));
    }

    #[test]
    fn test_dimensions_truncated() {
        assert!(dimensions(b"GIF89a\xf4\x01\xc8").is_none());
    }
}
