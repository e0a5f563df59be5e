use super::{le_u16, le_u32, png, ImageInfo};
use crate::models::ImageFormat;

const ICONDIR_SIZE: usize = 6;
const ICONDIRENTRY_SIZE: usize = 16;
const TYPE_ICON: u16 = 1;
const TYPE_CURSOR: u16 = 2;
/// Smallest BITMAPINFOHEADER field set we read: size, width, height.
const BMP_HEADER_PREFIX: usize = 12;

#[derive(Debug, Clone, Copy)]
struct DirEntry {
    width: u32,
    height: u32,
    bit_count: u16,
    offset: usize,
}

impl DirEntry {
    fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[inline]
pub fn is_ico(data: &[u8]) -> bool {
    if data.len() < ICONDIR_SIZE {
        return false;
    }
    let reserved = le_u16(data, 0);
    let kind = le_u16(data, 2);
    let count = le_u16(data, 4);
    reserved == Some(0)
        && matches!(kind, Some(TYPE_ICON) | Some(TYPE_CURSOR))
        && count.is_some_and(|c| c > 0)
}

/// A zero width or height byte in the directory means 256 pixels.
#[inline]
fn directory_dimension(byte: u8) -> u32 {
    if byte == 0 {
        256
    } else {
        u32::from(byte)
    }
}

fn read_entries(data: &[u8]) -> Option<Vec<DirEntry>> {
    let count = usize::from(le_u16(data, 4)?);
    let directory_end = ICONDIR_SIZE + count * ICONDIRENTRY_SIZE;
    if data.len() < directory_end {
        return None;
    }

    let entries = (0..count)
        .map(|i| {
            let at = ICONDIR_SIZE + i * ICONDIRENTRY_SIZE;
            DirEntry {
                width: directory_dimension(data[at]),
                height: directory_dimension(data[at + 1]),
                bit_count: le_u16(data, at + 6).unwrap_or(0),
                offset: le_u32(data, at + 12).unwrap_or(0) as usize,
            }
        })
        .collect();
    Some(entries)
}

/// Size stored in the embedded image's own header, when it is buffered.
fn embedded_dimensions(data: &[u8], offset: usize) -> Option<(u32, u32)> {
    let image = data.get(offset..)?;
    if png::starts_like_png(image) {
        return png::dimensions(image).map(|info| (info.width, info.height));
    }
    if image.len() < BMP_HEADER_PREFIX {
        return None;
    }
    // BITMAPINFOHEADER stores the XOR and AND masks stacked, doubling height
    let width = le_u32(image, 4)? as i32;
    let height = le_u32(image, 8)? as i32;
    Some((width.unsigned_abs(), height.unsigned_abs() / 2))
}

/// Picks the largest directory entry and reports its size.
///
/// Needs the whole directory (`6 + 16 * count` bytes). When the chosen
/// image's own header is also buffered its size is authoritative and the
/// directory size is kept in `declared`; otherwise the directory size is
/// reported as-is.
pub fn dimensions(data: &[u8]) -> Option<ImageInfo> {
    if !is_ico(data) {
        return None;
    }

    let entries = read_entries(data)?;
    let largest = entries
        .iter()
        .copied()
        .reduce(|best, entry| {
            let better = entry.area() > best.area()
                || (entry.area() == best.area() && entry.bit_count > best.bit_count);
            if better {
                entry
            } else {
                best
            }
        })?;

    let declared = (largest.width, largest.height);
    let (width, height) = embedded_dimensions(data, largest.offset)
        .filter(|&(w, h)| w > 0 && h > 0)
        .unwrap_or(declared);

    Some(ImageInfo {
        format: ImageFormat::Ico,
        width,
        height,
        declared: Some(declared),
    })
}
