use regex::Regex;
use std::sync::LazyLock;

use super::ImageInfo;
use crate::models::ImageFormat;

/// How far into the document the `<svg` root is searched for when sniffing.
const SNIFF_WINDOW: usize = 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// Lengths in px or unitless; `%`, `em`, `mm` and friends are not pixel sizes
static WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)width\s*=\s*["']\s*([0-9]*\.?[0-9]+)\s*(?:px)?\s*["']"#)
        .unwrap_or_else(|e| panic!("invalid SVG width pattern: {e}"))
});
static HEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)height\s*=\s*["']\s*([0-9]*\.?[0-9]+)\s*(?:px)?\s*["']"#)
        .unwrap_or_else(|e| panic!("invalid SVG height pattern: {e}"))
});
static VIEWBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)viewBox\s*=\s*["']([^"']*)["']"#)
        .unwrap_or_else(|e| panic!("invalid SVG viewBox pattern: {e}"))
});

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Offset just past a `<!DOCTYPE svg ...>` declaration, internal subset
/// included. Doctypes naming any other root, such as `html`, are rejected.
fn skip_svg_doctype(data: &[u8]) -> Option<usize> {
    let rest = &data[b"<!doctype".len()..];
    let name_at = rest.iter().position(|b| !b.is_ascii_whitespace())?;
    let name = &rest[name_at..];
    if name_at == 0
        || !starts_with_ignore_case(name, b"svg")
        || name.get(3).is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>' && *b != b'[')
    {
        return None;
    }
    let close = match (find(data, b"["), find(data, b">")) {
        (Some(open), Some(gt)) if open < gt => open + find(&data[open..], b"]")? + 1,
        _ => 0,
    };
    Some(close + find(&data[close..], b">")? + 1)
}

/// Offset of the `<svg` root element.
///
/// Only a prolog may precede the root: a byte order mark, whitespace, the
/// XML declaration and other processing instructions, comments, and an
/// SVG doctype. Any other markup first (an HTML page with an inline icon,
/// say) means the document is not SVG.
fn root_offset(data: &[u8]) -> Option<usize> {
    let mut at = if data.starts_with(UTF8_BOM) {
        UTF8_BOM.len()
    } else {
        0
    };
    loop {
        at += data[at..].iter().position(|b| !b.is_ascii_whitespace())?;
        let rest = &data[at..];
        if rest.starts_with(b"<?") {
            at += find(rest, b"?>")? + 2;
        } else if rest.starts_with(b"<!--") {
            at += 4 + find(&rest[4..], b"-->")? + 3;
        } else if starts_with_ignore_case(rest, b"<!doctype") {
            at += skip_svg_doctype(rest)?;
        } else if starts_with_ignore_case(rest, b"<svg") {
            let after = rest.get(4)?;
            return (after.is_ascii_whitespace() || matches!(*after, b'>' | b'/')).then_some(at);
        } else {
            return None;
        }
    }
}

/// True when the `<svg` root shows up within the sniffing window.
pub fn is_svg(data: &[u8]) -> bool {
    root_offset(&data[..data.len().min(SNIFF_WINDOW)]).is_some()
}

/// Like `is_svg` but searches the whole buffer, for documents whose root is
/// preceded by long comments or doctype declarations.
pub fn is_svg_document(data: &[u8]) -> bool {
    root_offset(data).is_some()
}

fn parse_length(re: &Regex, attributes: &str) -> Option<f64> {
    re.captures(attributes)?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_view_box(attributes: &str) -> Option<(f64, f64)> {
    let raw = VIEWBOX_RE.captures(attributes)?.get(1)?.as_str();
    let values: Vec<f64> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    match values.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
        _ => None,
    }
}

/// Reads the intrinsic size from the root element.
///
/// Explicit `width`/`height` win; a missing one is derived from the
/// `viewBox` aspect ratio, and with neither the `viewBox` size is used.
/// A root element without any of them yields 0x0: the image is resolution
/// independent. Returns `None` while the root start tag is incomplete.
pub fn dimensions(data: &[u8]) -> Option<ImageInfo> {
    let start = root_offset(data)?;
    let end = data[start..].iter().position(|&b| b == b'>')? + start;
    let tag = String::from_utf8_lossy(&data[start + 4..end]);

    let width = parse_length(&WIDTH_RE, &tag);
    let height = parse_length(&HEIGHT_RE, &tag);
    let view_box = parse_view_box(&tag);

    let (w, h) = match (width, height, view_box) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((vw, vh))) => (w, w * vh / vw),
        (None, Some(h), Some((vw, vh))) => (h * vw / vh, h),
        (None, None, Some((vw, vh))) => (vw, vh),
        _ => (0.0, 0.0),
    };

    Some(ImageInfo::new(
        ImageFormat::Svg,
        w.round() as u32,
        h.round() as u32,
    ))
}
