//! Declared icon size extraction.
//!
//! Sizes come from the `sizes` attribute (`"16x16 32x32"`, `"any"`) or,
//! failing that, from a `NNxNN` pattern in the icon's filename.

use regex::Regex;
use std::sync::LazyLock;

static FILENAME_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2,4})x(\d{2,4})")
        .unwrap_or_else(|e| panic!("invalid filename size pattern: {e}"))
});

/// Parses one `WxH` token, keeping digits only so that markup like
/// `192x192+` still yields a size. Accepts `x`, `X` and `×`.
fn parse_size_token(token: &str) -> Option<(u32, u32)> {
    let (w, h) = token.split_once(['x', 'X', '×'])?;
    let digits = |s: &str| -> Option<u32> {
        let kept: String = s.chars().filter(char::is_ascii_digit).collect();
        kept.parse().ok()
    };
    let (w, h) = (digits(w)?, digits(h)?);
    (w > 0 && h > 0).then_some((w, h))
}

/// Largest size declared in a `sizes` attribute. `any` counts as unknown.
pub fn parse_sizes(sizes: &str) -> Option<(u32, u32)> {
    sizes
        .split_whitespace()
        .filter(|token| !token.eq_ignore_ascii_case("any"))
        .filter_map(parse_size_token)
        .max_by_key(|&(w, h)| u64::from(w) * u64::from(h))
}

/// Size embedded in a filename such as `apple-touch-icon-152x152.png`.
pub fn size_from_filename(reference: &str) -> Option<(u32, u32)> {
    let caps = FILENAME_SIZE_RE.captures(reference)?;
    let w = caps.get(1)?.as_str().parse().ok()?;
    let h = caps.get(2)?.as_str().parse().ok()?;
    Some((w, h))
}

/// Declared dimensions for a tag: `sizes` attribute first, then the
/// filename, else unknown (0x0).
pub fn declared_dimensions(sizes: Option<&str>, reference: &str) -> (u32, u32) {
    sizes
        .and_then(parse_sizes)
        .or_else(|| size_from_filename(reference))
        .unwrap_or((0, 0))
}
