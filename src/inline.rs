//! Inline `data:` favicon decoding.
//!
//! Parses a data URL, decodes its payload (base64 or percent-encoded) and
//! checks that the bytes sniff as a supported image before producing a
//! candidate. Failures are returned as `DecodeError` values so the caller
//! can drop the candidate and carry on.

use base64::Engine;
use bytes::Bytes;
use log::debug;
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};

use crate::error_handling::DecodeError;
use crate::models::{Candidate, ImageFormat, SourceKind};
use crate::probe::{probe, sniff_format};

const DATA_SCHEME: &str = "data:";

/// Prefix of the synthetic identifier given to inline favicons.
pub const INLINE_URL_PREFIX: &str = "inline:sha256:";

/// True when the reference uses the `data:` scheme.
pub fn is_data_url(reference: &str) -> bool {
    let trimmed = reference.trim_start();
    trimmed
        .get(..DATA_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_SCHEME))
}

/// Header of a data URL: `data:[<mime>][;charset=…][;base64],`
struct DataUrlHeader<'a> {
    mime: &'a str,
    base64: bool,
}

fn split_data_url(data_url: &str) -> Result<(DataUrlHeader<'_>, &str), DecodeError> {
    let trimmed = data_url.trim();
    if !is_data_url(trimmed) {
        return Err(DecodeError::NotADataUrl);
    }
    let rest = &trimmed[DATA_SCHEME.len()..];
    let (header, payload) = rest.split_once(',').ok_or(DecodeError::NotADataUrl)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim();
    let base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));
    Ok((DataUrlHeader { mime, base64 }, payload))
}

fn decode_payload(header: &DataUrlHeader<'_>, payload: &str) -> Result<Vec<u8>, DecodeError> {
    // Payloads copied from stylesheets are sometimes percent-encoded on top
    let unescaped: Vec<u8> = percent_decode_str(payload).collect();
    if !header.base64 {
        return Ok(unescaped);
    }
    let compact: Vec<u8> = unescaped
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|_| DecodeError::InvalidBase64)
}

/// Decodes an inline favicon into a candidate carrying its payload.
///
/// # Errors
///
/// - `NotADataUrl` when the input lacks the `data:` scheme or `,` separator
/// - `InvalidBase64` on bad characters or padding
/// - `Empty` when the payload decodes to nothing
/// - `UnsupportedFormat` when the bytes do not sniff as a supported image
pub fn decode(data_url: &str) -> Result<Candidate, DecodeError> {
    let (header, payload) = split_data_url(data_url)?;
    let bytes = decode_payload(&header, payload)?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let declared = ImageFormat::from_mime(header.mime);
    let probed = probe(&bytes, Some(declared));
    let format = sniff_format(&bytes)
        .or_else(|| probed.info().map(|info| info.format))
        .ok_or(DecodeError::UnsupportedFormat)?;

    if declared.is_known() && declared != format {
        debug!("Inline favicon declared as {declared} but sniffed as {format}");
    }

    let (width, height) = probed
        .info()
        .map(|info| (info.width, info.height))
        .unwrap_or((0, 0));

    Ok(Candidate {
        url: None,
        raw_reference: data_url.trim().to_string(),
        width,
        height,
        format,
        source_kind: SourceKind::InlineBase64,
        inline: true,
        payload: Some(Bytes::from(bytes)),
    })
}

/// Stable hex SHA-256 digest of decoded payload bytes.
pub fn content_digest(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Synthetic identifier used as `absolute_url` for inline favicons.
pub fn inline_url(payload: &[u8]) -> String {
    format!("{INLINE_URL_PREFIX}{}", content_digest(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fixtures::encode;
    use image::ImageFormat as CodecFormat;

    const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!(
            "data:{mime};base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn test_decode_png_1x1() {
        let candidate = decode(PNG_1X1).expect("valid inline PNG");
        assert!(candidate.inline);
        assert_eq!(candidate.url, None);
        assert_eq!(candidate.format, ImageFormat::Png);
        assert_eq!((candidate.width, candidate.height), (1, 1));
        assert_eq!(candidate.source_kind, SourceKind::InlineBase64);
        assert_eq!(candidate.raw_reference, PNG_1X1);
    }

    #[test]
    fn test_decode_then_probe_matches_codec() {
        for (codec, expected) in [
            (CodecFormat::Png, ImageFormat::Png),
            (CodecFormat::Gif, ImageFormat::Gif),
            (CodecFormat::Ico, ImageFormat::Ico),
        ] {
            let bytes = encode(24, 24, codec);
            let candidate = decode(&data_url("image/png", &bytes)).expect("valid payload");
            assert_eq!(candidate.format, expected, "sniffed format wins over mime");
            let decoded = image::load_from_memory(&bytes).expect("codec decodes");
            assert_eq!(
                (candidate.width, candidate.height),
                (decoded.width(), decoded.height())
            );
        }
    }

    #[test]
    fn test_decode_percent_encoded_svg() {
        let url = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20viewBox%3D%220%200%2016%2016%22%3E%3C%2Fsvg%3E";
        let candidate = decode(url).expect("valid inline SVG");
        assert_eq!(candidate.format, ImageFormat::Svg);
        assert_eq!((candidate.width, candidate.height), (16, 16));
    }

    #[test]
    fn test_decode_tolerates_whitespace_in_base64() {
        let url = PNG_1X1.replacen("iVBOR", "iVB\n OR", 1);
        assert!(decode(&url).is_ok());
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert_eq!(
            decode("data:image/png;base64,@@@not-base64@@@"),
            Err(DecodeError::InvalidBase64)
        );
        // Broken padding
        assert_eq!(
            decode("data:image/png;base64,iVBORw0KGgo"),
            Err(DecodeError::InvalidBase64)
        );
    }

    #[test]
    fn test_decode_empty_payload() {
        assert_eq!(decode("data:image/png;base64,"), Err(DecodeError::Empty));
    }

    #[test]
    fn test_decode_unsupported_format() {
        let url = data_url("image/png", b"this is plain text, not an image");
        assert_eq!(decode(&url), Err(DecodeError::UnsupportedFormat));
    }

    #[test]
    fn test_decode_not_a_data_url() {
        assert_eq!(decode("https://example.com/x.png"), Err(DecodeError::NotADataUrl));
        assert_eq!(decode("data:image/png;base64"), Err(DecodeError::NotADataUrl));
    }

    #[test]
    fn test_is_data_url_case_insensitive() {
        assert!(is_data_url("  DATA:image/png;base64,AAAA"));
        assert!(!is_data_url("/data/icon.png"));
    }

    #[test]
    fn test_inline_url_is_stable() {
        let a = inline_url(b"same bytes");
        assert_eq!(a, inline_url(b"same bytes"));
        assert_ne!(a, inline_url(b"other bytes"));
        assert!(a.starts_with(INLINE_URL_PREFIX));
        assert_eq!(a.len(), INLINE_URL_PREFIX.len() + 64);
    }
}
