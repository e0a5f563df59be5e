//! Favicon data model.
//!
//! Records flow through the pipeline in this order:
//! `Candidate` (raw, from markup/inline data/convention) → `Favicon`
//! (resolved and deduplicated) → `RealFavicon` (fetched and validated).

use bytes::Bytes;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_handling::InvalidReason;

/// Image formats a favicon can take.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Ico,
    Png,
    Svg,
    Gif,
    Jpeg,
    Webp,
    #[default]
    Unknown,
}

impl ImageFormat {
    /// Maps a file extension (without the dot) onto a format.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "ico" | "cur" => ImageFormat::Ico,
            "png" => ImageFormat::Png,
            "svg" | "svgz" => ImageFormat::Svg,
            "gif" => ImageFormat::Gif,
            "jpg" | "jpeg" | "jfif" => ImageFormat::Jpeg,
            "webp" => ImageFormat::Webp,
            _ => ImageFormat::Unknown,
        }
    }

    /// Maps a mime type such as `image/svg+xml;charset=utf-8` onto a format.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/x-icon" | "image/vnd.microsoft.icon" | "image/ico" | "image/icon" => {
                ImageFormat::Ico
            }
            "image/png" | "image/apng" => ImageFormat::Png,
            "image/svg+xml" | "image/svg" => ImageFormat::Svg,
            "image/gif" => ImageFormat::Gif,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => ImageFormat::Jpeg,
            "image/webp" => ImageFormat::Webp,
            _ => ImageFormat::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != ImageFormat::Unknown
    }
}

/// Where a candidate came from.
///
/// Variants are declared in tie-break priority order, highest first, so the
/// derived `Ord` sorts the most authoritative source first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `<link rel="icon">`
    LinkIcon,
    /// `<link rel="shortcut icon">`
    LinkShortcutIcon,
    /// `<link rel="apple-touch-icon">` and `-precomposed`
    LinkAppleTouch,
    /// `<link rel="mask-icon">`
    LinkMaskIcon,
    /// `<meta name="msapplication-…">` tile images
    Meta,
    /// An icon listed inside a web app manifest
    ManifestIcon,
    /// `<link rel="manifest">` marker, resolved by `expand_manifests`
    Manifest,
    /// A `data:` URL decoded in place
    InlineBase64,
    /// A conventional, unadvertised path
    Fallback,
}

impl SourceKind {
    /// Tie-break rank; lower is stronger.
    pub fn priority(&self) -> u8 {
        *self as u8
    }
}

/// A raw, unvalidated favicon reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Reference to fetch; `None` only for inline entries.
    pub url: Option<String>,
    /// Attribute value as written (a data URL for inline entries).
    pub raw_reference: String,
    /// Declared width, 0 when unknown.
    pub width: u32,
    /// Declared height, 0 when unknown.
    pub height: u32,
    pub format: ImageFormat,
    pub source_kind: SourceKind,
    pub inline: bool,
    /// Decoded bytes of an inline entry.
    pub payload: Option<Bytes>,
}

impl Candidate {
    /// Creates a network candidate from a (possibly relative) reference.
    pub fn network(
        reference: &str,
        source_kind: SourceKind,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            url: Some(reference.to_string()),
            raw_reference: reference.to_string(),
            width,
            height,
            format,
            source_kind,
            inline: false,
            payload: None,
        }
    }

    /// Declared pixel area, 0 when either dimension is unknown.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A resolved, deduplicated favicon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favicon {
    /// Resolved network URL, or `inline:sha256:<digest>` for inline content.
    pub absolute_url: String,
    /// Attribute value as written.
    pub raw_reference: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub source_kind: SourceKind,
    pub inline: bool,
    #[serde(skip)]
    pub payload: Option<Bytes>,
}

impl Favicon {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True for `<link rel="manifest">` entries that still need expanding.
    pub fn is_manifest_marker(&self) -> bool {
        self.source_kind == SourceKind::Manifest
    }
}

impl From<Favicon> for Candidate {
    /// Turns a resolved favicon back into a candidate so it can be merged
    /// again, e.g. next to expanded manifest icons.
    fn from(favicon: Favicon) -> Self {
        Self {
            url: (!favicon.inline).then_some(favicon.absolute_url),
            raw_reference: favicon.raw_reference,
            width: favicon.width,
            height: favicon.height,
            format: favicon.format,
            source_kind: favicon.source_kind,
            inline: favicon.inline,
            payload: favicon.payload,
        }
    }
}

/// Network resolution outcome of a favicon fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaviconUrl {
    pub requested_url: String,
    /// URL after redirects; equals `requested_url` when none happened.
    pub final_url: String,
    pub redirected: bool,
    /// HTTP status; `None` for transport failures and inline content.
    pub status_code: Option<u16>,
    pub reachable: bool,
}

impl FaviconUrl {
    /// Outcome for content that needed no network round trip.
    pub fn local(url: &str) -> Self {
        Self {
            requested_url: url.to_string(),
            final_url: url.to_string(),
            redirected: false,
            status_code: None,
            reachable: true,
        }
    }

    /// Outcome for a fetch that never produced a response.
    pub fn failed(url: &str) -> Self {
        Self {
            requested_url: url.to_string(),
            final_url: url.to_string(),
            redirected: false,
            status_code: None,
            reachable: false,
        }
    }

    /// Outcome for a fetch that produced a response.
    pub fn responded(requested: &str, final_url: &str, status: u16) -> Self {
        Self {
            requested_url: requested.to_string(),
            final_url: final_url.to_string(),
            redirected: requested != final_url,
            status_code: Some(status),
            reachable: (200..300).contains(&status),
        }
    }
}

/// Decoded image content of a successfully validated favicon.
#[derive(Debug, Clone)]
pub enum DecodedImage {
    /// Raster image decoded by the codec.
    Bitmap(image::DynamicImage),
    /// SVG source, kept as bytes since it is resolution independent.
    Vector(Bytes),
}

/// A favicon after fetching and validation. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct RealFavicon {
    pub url: FaviconUrl,
    pub format: ImageFormat,
    pub valid: bool,
    /// Set when `valid` is false.
    pub invalid_reason: Option<InvalidReason>,
    /// Authoritative when `valid`, otherwise the declared values.
    pub width: u32,
    pub height: u32,
    pub original: Favicon,
    /// Only present when the resource was fully read and decoded.
    #[serde(skip)]
    pub image: Option<DecodedImage>,
}

impl RealFavicon {
    /// Builds an invalid record that keeps the declared dimensions.
    pub fn invalid(original: &Favicon, url: FaviconUrl, reason: InvalidReason) -> Self {
        Self {
            url,
            format: original.format,
            valid: false,
            invalid_reason: Some(reason),
            width: original.width,
            height: original.height,
            original: original.clone(),
            image: None,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}
