//! Favicon markup scanning.
//!
//! Walks a parsed document for `<link>` and `<meta>` tags that declare
//! icons and turns each into a `Candidate`. Tags that lack the attributes
//! we need are skipped; nothing here fails on malformed markup.

use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::sizes::declared_dimensions;
use crate::inline;
use crate::models::{Candidate, ImageFormat, SourceKind};
use crate::utils::parse_selector_unsafe;

// CSS selector strings
const LINK_SELECTOR_STR: &str = "link[rel]";
const META_SELECTOR_STR: &str = "meta[name]";
const BASE_SELECTOR_STR: &str = "base[href]";

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(LINK_SELECTOR_STR, "favicon link scan"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(META_SELECTOR_STR, "favicon meta scan"));
static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(BASE_SELECTOR_STR, "base href scan"));

/// Windows tile images, matched case-insensitively.
const META_TILE_NAMES: &[&str] = &[
    "msapplication-tileimage",
    "msapplication-square70x70logo",
    "msapplication-square150x150logo",
    "msapplication-wide310x150logo",
    "msapplication-square310x310logo",
];

/// Maps a `rel` attribute onto a source kind.
///
/// `rel` is a space-separated token list, so `"shortcut icon"` and
/// `"icon shortcut"` are the same declaration.
pub fn classify_rel(rel: &str) -> Option<SourceKind> {
    let tokens: Vec<String> = rel
        .split_ascii_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    let has = |name: &str| tokens.iter().any(|t| t == name);

    if has("apple-touch-icon") || has("apple-touch-icon-precomposed") {
        Some(SourceKind::LinkAppleTouch)
    } else if has("mask-icon") {
        Some(SourceKind::LinkMaskIcon)
    } else if has("manifest") {
        Some(SourceKind::Manifest)
    } else if has("icon") && has("shortcut") {
        Some(SourceKind::LinkShortcutIcon)
    } else if has("icon") {
        Some(SourceKind::LinkIcon)
    } else {
        None
    }
}

fn is_tile_meta(name: &str) -> bool {
    let name = name.trim();
    META_TILE_NAMES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
}

/// Format guessed from the path extension of a reference.
pub fn format_from_reference(reference: &str) -> ImageFormat {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let filename = path.rsplit('/').next().unwrap_or_default();
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ImageFormat::from_extension(ext))
        .unwrap_or_default()
}

fn candidate_from_tag(
    element: &ElementRef<'_>,
    reference: &str,
    source_kind: SourceKind,
) -> Option<Candidate> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let sizes = element.value().attr("sizes");

    if inline::is_data_url(reference) {
        return match inline::decode(reference) {
            Ok(mut candidate) => {
                if candidate.area() == 0 {
                    let (width, height) = declared_dimensions(sizes, "");
                    candidate.width = width;
                    candidate.height = height;
                }
                Some(candidate)
            }
            Err(e) => {
                debug!("Skipping inline favicon: {e}");
                None
            }
        };
    }

    if source_kind == SourceKind::Manifest {
        return Some(Candidate::network(
            reference,
            source_kind,
            0,
            0,
            ImageFormat::Unknown,
        ));
    }

    let (width, height) = declared_dimensions(sizes, reference);
    let format = element
        .value()
        .attr("type")
        .map(ImageFormat::from_mime)
        .filter(ImageFormat::is_known)
        .unwrap_or_else(|| format_from_reference(reference));

    Some(Candidate::network(
        reference,
        source_kind,
        width,
        height,
        format,
    ))
}

/// Scans a document for favicon declarations.
///
/// Candidates are ordered by source priority (`<link rel="icon">` first,
/// tile `<meta>` tags and manifest markers last), document order within
/// the same priority.
pub fn scan(document: &Html) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(kind) = element.value().attr("rel").and_then(classify_rel) else {
            continue;
        };
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(candidate) = candidate_from_tag(&element, href, kind) {
            candidates.push(candidate);
        }
    }

    for element in document.select(&META_SELECTOR) {
        let is_tile = element.value().attr("name").is_some_and(is_tile_meta);
        if !is_tile {
            continue;
        }
        let Some(content) = element.value().attr("content") else {
            continue;
        };
        if let Some(candidate) = candidate_from_tag(&element, content, SourceKind::Meta) {
            candidates.push(candidate);
        }
    }

    // Stable: document order survives within each kind
    candidates.sort_by_key(|c| c.source_kind.priority());
    debug!("Scanned {} favicon candidates", candidates.len());
    candidates
}

/// The document's `<base href>`, if any.
pub fn base_href(document: &Html) -> Option<String> {
    document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}
