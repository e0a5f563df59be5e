//! Conventional favicon locations.
//!
//! Browsers and iOS look for these root-relative paths even when a page
//! declares nothing. They are emitted alongside explicit declarations and
//! stay speculative until a download confirms they exist.

use log::debug;
use url::Url;

use crate::models::{Candidate, SourceKind};
use crate::parse::{format_from_reference, size_from_filename};
use crate::resolve::resolve;

/// Root-relative fallback paths, most common first.
pub const FALLBACK_PATHS: &[&str] = &[
    "/favicon.ico",
    "/favicon.png",
    "/apple-touch-icon.png",
    "/apple-touch-icon-precomposed.png",
    "/apple-touch-icon-180x180.png",
    "/apple-touch-icon-167x167.png",
    "/apple-touch-icon-152x152.png",
    "/apple-touch-icon-120x120.png",
    "/apple-touch-icon-114x114.png",
    "/apple-touch-icon-87x87.png",
    "/apple-touch-icon-80x80.png",
    "/apple-touch-icon-76x76.png",
    "/apple-touch-icon-58x58.png",
];

/// Builds the fallback candidates for a site, resolved against its root.
///
/// Sizes are inferred from the filename where it carries one.
pub fn fallback_candidates(root_url: &Url) -> Vec<Candidate> {
    FALLBACK_PATHS
        .iter()
        .filter_map(|path| match resolve(root_url, path) {
            Ok(url) => {
                let (width, height) = size_from_filename(path).unwrap_or((0, 0));
                Some(Candidate::network(
                    url.as_str(),
                    SourceKind::Fallback,
                    width,
                    height,
                    format_from_reference(path),
                ))
            }
            Err(e) => {
                debug!("Skipping fallback {path} for {root_url}: {e}");
                None
            }
        })
        .collect()
}
