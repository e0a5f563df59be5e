//! Candidate merging and deduplication.
//!
//! Resolves every candidate to an absolute URL (or a content digest for
//! inline data) and keeps one favicon per key. The output order is the
//! order in which each key was first seen; a later duplicate that outranks
//! the current holder replaces it in place.

use log::debug;
use std::collections::HashMap;
use url::Url;

use crate::inline;
use crate::models::{Candidate, Favicon};
use crate::parse::format_from_reference;
use crate::resolve::resolve;

/// Identity of a favicon within one result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Absolute URL without fragment.
    Url(String),
    /// SHA-256 of decoded inline bytes.
    Content(String),
}

impl DedupKey {
    pub fn of(favicon: &Favicon) -> Self {
        match favicon.payload.as_deref() {
            Some(payload) if favicon.inline => DedupKey::Content(inline::content_digest(payload)),
            _ => DedupKey::Url(favicon.absolute_url.clone()),
        }
    }
}

fn resolve_network(base: &Url, candidate: Candidate) -> Option<Favicon> {
    let reference = candidate.url.as_deref().unwrap_or(&candidate.raw_reference);
    let mut url = match resolve(base, reference) {
        Ok(url) => url,
        Err(e) => {
            debug!("Dropping favicon candidate '{reference}': {e}");
            return None;
        }
    };
    url.set_fragment(None);

    let format = if candidate.format.is_known() {
        candidate.format
    } else {
        format_from_reference(url.path())
    };

    Some(Favicon {
        absolute_url: url.to_string(),
        raw_reference: candidate.raw_reference,
        width: candidate.width,
        height: candidate.height,
        format,
        source_kind: candidate.source_kind,
        inline: false,
        payload: None,
    })
}

fn resolve_inline(candidate: Candidate) -> Option<Favicon> {
    // Inline candidates normally arrive decoded; decode late ones here
    let candidate = match candidate.payload {
        Some(_) => candidate,
        None => match inline::decode(&candidate.raw_reference) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("Dropping inline favicon candidate: {e}");
                return None;
            }
        },
    };
    let payload = candidate.payload?;

    Some(Favicon {
        absolute_url: inline::inline_url(&payload),
        raw_reference: candidate.raw_reference,
        width: candidate.width,
        height: candidate.height,
        format: candidate.format,
        source_kind: candidate.source_kind,
        inline: true,
        payload: Some(payload),
    })
}

/// Resolves a single candidate into a favicon, or drops it.
pub fn to_favicon(base: &Url, candidate: Candidate) -> Option<Favicon> {
    if candidate.inline {
        resolve_inline(candidate)
    } else {
        resolve_network(base, candidate)
    }
}

/// True when `challenger` should replace `holder` for the same key: a
/// stronger source wins, then a larger declared size.
fn outranks(challenger: &Favicon, holder: &Favicon) -> bool {
    let (c, h) = (
        challenger.source_kind.priority(),
        holder.source_kind.priority(),
    );
    c < h || (c == h && challenger.area() > holder.area())
}

/// Merges candidates from any number of producers into deduplicated
/// favicons.
///
/// Pass the producers chained in precedence order (scanner, then inline,
/// then fallback). The result is idempotent: merging a sequence with
/// itself yields the same favicons as merging it once.
pub fn merge<I>(base: &Url, candidates: I) -> Vec<Favicon>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut favicons: Vec<Favicon> = Vec::new();
    let mut slots: HashMap<DedupKey, usize> = HashMap::new();

    for candidate in candidates {
        let Some(favicon) = to_favicon(base, candidate) else {
            continue;
        };
        let key = DedupKey::of(&favicon);
        match slots.get(&key) {
            Some(&slot) => {
                if outranks(&favicon, &favicons[slot]) {
                    favicons[slot] = favicon;
                }
            }
            None => {
                slots.insert(key, favicons.len());
                favicons.push(favicon);
            }
        }
    }

    favicons
}
