//! URL resolution and normalization.
//!
//! Turns the references found in markup (absolute, scheme-relative,
//! root-relative or document-relative) into absolute `http(s)` URLs.

use log::debug;
use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::MalformedUrl;

/// Characters stripped from both ends of a reference. Markup generated by
/// templates often leaves stray quotes inside attribute values.
const QUOTING_ARTIFACTS: &[char] = &['"', '\'', '`'];

/// Strips surrounding whitespace and quoting artifacts from a reference.
pub fn clean_reference(reference: &str) -> &str {
    reference
        .trim()
        .trim_matches(QUOTING_ARTIFACTS)
        .trim()
}

/// Resolves `reference` against `base` into an absolute URL.
///
/// # Errors
///
/// Returns `MalformedUrl` when the reference is empty, too long, cannot be
/// joined onto `base`, or resolves to a scheme other than `http`/`https`.
pub fn resolve(base: &Url, reference: &str) -> Result<Url, MalformedUrl> {
    let cleaned = clean_reference(reference);
    if cleaned.is_empty() {
        return Err(MalformedUrl::Empty);
    }
    if cleaned.len() > MAX_URL_LENGTH {
        return Err(MalformedUrl::TooLong(MAX_URL_LENGTH));
    }

    // `join` handles absolute, `//host/path`, `/path` and relative forms alike
    let resolved = base
        .join(cleaned)
        .map_err(|e| MalformedUrl::Unparseable {
            reference: cleaned.to_string(),
            reason: e.to_string(),
        })?;

    match resolved.scheme() {
        "http" | "https" if resolved.host_str().is_some_and(|h| !h.is_empty()) => Ok(resolved),
        "http" | "https" => Err(MalformedUrl::Unparseable {
            reference: cleaned.to_string(),
            reason: "missing host".to_string(),
        }),
        other => {
            debug!("Rejecting favicon reference with scheme {other}: {cleaned}");
            Err(MalformedUrl::UnsupportedScheme(other.to_string()))
        }
    }
}

/// Parses the root/page URL that relative references are resolved against.
///
/// Adds an `https://` prefix when no scheme is given, mirroring how users
/// type domains.
pub fn parse_root_url(root_url: &str) -> Result<Url, MalformedUrl> {
    let cleaned = clean_reference(root_url);
    if cleaned.is_empty() {
        return Err(MalformedUrl::Empty);
    }
    if cleaned.len() > MAX_URL_LENGTH {
        return Err(MalformedUrl::TooLong(MAX_URL_LENGTH));
    }

    let normalized = if cleaned.contains("://") {
        cleaned.to_string()
    } else {
        format!("https://{}", cleaned.trim_start_matches('/'))
    };

    let parsed = Url::parse(&normalized).map_err(|e| MalformedUrl::Unparseable {
        reference: cleaned.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(MalformedUrl::Unparseable {
            reference: cleaned.to_string(),
            reason: "missing host".to_string(),
        }),
        other => Err(MalformedUrl::UnsupportedScheme(other.to_string())),
    }
}

/// Returns the origin root (`scheme://host[:port]/`) of a URL.
pub fn origin_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}
