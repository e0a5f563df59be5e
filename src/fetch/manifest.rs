//! Web app manifest expansion.
//!
//! `<link rel="manifest">` only points at a JSON document; the icons live in
//! its `icons` array. Expansion fetches each manifest and replaces the
//! marker with one favicon per listed icon.

use anyhow::{ensure, Context, Result};
use log::debug;
use serde::Deserialize;
use url::Url;

use super::http::{read_body, Fetch};
use super::DownloadOptions;
use crate::inline;
use crate::merge::merge;
use crate::models::{Candidate, Favicon, ImageFormat, SourceKind};
use crate::parse::{declared_dimensions, format_from_reference};
use crate::resolve::resolve;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    icons: Vec<ManifestIcon>,
}

#[derive(Debug, Deserialize)]
struct ManifestIcon {
    src: Option<String>,
    sizes: Option<String>,
    #[serde(rename = "type")]
    mime: Option<String>,
}

fn icon_candidate(icon: &ManifestIcon, manifest_url: &Url) -> Option<Candidate> {
    let src = icon.src.as_deref()?;

    if inline::is_data_url(src) {
        return match inline::decode(src) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                debug!("Skipping inline manifest icon: {e}");
                None
            }
        };
    }

    let url = match resolve(manifest_url, src) {
        Ok(url) => url,
        Err(e) => {
            debug!("Skipping manifest icon '{src}' in {manifest_url}: {e}");
            return None;
        }
    };

    let (width, height) = declared_dimensions(icon.sizes.as_deref(), src);
    let format = icon
        .mime
        .as_deref()
        .map(ImageFormat::from_mime)
        .filter(ImageFormat::is_known)
        .unwrap_or_else(|| format_from_reference(url.path()));

    let mut candidate =
        Candidate::network(url.as_str(), SourceKind::ManifestIcon, width, height, format);
    candidate.raw_reference = src.to_string();
    Some(candidate)
}

/// Parses a manifest body into icon candidates with absolute URLs.
pub fn parse_manifest(body: &[u8], manifest_url: &Url) -> Result<Vec<Candidate>> {
    let manifest: Manifest =
        serde_json::from_slice(body).context("manifest is not a valid JSON document")?;
    Ok(manifest
        .icons
        .iter()
        .filter_map(|icon| icon_candidate(icon, manifest_url))
        .collect())
}

pub(super) async fn fetch_manifest<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    options: &DownloadOptions,
) -> Result<Vec<Candidate>> {
    let response = tokio::time::timeout(options.timeout, fetcher.fetch(url))
        .await
        .context("manifest fetch timed out")?
        .context("manifest fetch failed")?;
    ensure!(
        response.is_success(),
        "manifest returned HTTP {}",
        response.status
    );
    let manifest_url = Url::parse(&response.final_url)
        .with_context(|| format!("manifest final URL '{}'", response.final_url))?;
    let body = read_body(response.body, options.max_size)
        .await
        .context("reading manifest body")?;
    parse_manifest(&body, &manifest_url)
}

/// Replaces manifest markers with the icons their manifests list.
///
/// Manifests are fetched one after another; pages rarely link more than
/// one. A manifest that cannot be fetched or parsed leaves its marker in
/// place. Expanded icons are merged with the other favicons, so an icon
/// also declared by a `<link>` is kept once with the stronger source.
pub async fn expand_manifests<F: Fetch + ?Sized>(
    fetcher: &F,
    page_url: &Url,
    favicons: Vec<Favicon>,
    options: &DownloadOptions,
) -> Vec<Favicon> {
    if !favicons.iter().any(Favicon::is_manifest_marker) {
        return favicons;
    }

    let mut candidates: Vec<Candidate> = Vec::with_capacity(favicons.len());
    for favicon in favicons {
        if !favicon.is_manifest_marker() {
            candidates.push(favicon.into());
            continue;
        }
        match fetch_manifest(fetcher, &favicon.absolute_url, options).await {
            Ok(icons) => {
                debug!(
                    "Manifest {} lists {} icon(s)",
                    favicon.absolute_url,
                    icons.len()
                );
                candidates.extend(icons);
            }
            Err(e) => {
                debug!("Keeping unexpanded manifest {}: {e:#}", favicon.absolute_url);
                candidates.push(favicon.into());
            }
        }
    }

    merge(page_url, candidates)
}
