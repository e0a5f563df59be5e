//! Favicon download and validation.
//!
//! This module provides:
//! - The `Fetch` capability and its `reqwest` implementation
//! - `download`, which fetches favicons with bounded concurrency, probes
//!   sizes from the first bytes and confirms full reads with the codec
//! - Manifest expansion for `<link rel="manifest">` markers; `download`
//!   resolves a marker it is handed to the largest icon of its manifest
//!
//! Every favicon gets exactly one `RealFavicon`, at the same index as its
//! input. Failures are recorded on that record and never abort the batch.

mod codec;
mod http;
mod manifest;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use log::{debug, info};
use std::cmp::Reverse;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{
    DEFAULT_BYTE_BUDGET, DEFAULT_CONCURRENCY_LIMIT, FAVICON_FETCH_TIMEOUT_SECS, MAX_FAVICON_SIZE,
};
use crate::error_handling::{DownloadError, FetchFailureKind, InvalidReason};
use crate::merge::to_favicon;
use crate::models::{DecodedImage, Favicon, FaviconUrl, ImageFormat, RealFavicon};
use crate::probe::{probe_prefix, sniff_format, ProbeReader, SizeProbe};

pub use http::{read_body, BodyStream, Fetch, FetchResponse};
pub use manifest::{expand_manifests, parse_manifest};

/// Tuning for a `download` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Fetches allowed in flight at once; must be at least 1.
    pub concurrency_limit: usize,
    /// Leading bytes read while trying to probe the size.
    pub byte_budget: usize,
    /// Cap for a full read.
    pub max_size: usize,
    /// Per-fetch timeout.
    pub timeout: Duration,
    /// Skip early stopping and always confirm with the codec.
    pub decode_images: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            byte_budget: DEFAULT_BYTE_BUDGET,
            max_size: MAX_FAVICON_SIZE,
            timeout: Duration::from_secs(FAVICON_FETCH_TIMEOUT_SECS),
            decode_images: false,
        }
    }
}

fn valid(
    original: &Favicon,
    url: FaviconUrl,
    format: ImageFormat,
    width: u32,
    height: u32,
    image: Option<DecodedImage>,
) -> RealFavicon {
    RealFavicon {
        url,
        format,
        valid: true,
        invalid_reason: None,
        width,
        height,
        original: original.clone(),
        image,
    }
}

/// Format to assume when magic bytes are inconclusive.
fn format_hint(favicon: &Favicon, content_type: Option<&str>) -> Option<ImageFormat> {
    content_type
        .map(ImageFormat::from_mime)
        .filter(ImageFormat::is_known)
        .or_else(|| favicon.format.is_known().then_some(favicon.format))
}

/// Validates a complete resource: sniff, then confirm with the codec.
fn validate_complete(
    original: &Favicon,
    url: FaviconUrl,
    bytes: Bytes,
    hint: Option<ImageFormat>,
) -> RealFavicon {
    let format = match sniff_format(&bytes) {
        Some(format) => format,
        // Long comments can push `<svg` past the sniffing window
        None if hint == Some(ImageFormat::Svg) && crate::probe::probe(&bytes, hint).is_known() => {
            ImageFormat::Svg
        }
        None => {
            debug!(
                "{} is not a supported image ({} bytes)",
                original.absolute_url,
                bytes.len()
            );
            return RealFavicon::invalid(original, url, InvalidReason::UnsupportedImageFormat);
        }
    };

    match codec::decode(bytes, format) {
        Some((width, height, image)) => valid(original, url, format, width, height, Some(image)),
        None => {
            let mut record = RealFavicon::invalid(original, url, InvalidReason::UndecodableImage);
            record.format = format;
            record
        }
    }
}

/// Inline favicons already carry their bytes.
fn validate_inline(favicon: &Favicon) -> RealFavicon {
    let url = FaviconUrl::local(&favicon.absolute_url);
    match favicon.payload.clone() {
        Some(payload) => validate_complete(favicon, url, payload, Some(favicon.format)),
        None => RealFavicon::invalid(favicon, url, InvalidReason::UnsupportedImageFormat),
    }
}

async fn fetch_and_validate<F: Fetch + ?Sized>(
    fetcher: &F,
    favicon: &Favicon,
    options: &DownloadOptions,
) -> RealFavicon {
    let requested = favicon.absolute_url.as_str();

    let response = match fetcher.fetch(requested).await {
        Ok(response) => response,
        Err(e) => {
            debug!("Favicon fetch failed for {requested}: {e}");
            return RealFavicon::invalid(
                favicon,
                FaviconUrl::failed(requested),
                InvalidReason::FetchFailed(e.kind),
            );
        }
    };

    let url = FaviconUrl::responded(requested, &response.final_url, response.status);
    if !url.reachable {
        debug!("Favicon fetch returned {} for {requested}", response.status);
        return RealFavicon::invalid(favicon, url, InvalidReason::Unreachable(response.status));
    }

    let hint = format_hint(favicon, response.content_type.as_deref());
    let mut reader = ProbeReader::new(response.body);

    let probed = if options.decode_images {
        SizeProbe::Unknown
    } else {
        match probe_prefix(&mut reader, options.byte_budget, hint).await {
            Ok(probed) => probed,
            Err(e) => {
                debug!("Favicon stream error for {requested}: {e}");
                return RealFavicon::invalid(favicon, url, InvalidReason::FetchFailed(e.kind));
            }
        }
    };

    if let SizeProbe::Known(info) = &probed {
        if !reader.is_exhausted() {
            debug!(
                "Probed {requested} as {} {}x{} after {} bytes",
                info.format,
                info.width,
                info.height,
                reader.buffer().len()
            );
            // Dropping the reader abandons the rest of the body
            return valid(favicon, url, info.format, info.width, info.height, None);
        }
    }

    if let Err(e) = reader.read_to_end(options.max_size).await {
        debug!("Favicon read failed for {requested}: {e}");
        let reason = match e.kind {
            FetchFailureKind::TooLarge if !probed.is_known() => InvalidReason::BudgetExhausted,
            kind => InvalidReason::FetchFailed(kind),
        };
        return RealFavicon::invalid(favicon, url, reason);
    }

    validate_complete(favicon, url, Bytes::from(reader.into_buffer()), hint)
}

/// Resolves a `<link rel="manifest">` marker to the largest icon its
/// manifest lists. The record keeps the marker as `original`.
async fn resolve_marker<F: Fetch + ?Sized>(
    fetcher: &F,
    marker: &Favicon,
    options: &DownloadOptions,
) -> RealFavicon {
    let unresolved = || {
        RealFavicon::invalid(
            marker,
            FaviconUrl::failed(&marker.absolute_url),
            InvalidReason::ManifestUnresolved,
        )
    };

    let icons = match manifest::fetch_manifest(fetcher, &marker.absolute_url, options).await {
        Ok(icons) => icons,
        Err(e) => {
            debug!("Manifest {} unresolved: {e:#}", marker.absolute_url);
            return unresolved();
        }
    };
    let Ok(base) = Url::parse(&marker.absolute_url) else {
        return unresolved();
    };

    // Ties keep the first icon listed
    let Some(icon) = icons
        .into_iter()
        .filter_map(|candidate| to_favicon(&base, candidate))
        .min_by_key(|icon| Reverse(icon.area()))
    else {
        debug!("Manifest {} lists no usable icon", marker.absolute_url);
        return unresolved();
    };

    let mut record = if icon.inline {
        validate_inline(&icon)
    } else {
        fetch_and_validate(fetcher, &icon, options).await
    };
    record.original = marker.clone();
    record
}

async fn download_one<F: Fetch + ?Sized>(
    fetcher: &F,
    favicon: &Favicon,
    options: &DownloadOptions,
) -> RealFavicon {
    if favicon.inline {
        return validate_inline(favicon);
    }

    let work = async {
        if favicon.is_manifest_marker() {
            resolve_marker(fetcher, favicon, options).await
        } else {
            fetch_and_validate(fetcher, favicon, options).await
        }
    };

    match tokio::time::timeout(options.timeout, work).await {
        Ok(record) => record,
        Err(_) => {
            debug!(
                "Favicon fetch timed out for {} after {:?}",
                favicon.absolute_url, options.timeout
            );
            RealFavicon::invalid(
                favicon,
                FaviconUrl::failed(&favicon.absolute_url),
                InvalidReason::FetchFailed(FetchFailureKind::Timeout),
            )
        }
    }
}

/// Downloads and validates favicons with at most
/// `options.concurrency_limit` fetches in flight.
///
/// The result is positionally aligned with `favicons`. Completion order
/// does not matter: each task writes only its own slot.
///
/// # Errors
///
/// `DownloadError::InvalidConcurrency` when the limit is zero.
pub async fn download<F: Fetch + ?Sized>(
    fetcher: &F,
    favicons: &[Favicon],
    options: &DownloadOptions,
) -> Result<Vec<RealFavicon>, DownloadError> {
    download_with_cancel(fetcher, favicons, options, &CancellationToken::new()).await
}

/// Like `download`, but stops scheduling and abandons in-flight fetches
/// once `cancel` fires.
///
/// Results completed before cancellation are returned unchanged; every
/// other slot holds an invalid record with `FetchFailureKind::Cancelled`.
pub async fn download_with_cancel<F: Fetch + ?Sized>(
    fetcher: &F,
    favicons: &[Favicon],
    options: &DownloadOptions,
    cancel: &CancellationToken,
) -> Result<Vec<RealFavicon>, DownloadError> {
    if options.concurrency_limit == 0 {
        return Err(DownloadError::InvalidConcurrency(options.concurrency_limit));
    }

    let mut slots: Vec<Option<RealFavicon>> = favicons.iter().map(|_| None).collect();
    let mut in_flight = stream::iter(favicons.iter().enumerate())
        .map(|(index, favicon)| async move {
            (index, download_one(fetcher, favicon, options).await)
        })
        .buffer_unordered(options.concurrency_limit);

    let mut completed = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(
                    "Favicon download cancelled with {completed} of {} complete",
                    favicons.len()
                );
                break;
            }
            next = in_flight.next() => match next {
                Some((index, record)) => {
                    slots[index] = Some(record);
                    completed += 1;
                }
                None => break,
            },
        }
    }
    drop(in_flight);

    let results: Vec<RealFavicon> = slots
        .into_iter()
        .zip(favicons)
        .map(|(slot, favicon)| {
            slot.unwrap_or_else(|| {
                RealFavicon::invalid(
                    favicon,
                    FaviconUrl::failed(&favicon.absolute_url),
                    InvalidReason::FetchFailed(FetchFailureKind::Cancelled),
                )
            })
        })
        .collect();

    let valid_count = results.iter().filter(|r| r.valid).count();
    info!(
        "Downloaded {} favicon(s): {valid_count} valid, {} invalid",
        results.len(),
        results.len() - valid_count
    );
    Ok(results)
}
