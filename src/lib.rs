//! favicon_extract library: favicon discovery, resolution and validation
//!
//! Finds every favicon a page advertises (`<link>` icons, Windows tile
//! `<meta>` tags, web app manifests, inline `data:` images and the
//! conventional fallback paths), resolves them to absolute URLs and
//! deduplicates them. Optionally downloads each one with bounded
//! concurrency, learning its real size from the first bytes whenever the
//! format allows.
//!
//! # Example
//!
//! ```no_run
//! use favicon_extract::{aggregate, download, from_url, init_client, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = init_client(&config)?;
//!
//! let favicons = from_url(&client, "https://www.rust-lang.org", &config).await?;
//! let downloaded = download(&client, &favicons, &config.download_options()).await?;
//! for favicon in aggregate(downloaded).iter().filter(|f| f.valid) {
//!     println!("{} {}x{}", favicon.url.final_url, favicon.width, favicon.height);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! `from_url` and `download` need a Tokio runtime. `from_html` and the
//! discovery components are synchronous.

pub mod aggregate;
pub mod config;
mod error_handling;
pub mod fallback;
mod fetch;
pub mod initialization;
pub mod inline;
pub mod merge;
mod models;
pub mod parse;
pub mod probe;
pub mod resolve;
mod utils;

use log::{debug, warn};
use scraper::Html;
use std::time::Duration;
use url::Url;

use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::fallback::fallback_candidates;
use crate::merge::merge;
use crate::parse::{base_href, scan};
use crate::probe::ProbeReader;
use crate::resolve::{origin_root, parse_root_url, resolve};

// Re-export public API
pub use aggregate::{
    aggregate, aggregate_with, to_json_lines, AggregateOptions, Ranked, SelectionMode, SortOrder,
};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    categorize_reqwest_error, DecodeError, DownloadError, ExtractError, FetchFailure,
    FetchFailureKind, InitializationError, InvalidReason, MalformedUrl,
};
pub use fetch::{
    download, download_with_cancel, expand_manifests, parse_manifest, read_body, BodyStream,
    DownloadOptions, Fetch, FetchResponse,
};
pub use initialization::{init_client, init_logger, init_logger_with};
pub use models::{
    Candidate, DecodedImage, Favicon, FaviconUrl, ImageFormat, RealFavicon, SourceKind,
};

/// Runs scanner, fallback generator and merger over a parsed document.
///
/// Relative references resolve against `<base href>` when present;
/// fallback paths always hang off the page's origin.
fn discover(document: &Html, page_url: &Url) -> Vec<Favicon> {
    let base = base_href(document)
        .and_then(|href| match resolve(page_url, &href) {
            Ok(base) => Some(base),
            Err(e) => {
                debug!("Ignoring <base href=\"{href}\">: {e}");
                None
            }
        })
        .unwrap_or_else(|| page_url.clone());

    let declared = scan(document);
    let fallbacks = fallback_candidates(&origin_root(page_url));
    let favicons = merge(&base, declared.into_iter().chain(fallbacks));
    debug!("Discovered {} favicon(s) for {page_url}", favicons.len());
    favicons
}

/// Discovers the favicons declared by an HTML document.
///
/// Never touches the network. The result always contains the fallback
/// paths, so it is non-empty even for pages that declare nothing.
///
/// # Errors
///
/// `ExtractError::InvalidRootUrl` when `root_url` is not a usable
/// `http(s)` URL. A missing scheme is taken to mean `https`.
pub fn from_html(html: &str, root_url: &str) -> Result<Vec<Favicon>, ExtractError> {
    let root = parse_root_url(root_url)?;
    let document = Html::parse_document(html);
    Ok(discover(&document, &root))
}

/// Fetches a page and discovers its favicons.
///
/// Relative references resolve against the page URL after redirects. Pages
/// larger than `MAX_RESPONSE_BODY_SIZE` are cut off there; icons are
/// declared in `<head>`. With `config.resolve_manifests` (the default),
/// linked web app manifests are fetched and their icons merged in.
///
/// An unreachable page is not an error: it is logged and yields an empty
/// list.
///
/// # Errors
///
/// `ExtractError::InvalidRootUrl` when `url` is not a usable `http(s)` URL.
pub async fn from_url<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    config: &Config,
) -> Result<Vec<Favicon>, ExtractError> {
    let requested = parse_root_url(url)?;
    let timeout = Duration::from_secs(config.timeout_seconds);

    let response = match tokio::time::timeout(timeout, fetcher.fetch(requested.as_str())).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("Could not fetch {requested}: {e}");
            return Ok(Vec::new());
        }
        Err(_) => {
            warn!("Timed out fetching {requested} after {timeout:?}");
            return Ok(Vec::new());
        }
    };

    if !response.is_success() {
        warn!("{requested} returned HTTP {}", response.status);
        return Ok(Vec::new());
    }

    let page_url = match Url::parse(&response.final_url) {
        Ok(final_url) => final_url,
        Err(e) => {
            debug!("Unparseable final URL '{}': {e}", response.final_url);
            requested.clone()
        }
    };

    let mut reader = ProbeReader::new(response.body);
    match tokio::time::timeout(timeout, reader.fill_to(MAX_RESPONSE_BODY_SIZE)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            warn!("Could not read {page_url}: {e}");
            return Ok(Vec::new());
        }
        Err(_) => {
            warn!("Timed out reading {page_url} after {timeout:?}");
            return Ok(Vec::new());
        }
    }
    let html = String::from_utf8_lossy(reader.buffer()).into_owned();
    drop(reader);

    // Html is !Send; it must not live across the manifest fetches below
    let favicons = {
        let document = Html::parse_document(&html);
        discover(&document, &page_url)
    };

    if config.resolve_manifests {
        Ok(expand_manifests(fetcher, &page_url, favicons, &config.download_options()).await)
    } else {
        Ok(favicons)
    }
}
