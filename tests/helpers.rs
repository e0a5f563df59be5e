// Shared test helpers: image fixtures and an in-memory fetcher.
//
// Each integration test file pulls this in with `mod helpers;`.

#![allow(dead_code)] // Not every test file uses every helper

use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use bytes::Bytes;
use favicon_extract::{
    Favicon, Fetch, FetchFailure, FetchFailureKind, FetchResponse, ImageFormat, SourceKind,
};
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use image::{Rgba, RgbaImage};

/// Encodes a solid-color image of the given size.
pub fn encode_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([20, 120, 220, 255]));
    let mut buffer = Vec::new();
    match format {
        image::ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut buffer), format),
        _ => img.write_to(&mut Cursor::new(&mut buffer), format),
    }
    .expect("fixture encodes");
    buffer
}

/// Builds a base64 `data:` URL for the given bytes.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn svg(width: u32, height: u32) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect width="100%" height="100%" fill="red"/></svg>"#
    )
    .into_bytes()
}

/// A network favicon with no declared size.
pub fn favicon(url: &str) -> Favicon {
    Favicon {
        absolute_url: url.to_string(),
        raw_reference: url.to_string(),
        width: 0,
        height: 0,
        format: ImageFormat::Unknown,
        source_kind: SourceKind::LinkIcon,
        inline: false,
        payload: None,
    }
}

#[derive(Clone)]
pub enum Route {
    Ok { body: Bytes, delay: Duration },
    Status(u16),
    Fail(FetchFailureKind),
    Hang,
}

/// Deterministic fetcher serving canned responses, optionally delayed so
/// completion order differs from request order. Unknown URLs fail like an
/// unresolvable host.
#[derive(Default, Clone)]
pub struct StubFetch {
    routes: HashMap<String, Route>,
}

impl StubFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: Vec<u8>, delay_ms: u64) -> Self {
        self.routes.insert(
            url.to_string(),
            Route::Ok {
                body: Bytes::from(body),
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    pub fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }
}

impl Fetch for StubFetch {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchFailure>> {
        Box::pin(async move {
            let respond = |status: u16, body: Bytes| FetchResponse {
                final_url: url.to_string(),
                status,
                content_type: None,
                // Small chunks exercise the early-stop reader
                body: stream::iter(
                    body.chunks(256)
                        .map(|c| Ok(Bytes::copy_from_slice(c)))
                        .collect::<Vec<_>>(),
                )
                .boxed(),
            };

            match self.routes.get(url).cloned() {
                Some(Route::Ok { body, delay }) => {
                    tokio::time::sleep(delay).await;
                    Ok(respond(200, body))
                }
                Some(Route::Status(status)) => Ok(respond(status, Bytes::from_static(b"nope"))),
                Some(Route::Fail(kind)) => Err(FetchFailure::new(kind, "stubbed failure")),
                Some(Route::Hang) => futures::future::pending().await,
                None => Err(FetchFailure::new(
                    FetchFailureKind::Connect,
                    format!("dns error: failed to lookup address for {url}"),
                )),
            }
        })
    }
}
