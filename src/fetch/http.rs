//! HTTP fetch capability.
//!
//! The download orchestrator and `from_url` only see the `Fetch` trait:
//! a response is a status, the post-redirect URL and a chunked body that can
//! be abandoned after any chunk. `reqwest::Client` is the production
//! implementation; tests plug in in-memory fetchers.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;

use crate::error_handling::{categorize_reqwest_error, FetchFailure};

/// Chunked response body. Dropping it stops the transfer.
pub type BodyStream = BoxStream<'static, Result<Bytes, FetchFailure>>;

/// A response from a fetch, with the body not yet consumed.
pub struct FetchResponse {
    /// URL after following redirects.
    pub final_url: String,
    /// HTTP status code. Non-success statuses are responses, not failures.
    pub status: u16,
    /// `Content-Type` header value, if any.
    pub content_type: Option<String>,
    pub body: BodyStream,
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("final_url", &self.final_url)
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl FetchResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a URL.
///
/// Implementations follow redirects themselves (bounded) and report
/// transport problems as `FetchFailure`, never as a response.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchFailure>>;
}

impl Fetch for reqwest::Client {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchFailure>> {
        Box::pin(async move {
            let response = self
                .get(url)
                .send()
                .await
                .map_err(|e| FetchFailure::new(categorize_reqwest_error(&e), e.to_string()))?;

            let final_url = response.url().to_string();
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let body = response
                .bytes_stream()
                .map(|chunk| {
                    chunk.map_err(|e| {
                        FetchFailure::new(categorize_reqwest_error(&e), e.to_string())
                    })
                })
                .boxed();

            Ok(FetchResponse {
                final_url,
                status,
                content_type,
                body,
            })
        })
    }
}

impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchFailure>> {
        (**self).fetch(url)
    }
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchFailure>> {
        (**self).fetch(url)
    }
}

/// Reads a whole body into memory, failing once it grows past `max_size`.
pub async fn read_body(body: BodyStream, max_size: usize) -> Result<Vec<u8>, FetchFailure> {
    let mut reader = crate::probe::ProbeReader::new(body);
    reader.read_to_end(max_size).await?;
    Ok(reader.into_buffer())
}
