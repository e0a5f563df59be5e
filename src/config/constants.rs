//! Configuration constants.
//!
//! Defaults for concurrency, partial-read budgets, size caps and network
//! timeouts used throughout the crate.

/// Default number of favicon fetches allowed in flight at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 8;

/// Default number of leading bytes read before giving up on header probing.
/// 2KB covers the header of every supported format in practice, including
/// ICO directories with a dozen entries and JPEGs with a modest EXIF block.
pub const DEFAULT_BYTE_BUDGET: usize = 2048;

/// Size of the chunks pulled from a response body while probing.
pub const PROBE_CHUNK_SIZE: usize = 512;

/// Maximum favicon size in bytes (1MB) when a full read is needed.
/// Larger resources are abandoned and reported as invalid.
pub const MAX_FAVICON_SIZE: usize = 1024 * 1024;

/// Maximum HTML page size in bytes (2MB) read by `from_url`.
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Per-fetch timeout in seconds. A timed-out fetch yields an invalid record
/// and never fails the batch.
pub const FAVICON_FETCH_TIMEOUT_SECS: u64 = 10;

/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Maximum number of redirect hops followed by the HTTP client.
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Maximum accepted URL length (2048 characters), matching common browser
/// and server limits.
pub const MAX_URL_LENGTH: usize = 2048;

/// Default User-Agent string for HTTP requests.
///
/// Some sites serve a bot wall instead of their favicons to unknown agents,
/// so a current desktop browser string is used unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
