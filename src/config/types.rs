//! Configuration types.
//!
//! This module defines the logging enums and the library `Config` struct.

use std::time::Duration;

use crate::config::constants::{
    DEFAULT_BYTE_BUDGET, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_USER_AGENT,
    FAVICON_FETCH_TIMEOUT_SECS, MAX_FAVICON_SIZE, MAX_REDIRECT_HOPS,
};
use crate::fetch::DownloadOptions;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for machine parsing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// Constructed programmatically; nothing is read from files or the
/// environment.
///
/// # Examples
///
/// ```no_run
/// use favicon_extract::Config;
///
/// let config = Config {
///     concurrency_limit: 4,
///     byte_budget: 4096,
///     ..Default::default()
/// };
/// let options = config.download_options();
/// assert_eq!(options.concurrency_limit, 4);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Maximum fetches in flight during `download`
    pub concurrency_limit: usize,

    /// Leading bytes read while trying to probe a size before a full read
    pub byte_budget: usize,

    /// Upper bound for a full favicon read
    pub max_favicon_size: usize,

    /// Per-fetch timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum redirect hops followed per fetch
    pub max_redirects: usize,

    /// Always read favicons completely and confirm sizes with the image codec
    pub decode_images: bool,

    /// Let `from_url` fetch web app manifests and expand their icon lists.
    /// Markers left unexpanded are still resolved by `download`.
    pub resolve_manifests: bool,
}

impl Config {
    /// Builds the options handed to the download orchestrator.
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            concurrency_limit: self.concurrency_limit,
            byte_budget: self.byte_budget,
            max_size: self.max_favicon_size,
            timeout: Duration::from_secs(self.timeout_seconds),
            decode_images: self.decode_images,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            byte_budget: DEFAULT_BYTE_BUDGET,
            max_favicon_size: MAX_FAVICON_SIZE,
            timeout_seconds: FAVICON_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: MAX_REDIRECT_HOPS,
            decode_images: false,
            resolve_manifests: true,
        }
    }
}
