//! Error type definitions.
//!
//! This module defines all error types used throughout the crate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// A reference that cannot be turned into a fetchable absolute URL.
///
/// Local to URL resolution: the candidate carrying the reference is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedUrl {
    /// Reference was empty after trimming whitespace and quotes.
    #[error("empty URL reference")]
    Empty,

    /// Reference (or base) could not be parsed or joined.
    #[error("unparseable URL reference '{reference}': {reason}")]
    Unparseable { reference: String, reason: String },

    /// Resolved to a scheme that cannot be fetched (e.g. `javascript:`).
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    /// Reference exceeds `MAX_URL_LENGTH`.
    #[error("URL reference exceeds {0} characters")]
    TooLong(usize),
}

/// Failure to decode an inline `data:` favicon.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Input does not use the `data:` scheme or lacks the `,` separator.
    #[error("not a data URL")]
    NotADataUrl,

    /// Payload has invalid base64 characters or padding.
    #[error("invalid base64 payload")]
    InvalidBase64,

    /// Payload bytes do not sniff as a supported image format.
    #[error("payload is not a supported image format")]
    UnsupportedFormat,

    /// Payload decoded to zero bytes.
    #[error("empty data URL payload")]
    Empty,
}

/// Categories of network/transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailureKind {
    Timeout,
    Connect,
    Redirect,
    Request,
    Body,
    TooLarge,
    Cancelled,
    Other,
}

impl FetchFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchFailureKind::Timeout => "Fetch timeout",
            FetchFailureKind::Connect => "Fetch connect error",
            FetchFailureKind::Redirect => "Fetch redirect error",
            FetchFailureKind::Request => "Fetch request error",
            FetchFailureKind::Body => "Fetch body error",
            FetchFailureKind::TooLarge => "Resource too large",
            FetchFailureKind::Cancelled => "Fetch cancelled",
            FetchFailureKind::Other => "Fetch other error",
        }
    }
}

impl std::fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport-level failure reported by a `Fetch` implementation.
///
/// Distinct from decode outcomes: the resource was never (fully) received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchFailure {
    pub kind: FetchFailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Why a downloaded favicon was marked `valid = false`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum InvalidReason {
    /// Server answered with a non-success status.
    #[error("unreachable (HTTP {0})")]
    Unreachable(u16),

    /// Transport failure, timeout or cancellation.
    #[error("fetch failed: {0}")]
    FetchFailed(FetchFailureKind),

    /// Bytes do not sniff as any supported format.
    #[error("unsupported image format")]
    UnsupportedImageFormat,

    /// Format was recognized but the codec rejected the bytes.
    #[error("image could not be decoded")]
    UndecodableImage,

    /// Size could not be probed and the full resource exceeded the size cap.
    #[error("byte budget exhausted before the size could be determined")]
    BudgetExhausted,

    /// A manifest marker whose manifest could not be fetched or lists no
    /// usable icon.
    #[error("manifest lists no usable icon")]
    ManifestUnresolved,
}

/// Fatal errors from the discovery entry points.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The page/root URL itself is unusable.
    #[error("invalid root URL: {0}")]
    InvalidRootUrl(#[from] MalformedUrl),
}

/// Caller misuse of `download`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// A concurrency limit of zero would never make progress.
    #[error("concurrency limit must be at least 1 (got {0})")]
    InvalidConcurrency(usize),
}
