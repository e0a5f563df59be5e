//! Error handling.
//!
//! This module provides:
//! - Error type definitions for URL resolution, inline decoding, fetching
//!   and initialization
//! - Categorization of `reqwest` errors into fetch failure kinds
//!
//! Per-candidate failures are values, not process failures:
//! - **Dropped candidates**: `MalformedUrl` and `DecodeError` remove a
//!   candidate during discovery
//! - **Invalid records**: `FetchFailure` and `InvalidReason` mark a
//!   `RealFavicon` as `valid = false`
//! - **Fatal**: only `DownloadError` (caller misuse) and `ExtractError`
//!   (unusable root URL) abort an operation

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{
    DecodeError, DownloadError, ExtractError, FetchFailure, FetchFailureKind,
    InitializationError, InvalidReason, MalformedUrl,
};
