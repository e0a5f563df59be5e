//! Resource setup for callers of the library.
//!
//! This module provides:
//! - The `reqwest` client used as the default `Fetch` implementation
//! - Logger initialization (plain or JSON lines)
//!
//! Discovery and download never call these themselves; applications set up
//! logging once and hand a client to `from_url` and `download`.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::{init_logger, init_logger_with};
