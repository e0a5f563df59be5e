//! HTML parsing and favicon declaration extraction.
//!
//! This module scans parsed documents for:
//! - `<link rel="icon">`, `shortcut icon`, `apple-touch-icon(-precomposed)`,
//!   `mask-icon` and `manifest` declarations
//! - `<meta name="msapplication-…">` tile images
//! - the `<base href>` that changes how relative references resolve
//!
//! All parsing is done using CSS selectors via the `scraper` crate.

mod scanner;
mod sizes;

// Re-export public API
pub use scanner::{base_href, classify_rel, format_from_reference, scan};
pub use sizes::{declared_dimensions, parse_sizes, size_from_filename};
