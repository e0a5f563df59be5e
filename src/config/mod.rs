//! Library configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, byte budgets, size limits)
//! - Logging enums and the `Config` struct used to build clients and
//!   download options

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
