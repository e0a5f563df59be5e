//! CSS selector parsing.

use scraper::Selector;

/// Parses a CSS selector that is a compile-time constant.
///
/// Meant for `LazyLock` statics: a selector that fails to parse is a
/// programming error, so the message names the selector and where it is
/// used.
///
/// # Panics
///
/// Panics if the selector cannot be parsed.
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}
