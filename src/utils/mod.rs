//! Small helpers shared across modules.

mod selector;

pub use selector::parse_selector_unsafe;
