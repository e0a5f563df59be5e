//! HTTP client initialization.

use std::time::Duration;

use reqwest::{redirect, ClientBuilder};

use crate::config::{Config, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Builds the HTTP client used to fetch pages, manifests and favicons.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent from the config
/// - Request timeout from the config and a fixed connect timeout
/// - Redirects followed up to `max_redirects` hops
///
/// The download orchestrator applies its own per-fetch timeout on top, which
/// also covers slow bodies.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS backend cannot
/// be initialized.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .redirect(redirect::Policy::limited(config.max_redirects))
        .build()?;
    Ok(client)
}
