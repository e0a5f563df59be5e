//! Error categorization.
//!
//! Maps `reqwest` errors onto the crate's fetch failure kinds.

use super::types::FetchFailureKind;

/// Categorizes a `reqwest::Error` into a `FetchFailureKind`.
///
/// Status-code errors never reach this function: the fetch capability
/// reports non-success statuses as responses, not failures.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchFailureKind {
    if error.is_timeout() {
        FetchFailureKind::Timeout
    } else if error.is_connect() {
        FetchFailureKind::Connect
    } else if error.is_redirect() {
        FetchFailureKind::Redirect
    } else if error.is_body() || error.is_decode() {
        FetchFailureKind::Body
    } else if error.is_request() || error.is_builder() {
        FetchFailureKind::Request
    } else {
        FetchFailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_categorize_builder_error() {
        // An unparseable URL fails in the request builder
        let client = reqwest::Client::new();
        let err = client
            .get("http://")
            .send()
            .await
            .expect_err("URL without host should fail to build");
        assert_eq!(categorize_reqwest_error(&err), FetchFailureKind::Request);
    }

    #[tokio::test]
    async fn test_categorize_connect_error() {
        // Port 1 on loopback refuses connections
        let client = reqwest::Client::new();
        let err = client
            .get("http://127.0.0.1:1/favicon.ico")
            .send()
            .await
            .expect_err("closed port should refuse the connection");
        assert_eq!(categorize_reqwest_error(&err), FetchFailureKind::Connect);
    }
}
