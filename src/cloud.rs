//! Shared plumbing for the hosted AI APIs

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// HTTP client used for every cloud call
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_default()
}

/// Best error message from a failed API response: `error.message`, else the status
pub(crate) async fn error_message(response: reqwest::Response, prefix: &str) -> String {
    let status = response.status();

    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| format!("{}: {}", prefix, status))
}
