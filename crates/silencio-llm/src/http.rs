//! Shared HTTP client construction and response status classification.

use std::time::Duration;

use crate::error::LlmError;

/// Create a shared HTTP client with standard silencio configuration.
///
/// Config: 10s connect timeout, 60s request timeout, rustls TLS,
/// `silencio/{version}` user-agent, redirect limit 10.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn default_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .user_agent(concat!("silencio/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(LlmError::Http)
}

/// Read the response body and map non-success statuses onto the tagged error set.
///
/// The body is logged on failure but never copied into the error.
pub(crate) async fn read_body(
    provider: &str,
    response: reqwest::Response,
) -> Result<String, LlmError> {
    let status = response.status();
    let text = response.text().await.map_err(LlmError::Http)?;

    if status.is_success() {
        return Ok(text);
    }

    tracing::error!("{provider} API error {status}: {text}");
    Err(classify_status(provider, status))
}

pub(crate) fn classify_status(provider: &str, status: reqwest::StatusCode) -> LlmError {
    use reqwest::StatusCode;

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthenticated {
            provider: provider.to_owned(),
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        StatusCode::REQUEST_TIMEOUT => LlmError::Transient(format!("{provider} status {status}")),
        s if s.is_server_error() => LlmError::Transient(format!("{provider} status {status}")),
        _ => LlmError::Other(format!("{provider} request failed (status {status})")),
    }
}

/// Parse a JSON body, tagging decode failures as malformed responses.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Result<T, LlmError> {
    serde_json::from_str(body).map_err(|e| LlmError::MalformedResponse {
        provider: provider.to_owned(),
        detail: e.to_string(),
    })
}
