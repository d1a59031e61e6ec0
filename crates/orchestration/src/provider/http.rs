//! Shared HTTP plumbing for provider adapters.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;

use crate::errors::ProviderFailure;

/// Default per-request timeout for provider calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a client with the given timeout, falling back to the default client.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Object { message: Option<String> },
}

/// Error envelope shapes seen across providers.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorField>,
    message: Option<String>,
    detail: Option<String>,
}

/// Pull a human readable message out of an error body, if it has one.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    let from_error = parsed.error.and_then(|e| match e {
        ErrorField::Text(text) => Some(text),
        ErrorField::Object { message } => message,
    });
    from_error
        .or(parsed.message)
        .or(parsed.detail)
        .filter(|m| !m.trim().is_empty())
}

/// Turn a non-2xx response into a [`ProviderFailure`] carrying status and message.
pub async fn ensure_success(response: Response) -> Result<Response, ProviderFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body).unwrap_or_else(|| format!("HTTP {} - {}", status, body));
    Err(ProviderFailure::http(status.as_u16(), message))
}

/// Read a successful response body as JSON.
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, ProviderFailure> {
    let text = ensure_success(response).await?.text().await?;
    Ok(serde_json::from_str(&text)?)
}
