//! SSE stream creation for `streamGenerateContent`.
//!
//! With `alt=sse` the endpoint emits one SSE event per response chunk,
//! each carrying a JSON `GenerateContentResponse`; the stream closes when
//! generation finishes. This module maps that to the plain text-fragment
//! stream the core consumes.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};

use creo_types::error::ExchangeError;
use eventsource_stream::Eventsource;

use super::types::{GenerateContentChunk, GenerateContentRequest};

/// Open a streaming SSE connection and yield text fragments.
///
/// HTTP errors are mapped before any fragment is yielded: 401/403 to
/// `AuthenticationFailed`, 429 to `RateLimited`, anything else non-success
/// to `Provider` with the response body.
pub(super) fn create_gemini_stream(
    client: &reqwest::Client,
    url: &str,
    body: GenerateContentRequest,
    api_key: Arc<SecretString>,
) -> Pin<Box<dyn Stream<Item = Result<String, ExchangeError>> + Send + 'static>> {
    let client = client.clone();
    let url = url.to_string();

    Box::pin(async_stream::try_stream! {
        tracing::debug!(url = %url, "opening streaming exchange");
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let mut events = if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            Err(match status.as_u16() {
                401 | 403 => ExchangeError::AuthenticationFailed,
                429 => ExchangeError::RateLimited,
                _ => ExchangeError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            })?;
            unreachable!()
        } else {
            response.bytes_stream().eventsource()
        };
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| ExchangeError::Stream(e.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }
            let chunk: GenerateContentChunk = serde_json::from_str(&event.data)
                .map_err(|e| ExchangeError::Deserialization(format!("bad stream chunk: {e}")))?;
            if let Some(text) = chunk.text() {
                if !text.is_empty() {
                    yield text;
                }
            }
        }
    })
}
