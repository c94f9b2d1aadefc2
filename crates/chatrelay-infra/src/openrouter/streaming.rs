//! SSE adapter: OpenRouter's streaming completion wire format to
//! [`StreamEvent`]s.
//!
//! OpenRouter streams OpenAI-style chunks as server-sent events and closes
//! the sequence with a literal `[DONE]` data line. Chunks that carry no text
//! (role preambles, keep-alive comments) are skipped. A per-fragment idle
//! timeout guards against an upstream that stops sending without closing.

use std::pin::Pin;
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};

use chatrelay_types::error::UpstreamError;
use chatrelay_types::llm::{CompletionRequest, StreamEvent};

use super::map_status;
use super::types::ChatCompletionChunk;

/// Longest gap tolerated between consecutive SSE events.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Open a streaming completion request and adapt the SSE body.
///
/// The returned stream yields [`StreamEvent::Delta`] per text fragment and
/// terminates with [`StreamEvent::Done`] or a single error.
pub fn create_completion_stream(
    client: &reqwest::Client,
    url: &str,
    body: CompletionRequest,
    api_key: &SecretString,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send + 'static>> {
    let client = client.clone();
    let url = url.to_string();
    let api_key = api_key.clone();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            Err(map_status(status.as_u16()))?;
        }

        let mut events = response.bytes_stream().eventsource();
        loop {
            let event = tokio::time::timeout(IDLE_TIMEOUT, events.next())
                .await
                .map_err(|_| {
                    UpstreamError::Stream("idle timeout waiting for fragment".to_string())
                })?;

            match event {
                Some(Ok(event)) => {
                    if event.data == "[DONE]" {
                        yield StreamEvent::Done;
                        break;
                    }
                    let chunk: ChatCompletionChunk = serde_json::from_str(&event.data)
                        .map_err(|e| UpstreamError::Stream(format!("malformed chunk: {e}")))?;
                    if let Some(text) = chunk.delta_text() {
                        yield StreamEvent::Delta(text.to_string());
                    }
                }
                Some(Err(e)) => {
                    Err(UpstreamError::Stream(e.to_string()))?;
                }
                // Upstream closed without [DONE]; treat as clean end.
                None => {
                    yield StreamEvent::Done;
                    break;
                }
            }
        }
    })
}
