//! CompletionProvider trait definition.
//!
//! The boundary to the upstream completion service. Uses native async fn in
//! traits (RPITIT, Rust 2024 edition) for `complete`; `stream` returns a
//! boxed stream because the fragment source must be a plain, transport-
//! agnostic value the bridge can drive regardless of how the caller is
//! reached.

use std::pin::Pin;

use futures_util::Stream;

use chatrelay_types::error::UpstreamError;
use chatrelay_types::llm::{CompletionRequest, CompletionResponse, StreamEvent};

/// Trait for the upstream completion backend (OpenRouter in production).
///
/// Implementations live in chatrelay-infra (`OpenRouterClient`).
pub trait CompletionProvider: Send + Sync {
    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, UpstreamError>> + Send;

    /// Send a streaming completion request.
    ///
    /// The returned stream is lazy, finite, and non-restartable: it yields
    /// text fragments in order and terminates with [`StreamEvent::Done`] or
    /// a single terminal error.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send + 'static>>;
}
