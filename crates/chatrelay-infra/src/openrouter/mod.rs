//! OpenRouterClient -- concrete [`CompletionProvider`] implementation.
//!
//! Talks to an OpenRouter-compatible API: `/chat/completions` for turns
//! (non-streaming and SSE streaming) and `/models` for the catalog. The API
//! key is wrapped in [`secrecy::SecretString`] and only exposed when
//! constructing the Authorization header.

pub mod streaming;
pub mod types;

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use chatrelay_core::llm::CompletionProvider;
use chatrelay_types::catalog::{ModelInfo, ModelPricing};
use chatrelay_types::error::UpstreamError;
use chatrelay_types::llm::{CompletionRequest, CompletionResponse, StreamEvent};

use streaming::create_completion_stream;
use types::{ChatCompletionResponse, ModelEntry, ModelsResponse};

/// Map an upstream HTTP status to the error taxonomy.
pub(crate) fn map_status(status: u16) -> UpstreamError {
    match status {
        401 | 403 => UpstreamError::AuthInvalid,
        404 => UpstreamError::ModelNotFound,
        429 => UpstreamError::RateLimited,
        500..=599 => UpstreamError::Unreachable(format!("upstream returned HTTP {status}")),
        other => UpstreamError::Rejected { status: other },
    }
}

/// OpenRouter API client.
///
/// No Debug derive; the SecretString field already resists printing, and
/// omitting Debug keeps the rest of the state out of logs too.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenRouterClient {
    /// Timeout for a full non-streaming completion.
    const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

    /// Timeout for metadata calls such as `/models`.
    const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a new client against the given base URL
    /// (e.g. `https://openrouter.ai/api/v1`).
    pub fn new(api_key: SecretString, base_url: String) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// List models from the upstream catalog, normalized for the catalog
    /// endpoints. With `free_only`, models with any nonzero price are
    /// dropped.
    pub async fn list_models(&self, free_only: bool) -> Result<Vec<ModelInfo>, UpstreamError> {
        let response = self
            .client
            .get(self.url("/models"))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(Self::METADATA_TIMEOUT)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status.as_u16()));
        }

        let listing: ModelsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Stream(format!("malformed model listing: {e}")))?;

        let models = listing
            .data
            .into_iter()
            .map(normalize_model)
            .filter(|m| !free_only || m.is_free)
            .collect();
        Ok(models)
    }
}

/// Normalize one raw catalog entry: parse string pricing, derive the free
/// flag, and scan id/name/description for vision keywords.
fn normalize_model(entry: ModelEntry) -> ModelInfo {
    let prompt = entry.pricing.prompt_price();
    let completion = entry.pricing.completion_price();
    let is_free = prompt == 0.0 && completion == 0.0;
    let average = if is_free { 0.0 } else { (prompt + completion) / 2.0 };

    let name = entry.name.unwrap_or_else(|| entry.id.clone());
    let haystack = format!(
        "{} {} {}",
        entry.id.to_lowercase(),
        name.to_lowercase(),
        entry.description.to_lowercase()
    );
    let supports_vision = ModelInfo::VISION_KEYWORDS
        .iter()
        .any(|keyword| haystack.contains(keyword));

    ModelInfo {
        id: entry.id,
        name,
        description: entry.description,
        context_length: entry.context_length.unwrap_or(4096),
        pricing: ModelPricing {
            prompt,
            completion,
            average,
        },
        is_free,
        supports_vision,
    }
}

impl CompletionProvider for OpenRouterClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, UpstreamError> {
        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json")
            .timeout(Self::COMPLETION_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status.as_u16()));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Stream(format!("malformed completion: {e}")))?;

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(UpstreamError::EmptyResponse);
        }

        Ok(CompletionResponse {
            content,
            model: completion.model.unwrap_or_else(|| request.model.clone()),
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send + 'static>> {
        create_completion_stream(
            &self.client,
            &self.url("/chat/completions"),
            request,
            &self.api_key,
        )
    }
}
