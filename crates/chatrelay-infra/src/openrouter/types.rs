//! OpenRouter wire types.
//!
//! Request bodies reuse the shared [`chatrelay_types::llm`] shapes; this
//! module only defines the response side. Pricing arrives as decimal
//! strings in USD per token and is normalized to USD per million tokens.

use serde::Deserialize;

/// Non-streaming `/chat/completions` response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// One SSE data chunk from a streaming `/chat/completions` call.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// The text fragment carried by this chunk, if any.
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// `/models` listing response.
#[derive(Debug, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context_length: Option<u32>,
    #[serde(default)]
    pub pricing: ModelEntryPricing,
}

/// Raw pricing block; values are decimal strings like `"0.0000007"`.
#[derive(Debug, Default, Deserialize)]
pub struct ModelEntryPricing {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub completion: Option<String>,
}

impl ModelEntryPricing {
    pub fn prompt_price(&self) -> f64 {
        parse_price(self.prompt.as_deref())
    }

    pub fn completion_price(&self) -> f64 {
        parse_price(self.completion.as_deref())
    }
}

fn parse_price(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.0)
}
