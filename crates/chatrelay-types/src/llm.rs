//! Upstream completion request/response types.
//!
//! These serialize directly into the OpenRouter chat-completions wire format:
//! a message's content is either a plain string or a two-part array for
//! multimodal (text + image) turns.

use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

/// A provider-ready message: role plus text or multimodal content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: MessageRole,
    pub content: ProviderContent,
}

impl ProviderMessage {
    /// Plain text message.
    pub fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: ProviderContent::Text(content.into()),
        }
    }

    /// Two-part multimodal message: text followed by an image reference.
    pub fn with_image(
        role: MessageRole,
        content: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            role,
            content: ProviderContent::Parts(vec![
                ContentPart::Text {
                    text: content.into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageRef {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

/// Message content: a bare string, or content parts for multimodal turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

/// Image reference inside a content part (URL or inline base64 data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Request to the upstream completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ProviderMessage>,
    pub stream: bool,
}

/// Full response from a non-streaming completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Events emitted by a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental text fragment.
    Delta(String),
    /// The provider signaled end-of-stream.
    Done,
}
