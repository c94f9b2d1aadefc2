//! Normalized model catalog entries, as listed from the upstream provider.

use serde::{Deserialize, Serialize};

/// One model available upstream, normalized for the catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub context_length: u32,
    pub pricing: ModelPricing,
    pub is_free: bool,
    pub supports_vision: bool,
}

/// Per-million-token pricing in USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt: f64,
    pub completion: f64,
    pub average: f64,
}

impl ModelInfo {
    /// Keywords that mark a model as vision-capable when found in its id,
    /// name, or description.
    pub const VISION_KEYWORDS: &'static [&'static str] = &[
        "vision",
        "image",
        "visual",
        "multimodal",
        "gpt-4o",
        "gpt-4-turbo",
        "claude-3",
    ];
}
