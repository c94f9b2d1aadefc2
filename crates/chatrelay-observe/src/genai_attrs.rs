//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! These follow the OTel GenAI Semantic Conventions specification so LLM
//! relay spans carry consistent attribute names. All constants are string
//! slices usable in `tracing::span!` and `tracing::info_span!` field names.
//!
//! Span naming convention: `"{operation} {model}"`
//! (e.g., `"chat mistralai/mistral-7b-instruct"`)

/// The name of the operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider.
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested (e.g., "mistralai/mistral-7b-instruct").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The conversation (thread) the call belongs to.
pub const GEN_AI_CONVERSATION_ID: &str = "gen_ai.conversation.id";

// --- Operation name values ---

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

// --- Provider name values ---

/// OpenRouter provider identifier.
pub const PROVIDER_OPENROUTER: &str = "openrouter";
