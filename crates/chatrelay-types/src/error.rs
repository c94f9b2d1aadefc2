use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chatrelay-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from the upstream completion service.
///
/// Each variant maps to a distinct user-facing message via
/// [`UpstreamError::user_message`]; raw provider text is never forwarded
/// to callers.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream rate limited")]
    RateLimited,

    #[error("upstream authentication invalid")]
    AuthInvalid,

    #[error("model not found upstream")]
    ModelNotFound,

    #[error("upstream returned an empty response")]
    EmptyResponse,

    #[error("upstream rejected the request (HTTP {status})")]
    Rejected { status: u16 },

    #[error("upstream stream error: {0}")]
    Stream(String),
}

impl UpstreamError {
    /// Friendly message surfaced to the caller, either as an HTTP error body
    /// or as the terminal fragment of a failed stream.
    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Unreachable(_) => {
                "Could not reach the AI service. Check your connection and try again."
                    .to_string()
            }
            UpstreamError::RateLimited => {
                "Too many requests. Please wait a minute or two and try again.".to_string()
            }
            UpstreamError::AuthInvalid => {
                "The configured API key was rejected. Check the server's OPENROUTER_API_KEY."
                    .to_string()
            }
            UpstreamError::ModelNotFound => {
                "That model was not found or is no longer available. Pick a different model."
                    .to_string()
            }
            UpstreamError::EmptyResponse => {
                "The model returned an empty response. Please try again.".to_string()
            }
            UpstreamError::Rejected { status } => {
                format!("The AI service rejected the request (HTTP {status}). Please try again.")
            }
            UpstreamError::Stream(_) => {
                "The response stream was interrupted. Please try again.".to_string()
            }
        }
    }
}

/// Top-level error for turn processing and conversation management.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation {0} not found")]
    ConversationNotFound(i64),

    #[error("message {0} not found")]
    MessageNotFound(i64),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
