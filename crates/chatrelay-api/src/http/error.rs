//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatrelay_types::error::{ChatError, RepositoryError, UpstreamError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Turn processing / conversation management errors.
    Chat(ChatError),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chat(ChatError::ConversationNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                format!("Conversation {id} not found"),
            ),
            AppError::Chat(ChatError::MessageNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "MESSAGE_NOT_FOUND",
                format!("Message {id} not found"),
            ),
            AppError::Chat(ChatError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            // Upstream failures are all 503-class from the caller's side;
            // the message carries the remediation hint.
            AppError::Chat(ChatError::Upstream(e)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_ERROR",
                e.user_message(),
            ),
            AppError::Chat(ChatError::Repository(e)) => {
                // Repository detail stays in the logs, not the response.
                tracing::error!(error = %e, "repository failure");
                let code = match e {
                    RepositoryError::Connection => "DATABASE_UNAVAILABLE",
                    _ => "DATABASE_ERROR",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "Internal storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
