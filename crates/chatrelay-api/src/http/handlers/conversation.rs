//! Conversation management endpoints.
//!
//! POST   /api/conversations
//! GET    /api/conversations
//! GET    /api/conversations/{id}
//! PATCH  /api/conversations/{id}
//! DELETE /api/conversations/{id}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use chatrelay_core::chat::ConversationDetail;
use chatrelay_types::chat::{Conversation, ConversationSummary};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for conversation creation.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub title: String,
    pub model: String,
}

/// Request body for renames.
#[derive(Debug, Deserialize)]
pub struct RenameConversationRequest {
    pub title: String,
}

/// POST /api/conversations -- create an empty conversation.
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>), AppError> {
    let conversation = state
        .chat_service
        .create_conversation(&body.title, &body.model)
        .await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /api/conversations -- all conversations, newest first, with message
/// counts.
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    Ok(Json(state.chat_service.list_conversations().await?))
}

/// GET /api/conversations/{id} -- a conversation plus its ordered messages.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ConversationDetail>, AppError> {
    Ok(Json(state.chat_service.conversation_detail(id).await?))
}

/// PATCH /api/conversations/{id} -- rename.
pub async fn rename_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RenameConversationRequest>,
) -> Result<Json<ConversationSummary>, AppError> {
    Ok(Json(
        state
            .chat_service
            .rename_conversation(id, &body.title)
            .await?,
    ))
}

/// DELETE /api/conversations/{id} -- delete with cascade to messages.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.chat_service.delete_conversation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
