//! Chat endpoints: streaming turn, non-streaming turn, message edit.
//!
//! POST /api/chat/stream
//! POST /api/chat/send
//! PUT  /api/chat/messages/{id}
//!
//! The streaming endpoint returns the reply as a plain-text chunked body,
//! one fragment per upstream delta, and identifies the thread in the
//! `X-Conversation-Id` response header so clients can continue it (negative
//! values name in-memory sessions). Upstream failures mid-stream surface as
//! a final human-readable fragment rather than a broken connection.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::Instrument;

use chatrelay_core::chat::{EditOutcome, TurnOutcome, TurnRequest};
use chatrelay_observe::genai_attrs::{
    GEN_AI_CONVERSATION_ID, GEN_AI_OPERATION_NAME, GEN_AI_PROVIDER_NAME, GEN_AI_REQUEST_MODEL,
    OP_CHAT, PROVIDER_OPENROUTER,
};

use crate::http::error::AppError;
use crate::state::AppState;

/// Header naming the thread a streamed reply belongs to.
pub const CONVERSATION_ID_HEADER: &str = "X-Conversation-Id";

/// POST /api/chat/stream -- streaming turn.
pub async fn stream_chat(
    State(state): State<AppState>,
    Json(body): Json<TurnRequest>,
) -> Result<Response, AppError> {
    let span = tracing::info_span!(
        "chat",
        { GEN_AI_OPERATION_NAME } = OP_CHAT,
        { GEN_AI_PROVIDER_NAME } = PROVIDER_OPENROUTER,
        { GEN_AI_REQUEST_MODEL } = %body.model,
        { GEN_AI_CONVERSATION_ID } = tracing::field::Empty,
    );

    let (thread, fragments) = state
        .chat_service
        .stream_turn(body)
        .instrument(span.clone())
        .await?;
    span.record(GEN_AI_CONVERSATION_ID, thread.raw());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONVERSATION_ID_HEADER, thread.raw().to_string())
        .body(Body::from_stream(fragments.map(Ok::<_, Infallible>)))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /api/chat/send -- non-streaming turn; the full reply in one JSON
/// body. Durable conversations only.
pub async fn send_chat(
    State(state): State<AppState>,
    Json(body): Json<TurnRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let span = tracing::info_span!(
        "chat",
        { GEN_AI_OPERATION_NAME } = OP_CHAT,
        { GEN_AI_PROVIDER_NAME } = PROVIDER_OPENROUTER,
        { GEN_AI_REQUEST_MODEL } = %body.model,
        { GEN_AI_CONVERSATION_ID } = tracing::field::Empty,
    );

    let outcome = state.chat_service.send(body).instrument(span.clone()).await?;
    span.record(GEN_AI_CONVERSATION_ID, outcome.conversation_id);
    Ok(Json(outcome))
}

/// Request body for message edits.
#[derive(Debug, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// PUT /api/chat/messages/{id} -- rewrite a user message and truncate the
/// conversation after it.
pub async fn edit_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Json(body): Json<EditMessageRequest>,
) -> Result<Json<EditOutcome>, AppError> {
    let outcome = state
        .chat_service
        .edit_message(message_id, &body.content)
        .await?;
    Ok(Json(outcome))
}
