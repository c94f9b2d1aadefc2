//! Conversation and message types.
//!
//! Durable conversations live in SQLite with positive integer ids; ephemeral
//! sessions live in process memory with negative ids. Both hold ordered
//! turns authored by the caller (`user`) or the upstream model (`assistant`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Author of a turn.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A durable conversation.
///
/// Owns an ordered set of messages; deleting the conversation cascades to
/// its messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Listing view of a conversation with its message count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub message_count: u32,
}

/// A single durable message within a conversation.
///
/// Messages are ordered by `(created_at, id)` within a conversation; that
/// pair is also the truncation key after an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    /// Model that produced this message (assistant messages only).
    pub model: Option<String>,
    /// Image URL or inline base64 image (multimodal turns only).
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A message to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub model: Option<String>,
    pub image_url: Option<String>,
}

/// One turn held by an in-memory ephemeral session.
///
/// Same shape as [`StoredMessage`] minus the store-assigned ids; the
/// timestamp is the wall-clock time captured at append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTurn {
    pub role: MessageRole,
    pub content: String,
    pub model: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionTurn {
    /// Build a turn stamped with the current wall-clock time.
    pub fn now(
        role: MessageRole,
        content: impl Into<String>,
        model: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            role,
            content: content.into(),
            model,
            image_url,
            created_at: Utc::now(),
        }
    }
}
