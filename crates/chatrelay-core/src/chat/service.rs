//! ChatService: the owning facade over the repository, the ephemeral
//! session store, and the upstream provider.
//!
//! Turn processing (the streaming bridge) lives in [`super::bridge`], the
//! edit/truncate coordinator in [`super::edit`]; this module holds the
//! service struct, shared validation, and conversation management.

use std::sync::Arc;

use serde::Serialize;

use chatrelay_types::chat::{Conversation, ConversationSummary, StoredMessage};
use chatrelay_types::error::ChatError;

use crate::chat::repository::ConversationRepository;
use crate::llm::CompletionProvider;
use crate::session::SessionStore;

/// Longest accepted user message or edited content, in characters.
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Longest accepted conversation title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Title given to conversations created implicitly by a first turn.
pub const DEFAULT_TITLE: &str = "New conversation";

/// A conversation together with its ordered message list.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    pub id: i64,
    pub title: String,
    pub model: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub messages: Vec<StoredMessage>,
}

/// Orchestrates turn processing and conversation management.
///
/// Generic over the repository and provider so the engine stays free of
/// infrastructure; chatrelay-api pins the generics to the SQLite repository
/// and the OpenRouter client.
pub struct ChatService<R: ConversationRepository, P: CompletionProvider> {
    pub(crate) repo: Arc<R>,
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) provider: Arc<P>,
}

impl<R, P> ChatService<R, P>
where
    R: ConversationRepository + 'static,
    P: CompletionProvider + 'static,
{
    pub fn new(repo: Arc<R>, sessions: Arc<SessionStore>, provider: Arc<P>) -> Self {
        Self {
            repo,
            sessions,
            provider,
        }
    }

    /// The ephemeral session store (diagnostics, tests).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    // --- Shared validation ---

    /// Non-empty after trimming and within the message length cap.
    pub(crate) fn validate_content(content: &str) -> Result<String, ChatError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ChatError::Validation("message must not be empty".to_string()));
        }
        if trimmed.chars().count() > MAX_MESSAGE_LEN {
            return Err(ChatError::Validation(format!(
                "message exceeds {MAX_MESSAGE_LEN} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Model ids are `provider/name` pairs; anything without the separator
    /// is rejected before it reaches the upstream.
    pub(crate) fn validate_model(model: &str) -> Result<String, ChatError> {
        let trimmed = model.trim();
        if trimmed.is_empty() {
            return Err(ChatError::Validation("model must not be empty".to_string()));
        }
        if !trimmed.contains('/') {
            return Err(ChatError::Validation(
                "invalid model format (expected provider/name, e.g. mistralai/mistral-7b-instruct)"
                    .to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    pub(crate) fn validate_title(title: &str) -> Result<String, ChatError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ChatError::Validation("title must not be empty".to_string()));
        }
        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ChatError::Validation(format!(
                "title exceeds {MAX_TITLE_LEN} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    // --- Conversation management ---

    /// Create an empty durable conversation.
    pub async fn create_conversation(
        &self,
        title: &str,
        model: &str,
    ) -> Result<Conversation, ChatError> {
        let title = Self::validate_title(title)?;
        let model = Self::validate_model(model)?;
        Ok(self.repo.create_conversation(&title, &model).await?)
    }

    /// All conversations with message counts, newest first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.repo.list_conversations().await?)
    }

    /// A conversation plus its ordered messages.
    pub async fn conversation_detail(&self, id: i64) -> Result<ConversationDetail, ChatError> {
        let conversation = self
            .repo
            .get_conversation(id)
            .await?
            .ok_or(ChatError::ConversationNotFound(id))?;
        let messages = self.repo.get_messages(id).await?;
        Ok(ConversationDetail {
            id: conversation.id,
            title: conversation.title,
            model: conversation.model,
            created_at: conversation.created_at,
            messages,
        })
    }

    /// Rename a conversation and return its refreshed summary.
    pub async fn rename_conversation(
        &self,
        id: i64,
        title: &str,
    ) -> Result<ConversationSummary, ChatError> {
        let title = Self::validate_title(title)?;
        self.repo
            .get_conversation(id)
            .await?
            .ok_or(ChatError::ConversationNotFound(id))?;
        self.repo.rename_conversation(id, &title).await?;
        let summaries = self.repo.list_conversations().await?;
        summaries
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(ChatError::ConversationNotFound(id))
    }

    /// Delete a conversation and, by cascade, its messages.
    pub async fn delete_conversation(&self, id: i64) -> Result<(), ChatError> {
        self.repo
            .get_conversation(id)
            .await?
            .ok_or(ChatError::ConversationNotFound(id))?;
        self.repo.delete_conversation(id).await?;
        tracing::info!(conversation_id = id, "conversation deleted");
        Ok(())
    }
}
