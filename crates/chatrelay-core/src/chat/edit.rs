//! Edit/truncate coordinator.
//!
//! Editing a user message rewrites its content and removes every message
//! that comes after it in the conversation's `(created_at, id)` order, so
//! the next turn regenerates from the edited point. Only user messages in
//! durable conversations are editable.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chatrelay_types::chat::MessageRole;
use chatrelay_types::error::ChatError;

use crate::chat::repository::ConversationRepository;
use crate::chat::service::ChatService;
use crate::llm::CompletionProvider;

/// Result of an edit: the rewritten message plus how much history it cut.
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub id: i64,
    pub content: String,
    pub conversation_id: i64,
    pub deleted_count: u64,
    pub timestamp: DateTime<Utc>,
}

impl<R, P> ChatService<R, P>
where
    R: ConversationRepository + 'static,
    P: CompletionProvider + 'static,
{
    /// Rewrite a user message and truncate everything after it.
    pub async fn edit_message(
        &self,
        message_id: i64,
        content: &str,
    ) -> Result<EditOutcome, ChatError> {
        let content = Self::validate_content(content)?;

        let message = self
            .repo
            .get_message(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound(message_id))?;
        if message.role != MessageRole::User {
            return Err(ChatError::Validation(
                "only user messages can be edited".to_string(),
            ));
        }

        self.repo.update_message_content(message.id, &content).await?;
        let deleted_count = self
            .repo
            .delete_messages_after(message.conversation_id, &message.created_at, message.id)
            .await?;
        tracing::info!(
            message_id = message.id,
            conversation_id = message.conversation_id,
            deleted_count,
            "message edited, history truncated"
        );

        Ok(EditOutcome {
            id: message.id,
            content,
            conversation_id: message.conversation_id,
            deleted_count,
            timestamp: message.created_at,
        })
    }
}
