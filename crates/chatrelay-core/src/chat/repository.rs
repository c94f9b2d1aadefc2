//! ConversationRepository trait definition.
//!
//! CRUD plus ordered-query operations over durable conversations and their
//! messages. Uses native async fn in traits (RPITIT, Rust 2024 edition);
//! the SQLite implementation lives in chatrelay-infra.

use chrono::{DateTime, Utc};

use chatrelay_types::chat::{Conversation, ConversationSummary, NewMessage, StoredMessage};
use chatrelay_types::error::RepositoryError;

/// Repository trait for durable conversation and message persistence.
pub trait ConversationRepository: Send + Sync {
    /// Create a conversation; the store assigns id and creation timestamp.
    fn create_conversation(
        &self,
        title: &str,
        model: &str,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    fn get_conversation(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// All conversations with message counts, newest first.
    fn list_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationSummary>, RepositoryError>> + Send;

    /// Rename a conversation. `NotFound` if it does not exist.
    fn rename_conversation(
        &self,
        id: i64,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation, cascading to its messages. `NotFound` if it
    /// does not exist.
    fn delete_conversation(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert a message; the store assigns id and write timestamp. Returns
    /// the stored row.
    fn insert_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<StoredMessage, RepositoryError>> + Send;

    /// Messages for a conversation, ordered oldest to newest by
    /// `(created_at, id)`.
    fn get_messages(
        &self,
        conversation_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, RepositoryError>> + Send;

    fn get_message(
        &self,
        message_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<StoredMessage>, RepositoryError>> + Send;

    /// Overwrite a message's content. `NotFound` if it does not exist.
    fn update_message_content(
        &self,
        message_id: i64,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete every message in the conversation whose `(created_at, id)`
    /// ordering key is strictly greater than the given one. Returns the
    /// number of rows deleted.
    fn delete_messages_after(
        &self,
        conversation_id: i64,
        created_at: &DateTime<Utc>,
        message_id: i64,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
