//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `chatrelay-core` using sqlx with
//! split read/write pools. Timestamps are stored as RFC 3339 text so the
//! `(created_at, id)` ordering key compares correctly as strings.

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use sqlx::Row;

use chatrelay_core::chat::ConversationRepository;
use chatrelay_types::chat::{
    Conversation, ConversationSummary, MessageRole, NewMessage, StoredMessage,
};
use chatrelay_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Conversation.
struct ConversationRow {
    id: i64,
    title: String,
    model: String,
    created_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            model: row.try_get("model")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        Ok(Conversation {
            id: self.id,
            title: self.title,
            model: self.model,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain StoredMessage.
struct MessageRow {
    id: i64,
    conversation_id: i64,
    role: String,
    content: String,
    model: Option<String>,
    image_url: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            model: row.try_get("model")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(StoredMessage {
            id: self.id,
            conversation_id: self.conversation_id,
            role,
            content: self.content,
            model: self.model,
            image_url: self.image_url,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC formatting keeps lexicographic and chronological order
/// identical, which the truncation query relies on.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the stored microsecond precision, so the value
/// returned to callers matches what a later read parses back.
fn write_timestamp() -> Result<DateTime<Utc>, RepositoryError> {
    Utc::now()
        .duration_trunc(TimeDelta::microseconds(1))
        .map_err(|e| RepositoryError::Query(format!("timestamp truncation: {e}")))
}

fn map_sqlx(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(
        &self,
        title: &str,
        model: &str,
    ) -> Result<Conversation, RepositoryError> {
        let created_at = write_timestamp()?;
        let result = sqlx::query(
            "INSERT INTO conversations (title, model, created_at) VALUES (?, ?, ?)",
        )
        .bind(title)
        .bind(model)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            model: model.to_string(),
            created_at,
        })
    }

    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT id, title, model, created_at FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        row.map(|r| {
            ConversationRow::from_row(&r)
                .map_err(map_sqlx)
                .and_then(ConversationRow::into_conversation)
        })
        .transpose()
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT c.id, c.title, c.model, c.created_at, COUNT(m.id) AS message_count
             FROM conversations c
             LEFT JOIN messages m ON m.conversation_id = c.id
             GROUP BY c.id
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                let message_count: i64 = row.try_get("message_count").map_err(map_sqlx)?;
                let conversation = ConversationRow::from_row(row)
                    .map_err(map_sqlx)?
                    .into_conversation()?;
                Ok(ConversationSummary {
                    id: conversation.id,
                    title: conversation.title,
                    model: conversation.model,
                    created_at: conversation.created_at,
                    message_count: message_count as u32,
                })
            })
            .collect()
    }

    async fn rename_conversation(&self, id: i64, title: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<StoredMessage, RepositoryError> {
        let created_at = write_timestamp()?;
        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, role, content, model, image_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(message.conversation_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&message.model)
        .bind(&message.image_url)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(StoredMessage {
            id: result.last_insert_rowid(),
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content.clone(),
            model: message.model.clone(),
            image_url: message.image_url.clone(),
            created_at,
        })
    }

    async fn get_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, role, content, model, image_url, created_at
             FROM messages
             WHERE conversation_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(map_sqlx)
                    .and_then(MessageRow::into_message)
            })
            .collect()
    }

    async fn get_message(&self, message_id: i64) -> Result<Option<StoredMessage>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, conversation_id, role, content, model, image_url, created_at
             FROM messages WHERE id = ?",
        )
        .bind(message_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx)?;

        row.map(|r| {
            MessageRow::from_row(&r)
                .map_err(map_sqlx)
                .and_then(MessageRow::into_message)
        })
        .transpose()
    }

    async fn update_message_content(
        &self,
        message_id: i64,
        content: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE messages SET content = ? WHERE id = ?")
            .bind(content)
            .bind(message_id)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_messages_after(
        &self,
        conversation_id: i64,
        created_at: &DateTime<Utc>,
        message_id: i64,
    ) -> Result<u64, RepositoryError> {
        // Strictly-greater on the composite (created_at, id) key; RFC 3339
        // text with fixed fractional width compares chronologically.
        let anchor = format_datetime(created_at);
        let result = sqlx::query(
            "DELETE FROM messages
             WHERE conversation_id = ?
               AND (created_at > ? OR (created_at = ? AND id > ?))",
        )
        .bind(conversation_id)
        .bind(&anchor)
        .bind(&anchor)
        .bind(message_id)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo(dir: &tempfile::TempDir) -> SqliteConversationRepository {
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        SqliteConversationRepository::new(pool)
    }

    fn user_message(conversation_id: i64, content: &str) -> NewMessage {
        NewMessage {
            conversation_id,
            role: MessageRole::User,
            content: content.to_string(),
            model: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let created = repo
            .create_conversation("First chat", "mistralai/mistral-7b-instruct")
            .await
            .unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_conversation(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "First chat");
        assert_eq!(fetched.model, "mistralai/mistral-7b-instruct");
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let a = repo.create_conversation("a", "x/y").await.unwrap();
        let b = repo.create_conversation("b", "x/y").await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_list_includes_message_counts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let c1 = repo.create_conversation("one", "x/y").await.unwrap();
        let c2 = repo.create_conversation("two", "x/y").await.unwrap();
        repo.insert_message(&user_message(c1.id, "hi")).await.unwrap();
        repo.insert_message(&user_message(c1.id, "again")).await.unwrap();

        let summaries = repo.list_conversations().await.unwrap();
        assert_eq!(summaries.len(), 2);
        let count_of = |id: i64| summaries.iter().find(|s| s.id == id).unwrap().message_count;
        assert_eq!(count_of(c1.id), 2);
        assert_eq!(count_of(c2.id), 0);
    }

    #[tokio::test]
    async fn test_rename_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let err = repo.rename_conversation(99, "title").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_messages() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let conversation = repo.create_conversation("t", "x/y").await.unwrap();
        let message = repo
            .insert_message(&user_message(conversation.id, "hi"))
            .await
            .unwrap();

        repo.delete_conversation(conversation.id).await.unwrap();

        assert!(repo.get_conversation(conversation.id).await.unwrap().is_none());
        assert!(repo.get_message(message.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_messages_ordered_by_created_at_then_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let conversation = repo.create_conversation("t", "x/y").await.unwrap();
        for content in ["one", "two", "three"] {
            repo.insert_message(&user_message(conversation.id, content))
                .await
                .unwrap();
        }

        let messages = repo.get_messages(conversation.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_image_url_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let conversation = repo.create_conversation("t", "x/y").await.unwrap();
        let stored = repo
            .insert_message(&NewMessage {
                conversation_id: conversation.id,
                role: MessageRole::User,
                content: "look at this".to_string(),
                model: None,
                image_url: Some("https://example.com/cat.png".to_string()),
            })
            .await
            .unwrap();

        let fetched = repo.get_message(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.image_url.as_deref(), Some("https://example.com/cat.png"));
    }

    #[tokio::test]
    async fn test_delete_messages_after_is_strictly_greater() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let conversation = repo.create_conversation("t", "x/y").await.unwrap();
        let first = repo
            .insert_message(&user_message(conversation.id, "one"))
            .await
            .unwrap();
        repo.insert_message(&user_message(conversation.id, "two"))
            .await
            .unwrap();
        repo.insert_message(&user_message(conversation.id, "three"))
            .await
            .unwrap();

        let deleted = repo
            .delete_messages_after(conversation.id, &first.created_at, first.id)
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let remaining = repo.get_messages(conversation.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, first.id);
    }

    #[tokio::test]
    async fn test_delete_messages_after_scoped_to_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let a = repo.create_conversation("a", "x/y").await.unwrap();
        let b = repo.create_conversation("b", "x/y").await.unwrap();
        let anchor = repo.insert_message(&user_message(a.id, "one")).await.unwrap();
        repo.insert_message(&user_message(a.id, "two")).await.unwrap();
        repo.insert_message(&user_message(b.id, "other")).await.unwrap();

        let deleted = repo
            .delete_messages_after(a.id, &anchor.created_at, anchor.id)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(repo.get_messages(b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_message_content() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let conversation = repo.create_conversation("t", "x/y").await.unwrap();
        let message = repo
            .insert_message(&user_message(conversation.id, "draft"))
            .await
            .unwrap();

        repo.update_message_content(message.id, "final").await.unwrap();
        let fetched = repo.get_message(message.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "final");
        assert_eq!(fetched.created_at, message.created_at);
    }
}
