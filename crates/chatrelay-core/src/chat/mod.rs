//! Conversation engine: repository trait, history assembly, the streaming
//! bridge, and the edit/truncate coordinator.

pub mod bridge;
pub mod edit;
pub mod history;
pub mod repository;
pub mod service;

pub use bridge::{TurnOutcome, TurnRequest};
pub use edit::EditOutcome;
pub use repository::ConversationRepository;
pub use service::{ChatService, ConversationDetail};

#[cfg(test)]
pub(crate) mod testutil {
    //! In-memory stand-ins for the repository and provider, used by the
    //! bridge/history/edit tests.

    use std::pin::Pin;
    use std::sync::Mutex;

    use chrono::Utc;
    use futures_util::Stream;

    use chatrelay_types::chat::{
        Conversation, ConversationSummary, NewMessage, StoredMessage,
    };
    use chatrelay_types::error::{RepositoryError, UpstreamError};
    use chatrelay_types::llm::{CompletionRequest, CompletionResponse, StreamEvent};

    use crate::chat::repository::ConversationRepository;
    use crate::llm::CompletionProvider;

    #[derive(Default)]
    struct RepoState {
        conversations: Vec<Conversation>,
        messages: Vec<StoredMessage>,
        next_conversation_id: i64,
        next_message_id: i64,
    }

    /// Mutex-backed repository; ordering matches the SQLite implementation
    /// (`created_at` then `id`).
    #[derive(Default)]
    pub struct MemoryRepository {
        state: Mutex<RepoState>,
    }

    impl MemoryRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn all_messages(&self) -> Vec<StoredMessage> {
            self.state.lock().unwrap().messages.clone()
        }
    }

    impl ConversationRepository for MemoryRepository {
        async fn create_conversation(
            &self,
            title: &str,
            model: &str,
        ) -> Result<Conversation, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            state.next_conversation_id += 1;
            let conversation = Conversation {
                id: state.next_conversation_id,
                title: title.to_string(),
                model: model.to_string(),
                created_at: Utc::now(),
            };
            state.conversations.push(conversation.clone());
            Ok(conversation)
        }

        async fn get_conversation(
            &self,
            id: i64,
        ) -> Result<Option<Conversation>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state.conversations.iter().find(|c| c.id == id).cloned())
        }

        async fn list_conversations(
            &self,
        ) -> Result<Vec<ConversationSummary>, RepositoryError> {
            let state = self.state.lock().unwrap();
            let mut summaries: Vec<ConversationSummary> = state
                .conversations
                .iter()
                .map(|c| ConversationSummary {
                    id: c.id,
                    title: c.title.clone(),
                    model: c.model.clone(),
                    created_at: c.created_at,
                    message_count: state
                        .messages
                        .iter()
                        .filter(|m| m.conversation_id == c.id)
                        .count() as u32,
                })
                .collect();
            summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(summaries)
        }

        async fn rename_conversation(
            &self,
            id: i64,
            title: &str,
        ) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            match state.conversations.iter_mut().find(|c| c.id == id) {
                Some(c) => {
                    c.title = title.to_string();
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }

        async fn delete_conversation(&self, id: i64) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            if !state.conversations.iter().any(|c| c.id == id) {
                return Err(RepositoryError::NotFound);
            }
            state.conversations.retain(|c| c.id != id);
            state.messages.retain(|m| m.conversation_id != id);
            Ok(())
        }

        async fn insert_message(
            &self,
            message: &NewMessage,
        ) -> Result<StoredMessage, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            state.next_message_id += 1;
            let stored = StoredMessage {
                id: state.next_message_id,
                conversation_id: message.conversation_id,
                role: message.role,
                content: message.content.clone(),
                model: message.model.clone(),
                image_url: message.image_url.clone(),
                created_at: Utc::now(),
            };
            state.messages.push(stored.clone());
            Ok(stored)
        }

        async fn get_messages(
            &self,
            conversation_id: i64,
        ) -> Result<Vec<StoredMessage>, RepositoryError> {
            let state = self.state.lock().unwrap();
            let mut messages: Vec<StoredMessage> = state
                .messages
                .iter()
                .filter(|m| m.conversation_id == conversation_id)
                .cloned()
                .collect();
            messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(messages)
        }

        async fn get_message(
            &self,
            message_id: i64,
        ) -> Result<Option<StoredMessage>, RepositoryError> {
            let state = self.state.lock().unwrap();
            Ok(state.messages.iter().find(|m| m.id == message_id).cloned())
        }

        async fn update_message_content(
            &self,
            message_id: i64,
            content: &str,
        ) -> Result<(), RepositoryError> {
            let mut state = self.state.lock().unwrap();
            match state.messages.iter_mut().find(|m| m.id == message_id) {
                Some(m) => {
                    m.content = content.to_string();
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }

        async fn delete_messages_after(
            &self,
            conversation_id: i64,
            created_at: &chrono::DateTime<Utc>,
            message_id: i64,
        ) -> Result<u64, RepositoryError> {
            let mut state = self.state.lock().unwrap();
            let before = state.messages.len();
            state.messages.retain(|m| {
                m.conversation_id != conversation_id
                    || (m.created_at, m.id) <= (*created_at, message_id)
            });
            Ok((before - state.messages.len()) as u64)
        }
    }

    /// Provider that replays a scripted list of stream events.
    pub struct ScriptedProvider {
        events: Mutex<Vec<Result<StreamEvent, UpstreamError>>>,
        complete_result: Mutex<Option<Result<CompletionResponse, UpstreamError>>>,
    }

    impl ScriptedProvider {
        pub fn streaming(events: Vec<Result<StreamEvent, UpstreamError>>) -> Self {
            Self {
                events: Mutex::new(events),
                complete_result: Mutex::new(None),
            }
        }

        pub fn completing(result: Result<CompletionResponse, UpstreamError>) -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                complete_result: Mutex::new(Some(result)),
            }
        }
    }

    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, UpstreamError> {
            self.complete_result
                .lock()
                .unwrap()
                .take()
                .expect("scripted completion consumed twice")
        }

        fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send + 'static>>
        {
            let events = std::mem::take(&mut *self.events.lock().unwrap());
            Box::pin(futures_util::stream::iter(events))
        }
    }
}
