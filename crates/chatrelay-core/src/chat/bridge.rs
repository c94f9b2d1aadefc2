//! The streaming bridge: one user turn in, a fragment stream out.
//!
//! Turn processing walks a fixed sequence. The thread is resolved (or
//! created), the user turn is committed to its store, the assembled history
//! goes upstream, and fragments are forwarded as they arrive. The assistant
//! turn is committed only after the upstream finishes cleanly with non-empty
//! accumulated text; a consumer that drops the stream mid-flight therefore
//! leaves the thread with the user turn recorded and no assistant turn. On
//! upstream failure exactly one friendly message is emitted as the final
//! fragment and nothing is committed.

use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use chatrelay_types::chat::{MessageRole, NewMessage, SessionTurn};
use chatrelay_types::error::{ChatError, UpstreamError};
use chatrelay_types::llm::{CompletionRequest, StreamEvent};

use crate::chat::history::assemble_history;
use crate::chat::repository::ConversationRepository;
use crate::chat::service::{ChatService, DEFAULT_TITLE};
use crate::llm::CompletionProvider;
use crate::routing::ThreadId;
use crate::session::SessionStore;

/// One inbound user turn.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    /// Existing thread to continue; `None` starts a new one.
    pub conversation_id: Option<i64>,
    pub model: String,
    pub message: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Request an in-memory session when starting a new thread.
    #[serde(default)]
    pub ephemeral: bool,
    /// Title for an implicitly created durable conversation.
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of a non-streaming turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub conversation_id: i64,
    pub message: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// Commit a turn to whichever store backs the thread.
async fn commit_turn<R: ConversationRepository>(
    repo: &R,
    sessions: &SessionStore,
    thread: ThreadId,
    role: MessageRole,
    content: &str,
    model: Option<&str>,
    image_url: Option<&str>,
) -> Result<(), ChatError> {
    match thread {
        ThreadId::Durable(id) => {
            repo.insert_message(&NewMessage {
                conversation_id: id,
                role,
                content: content.to_string(),
                model: model.map(str::to_string),
                image_url: image_url.map(str::to_string),
            })
            .await?;
        }
        ThreadId::Ephemeral(id) => {
            sessions.append(
                id,
                SessionTurn::now(
                    role,
                    content,
                    model.map(str::to_string),
                    image_url.map(str::to_string),
                ),
            );
        }
    }
    Ok(())
}

impl<R, P> ChatService<R, P>
where
    R: ConversationRepository + 'static,
    P: CompletionProvider + 'static,
{
    /// Resolve which thread a turn targets, creating one when needed.
    async fn resolve_thread(&self, request: &TurnRequest) -> Result<ThreadId, ChatError> {
        match request.conversation_id {
            Some(raw) => {
                let thread = ThreadId::from_raw(raw)?;
                match thread {
                    ThreadId::Durable(id) => {
                        self.repo
                            .get_conversation(id)
                            .await?
                            .ok_or(ChatError::ConversationNotFound(id))?;
                        Ok(thread)
                    }
                    // Unknown negative ids behave as fresh empty sessions;
                    // the store materializes them on first append.
                    ThreadId::Ephemeral(_) => Ok(thread),
                }
            }
            None if request.ephemeral => Ok(ThreadId::Ephemeral(self.sessions.create())),
            None => {
                let title = match &request.title {
                    Some(t) => Self::validate_title(t)?,
                    None => DEFAULT_TITLE.to_string(),
                };
                let conversation = self
                    .repo
                    .create_conversation(&title, &request.model)
                    .await?;
                tracing::info!(conversation_id = conversation.id, "conversation created");
                Ok(ThreadId::Durable(conversation.id))
            }
        }
    }

    /// Process one non-streaming turn and return the full assistant reply.
    ///
    /// Ephemeral threads are streaming-only; a negative id or the ephemeral
    /// flag is rejected here rather than silently persisted.
    pub async fn send(&self, request: TurnRequest) -> Result<TurnOutcome, ChatError> {
        if request.ephemeral || request.conversation_id.is_some_and(|id| id < 0) {
            return Err(ChatError::Validation(
                "temporary sessions are only available on the streaming endpoint".to_string(),
            ));
        }
        let content = Self::validate_content(&request.message)?;
        let model = Self::validate_model(&request.model)?;

        let thread = self.resolve_thread(&request).await?;
        commit_turn(
            self.repo.as_ref(),
            &self.sessions,
            thread,
            MessageRole::User,
            &content,
            None,
            request.image_url.as_deref(),
        )
        .await?;

        let messages = assemble_history(self.repo.as_ref(), &self.sessions, thread).await?;
        let response = self
            .provider
            .complete(&CompletionRequest {
                model,
                messages,
                stream: false,
            })
            .await?;
        if response.content.trim().is_empty() {
            return Err(ChatError::Upstream(UpstreamError::EmptyResponse));
        }

        commit_turn(
            self.repo.as_ref(),
            &self.sessions,
            thread,
            MessageRole::Assistant,
            &response.content,
            Some(&response.model),
            None,
        )
        .await?;

        Ok(TurnOutcome {
            conversation_id: thread.raw(),
            message: response.content,
            model: response.model,
            timestamp: Utc::now(),
        })
    }

    /// Process one streaming turn.
    ///
    /// Returns the resolved thread id (for the response header) and the
    /// fragment stream. The user turn is committed before this function
    /// returns, so a consumer that drops the stream still sees it; the
    /// assistant turn is committed from inside the stream, after the
    /// upstream completes with non-empty text.
    pub async fn stream_turn(
        &self,
        request: TurnRequest,
    ) -> Result<(ThreadId, impl Stream<Item = String> + Send + 'static), ChatError> {
        let content = Self::validate_content(&request.message)?;
        let model = Self::validate_model(&request.model)?;

        let thread = self.resolve_thread(&request).await?;
        commit_turn(
            self.repo.as_ref(),
            &self.sessions,
            thread,
            MessageRole::User,
            &content,
            None,
            request.image_url.as_deref(),
        )
        .await?;

        let messages = assemble_history(self.repo.as_ref(), &self.sessions, thread).await?;
        let upstream = self.provider.stream(CompletionRequest {
            model: model.clone(),
            messages,
            stream: true,
        });

        let repo = std::sync::Arc::clone(&self.repo);
        let sessions = std::sync::Arc::clone(&self.sessions);
        let fragments = async_stream::stream! {
            let mut upstream = upstream;
            let mut accumulated = String::new();
            let mut failed = false;

            while let Some(event) = upstream.next().await {
                match event {
                    Ok(StreamEvent::Delta(text)) => {
                        accumulated.push_str(&text);
                        yield text;
                    }
                    Ok(StreamEvent::Done) => break,
                    Err(err) => {
                        tracing::warn!(
                            conversation_id = thread.raw(),
                            error = %err,
                            "upstream stream failed"
                        );
                        yield err.user_message();
                        failed = true;
                        break;
                    }
                }
            }

            if failed {
                return;
            }
            if accumulated.trim().is_empty() {
                yield UpstreamError::EmptyResponse.user_message();
                return;
            }
            if let Err(err) = commit_turn(
                repo.as_ref(),
                &sessions,
                thread,
                MessageRole::Assistant,
                &accumulated,
                Some(&model),
                None,
            )
            .await
            {
                tracing::error!(
                    conversation_id = thread.raw(),
                    error = %err,
                    "failed to record assistant turn"
                );
            }
        };

        Ok((thread, fragments))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::StreamExt;

    use chatrelay_types::llm::CompletionResponse;

    use crate::chat::testutil::{MemoryRepository, ScriptedProvider};
    use crate::session::SessionStore;

    use super::*;

    fn service(
        provider: ScriptedProvider,
    ) -> Arc<ChatService<MemoryRepository, ScriptedProvider>> {
        Arc::new(ChatService::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(SessionStore::new()),
            Arc::new(provider),
        ))
    }

    fn turn(conversation_id: Option<i64>, ephemeral: bool) -> TurnRequest {
        TurnRequest {
            conversation_id,
            model: "mistralai/mistral-7b-instruct".to_string(),
            message: "hello".to_string(),
            image_url: None,
            ephemeral,
            title: None,
        }
    }

    #[tokio::test]
    async fn test_stream_turn_commits_user_and_assistant() {
        let service = service(ScriptedProvider::streaming(vec![
            Ok(StreamEvent::Delta("Hel".to_string())),
            Ok(StreamEvent::Delta("lo!".to_string())),
            Ok(StreamEvent::Done),
        ]));

        let (thread, stream) = service.stream_turn(turn(None, false)).await.unwrap();
        assert!(matches!(thread, ThreadId::Durable(1)));

        let fragments: Vec<String> = stream.collect().await;
        assert_eq!(fragments, vec!["Hel", "lo!"]);

        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Hello!");
        assert_eq!(
            messages[1].model.as_deref(),
            Some("mistralai/mistral-7b-instruct")
        );
    }

    #[tokio::test]
    async fn test_stream_turn_upstream_error_yields_one_fragment_no_commit() {
        let service = service(ScriptedProvider::streaming(vec![Err(
            UpstreamError::RateLimited,
        )]));

        let (_, stream) = service.stream_turn(turn(None, false)).await.unwrap();
        let fragments: Vec<String> = stream.collect().await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0], UpstreamError::RateLimited.user_message());

        // User turn stays recorded; no assistant turn.
        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_stream_turn_error_after_partial_output() {
        let service = service(ScriptedProvider::streaming(vec![
            Ok(StreamEvent::Delta("partial".to_string())),
            Err(UpstreamError::Stream("connection reset".to_string())),
        ]));

        let (_, stream) = service.stream_turn(turn(None, false)).await.unwrap();
        let fragments: Vec<String> = stream.collect().await;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "partial");
        assert_eq!(
            fragments[1],
            UpstreamError::Stream(String::new()).user_message()
        );

        // Partial output is never committed.
        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_turn_empty_accumulation_yields_friendly_message() {
        let service = service(ScriptedProvider::streaming(vec![Ok(StreamEvent::Done)]));

        let (_, stream) = service.stream_turn(turn(None, false)).await.unwrap();
        let fragments: Vec<String> = stream.collect().await;
        assert_eq!(fragments, vec![UpstreamError::EmptyResponse.user_message()]);

        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_turn_ephemeral_gets_negative_id_no_durable_rows() {
        let service = service(ScriptedProvider::streaming(vec![
            Ok(StreamEvent::Delta("hi".to_string())),
            Ok(StreamEvent::Done),
        ]));

        let (thread, stream) = service.stream_turn(turn(None, true)).await.unwrap();
        assert_eq!(thread, ThreadId::Ephemeral(-1));

        let _: Vec<String> = stream.collect().await;

        assert!(service.repo.all_messages().is_empty());
        assert!(service.repo.list_conversations().await.unwrap().is_empty());
        let turns = service.sessions.read(-1);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, "hi");
    }

    #[tokio::test]
    async fn test_stream_turn_reuses_existing_ephemeral_session() {
        let service = service(ScriptedProvider::streaming(vec![
            Ok(StreamEvent::Delta("again".to_string())),
            Ok(StreamEvent::Done),
        ]));
        let id = service.sessions.create();
        service.sessions.append(
            id,
            SessionTurn::now(MessageRole::User, "earlier", None, None),
        );

        let (thread, stream) = service.stream_turn(turn(Some(id), false)).await.unwrap();
        assert_eq!(thread, ThreadId::Ephemeral(id));
        let _: Vec<String> = stream.collect().await;

        let turns = service.sessions.read(id);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].content, "again");
    }

    #[tokio::test]
    async fn test_stream_turn_dropped_stream_skips_assistant_commit() {
        let service = service(ScriptedProvider::streaming(vec![
            Ok(StreamEvent::Delta("never read".to_string())),
            Ok(StreamEvent::Done),
        ]));

        let (_, stream) = service.stream_turn(turn(None, false)).await.unwrap();
        drop(stream);

        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_stream_turn_unknown_durable_id_not_found() {
        let service = service(ScriptedProvider::streaming(vec![Ok(StreamEvent::Done)]));
        let err = match service.stream_turn(turn(Some(77), false)).await {
            Err(err) => err,
            Ok(_) => panic!("expected stream_turn to fail for unknown durable id"),
        };
        assert!(matches!(err, ChatError::ConversationNotFound(77)));
    }

    #[tokio::test]
    async fn test_stream_turn_rejects_blank_message() {
        let service = service(ScriptedProvider::streaming(vec![Ok(StreamEvent::Done)]));
        let mut request = turn(None, false);
        request.message = "   ".to_string();
        assert!(matches!(
            service.stream_turn(request).await,
            Err(ChatError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_send_returns_full_reply_and_commits() {
        let service = service(ScriptedProvider::completing(Ok(CompletionResponse {
            content: "Full reply.".to_string(),
            model: "mistralai/mistral-7b-instruct".to_string(),
        })));

        let outcome = service.send(turn(None, false)).await.unwrap();
        assert_eq!(outcome.conversation_id, 1);
        assert_eq!(outcome.message, "Full reply.");

        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Full reply.");
    }

    #[tokio::test]
    async fn test_send_rejects_ephemeral() {
        let service = service(ScriptedProvider::completing(Ok(CompletionResponse {
            content: "unused".to_string(),
            model: "a/b".to_string(),
        })));
        assert!(matches!(
            service.send(turn(None, true)).await,
            Err(ChatError::Validation(_))
        ));
        assert!(matches!(
            service.send(turn(Some(-2), false)).await,
            Err(ChatError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_send_empty_upstream_reply_is_error_and_not_committed() {
        let service = service(ScriptedProvider::completing(Ok(CompletionResponse {
            content: "   ".to_string(),
            model: "a/b".to_string(),
        })));

        let err = service.send(turn(None, false)).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Upstream(UpstreamError::EmptyResponse)
        ));
        let messages = service.repo.get_messages(1).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_implicit_conversation_uses_request_title() {
        let service = service(ScriptedProvider::streaming(vec![
            Ok(StreamEvent::Delta("ok".to_string())),
            Ok(StreamEvent::Done),
        ]));
        let mut request = turn(None, false);
        request.title = Some("Trip planning".to_string());

        let (thread, stream) = service.stream_turn(request).await.unwrap();
        let _: Vec<String> = stream.collect().await;

        let detail = service.conversation_detail(thread.raw()).await.unwrap();
        assert_eq!(detail.title, "Trip planning");
    }
}
