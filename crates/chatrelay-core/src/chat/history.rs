//! History assembly: stored turns to provider-ready messages.
//!
//! Regardless of which store backs a thread, assembly produces the same
//! ordered, oldest-to-newest message sequence: a turn without an image
//! becomes plain text content, a turn with one becomes a two-part
//! text + image block. Durable reads come back ordered by `(created_at, id)`
//! and the ephemeral list is insertion-ordered, so the result is stable for
//! a fixed set of stored turns.

use chatrelay_types::chat::MessageRole;
use chatrelay_types::error::ChatError;
use chatrelay_types::llm::ProviderMessage;

use crate::chat::repository::ConversationRepository;
use crate::routing::ThreadId;
use crate::session::SessionStore;

/// Convert one stored turn into the provider message format.
fn to_provider_message(
    role: MessageRole,
    content: &str,
    image_url: Option<&str>,
) -> ProviderMessage {
    match image_url {
        Some(url) => ProviderMessage::with_image(role, content, url),
        None => ProviderMessage::text(role, content),
    }
}

/// Assemble the full ordered history for a thread.
pub async fn assemble_history<R: ConversationRepository>(
    repo: &R,
    sessions: &SessionStore,
    thread: ThreadId,
) -> Result<Vec<ProviderMessage>, ChatError> {
    let messages = match thread {
        ThreadId::Durable(id) => repo
            .get_messages(id)
            .await?
            .iter()
            .map(|m| to_provider_message(m.role, &m.content, m.image_url.as_deref()))
            .collect(),
        ThreadId::Ephemeral(id) => sessions
            .read(id)
            .iter()
            .map(|t| to_provider_message(t.role, &t.content, t.image_url.as_deref()))
            .collect(),
    };
    Ok(messages)
}
