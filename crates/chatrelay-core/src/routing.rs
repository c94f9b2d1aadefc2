//! Thread routing: which store a turn belongs to.
//!
//! A single signed integer routes a turn: positive ids are durable
//! conversations, negative ids are in-memory ephemeral sessions. The sign
//! check happens exactly once, at turn start, producing a [`ThreadId`] that
//! is threaded through the assembler and bridge.

use chatrelay_types::error::ChatError;

/// Tagged routing handle for one conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadId {
    /// Durable conversation; id is positive and store-assigned.
    Durable(i64),
    /// Ephemeral session; id is negative and process-local.
    Ephemeral(i64),
}

impl ThreadId {
    /// Classify a raw signed id. Zero is never a valid thread id.
    pub fn from_raw(id: i64) -> Result<Self, ChatError> {
        match id {
            0 => Err(ChatError::Validation(
                "conversation id must be non-zero".to_string(),
            )),
            n if n > 0 => Ok(ThreadId::Durable(n)),
            n => Ok(ThreadId::Ephemeral(n)),
        }
    }

    /// The raw signed id, suitable for the `X-Conversation-Id` header.
    pub fn raw(&self) -> i64 {
        match self {
            ThreadId::Durable(id) | ThreadId::Ephemeral(id) => *id,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, ThreadId::Ephemeral(_))
    }
}
