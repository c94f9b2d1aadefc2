//! In-process ephemeral session store.
//!
//! Sessions hold ordered turn lists keyed by negative ids, disjoint from
//! durable conversation ids. Nothing here survives a restart; that is the
//! point. The store is an explicitly owned object constructed once at
//! startup and shared via `Arc`, never ambient global state.
//!
//! Appends to one session are atomic with respect to each other: DashMap's
//! per-entry locking means concurrent appenders to the same session queue
//! behind the entry lock while unrelated sessions proceed.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

use chatrelay_types::chat::SessionTurn;

/// Table of ephemeral sessions: negative id -> ordered turn list.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<i64, Vec<SessionTurn>>,
    /// Next id to hand out; starts at -1 and decreases, so the k-th
    /// `create` returns -k and ids never repeat within a process lifetime.
    next_id: AtomicI64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicI64::new(-1),
        }
    }

    /// Allocate a fresh session id and initialize an empty turn list.
    pub fn create(&self) -> i64 {
        let id = self.next_id.fetch_sub(1, Ordering::Relaxed);
        self.sessions.insert(id, Vec::new());
        tracing::debug!(session_id = id, "ephemeral session created");
        id
    }

    /// Append a turn, lazily creating the session if it does not exist.
    pub fn append(&self, id: i64, turn: SessionTurn) {
        self.sessions.entry(id).or_default().push(turn);
    }

    /// Ordered turns for a session. Unknown ids read as empty, never as an
    /// error: an unknown session is treated as empty, not missing.
    pub fn read(&self, id: i64) -> Vec<SessionTurn> {
        self.sessions
            .get(&id)
            .map(|turns| turns.clone())
            .unwrap_or_default()
    }

    /// Drop a session and its turns.
    pub fn delete(&self, id: i64) {
        self.sessions.remove(&id);
    }

    /// Live session count, for diagnostics.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
