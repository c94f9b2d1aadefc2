//! SQLite persistence: split read/write pool and the conversation repository.

pub mod conversation;
pub mod pool;

pub use conversation::SqliteConversationRepository;
pub use pool::DatabasePool;
