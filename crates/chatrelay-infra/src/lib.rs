//! Infrastructure implementations for Chatrelay.
//!
//! Concrete backends for the traits defined in `chatrelay-core`: the SQLite
//! conversation repository, the OpenRouter completion provider, and the
//! configuration loader.

pub mod config;
pub mod openrouter;
pub mod sqlite;
