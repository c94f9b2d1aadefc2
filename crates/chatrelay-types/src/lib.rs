//! Shared domain types for chatrelay.
//!
//! This crate holds the data shapes passed between the core engine, the
//! infrastructure layer, and the HTTP surface: conversations and messages,
//! provider-facing message formats, the model catalog, configuration, and
//! the error enums used across crate boundaries.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
