//! Turn-processing engine for chatrelay.
//!
//! This crate owns the parts of the system with real state-machine and
//! concurrency concerns:
//!
//! - [`session`] — the in-process ephemeral session store (negative ids,
//!   discarded on restart);
//! - [`routing`] — the tagged thread id selecting durable vs ephemeral
//!   storage once per turn;
//! - [`chat`] — the repository trait, history assembler, streaming bridge,
//!   and edit/truncate coordinator;
//! - [`llm`] — the upstream completion-provider trait implemented in
//!   chatrelay-infra.

pub mod chat;
pub mod llm;
pub mod routing;
pub mod session;
