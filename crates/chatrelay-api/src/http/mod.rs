//! HTTP layer for Chatrelay.
//!
//! Axum-based API at `/api/` with a JSON error envelope, CORS support, and
//! request tracing.

pub mod error;
pub mod handlers;
pub mod router;
