//! Service-side wiring for the letter dispatch pipeline.
//!
//! Configuration loading, error-to-status mapping, and the axum router live
//! here; `main.rs` assembles them into the running server.

pub mod config;
pub mod error;
pub mod handlers;
