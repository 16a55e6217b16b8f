//! REST API server for the ACE alerting platform.
//!
//! Wires the record store, notification channel and summarizer behind
//! an axum application with OpenAPI docs at `/docs`.

pub mod api;
pub mod app;
pub mod config;
pub mod demo_seed;
pub mod logging;
pub mod state;
