//! Axum HTTP server exposing PII protection to the storage layer.
//!
//! # Responsibilities
//! - `POST /v1/pii/protect` before a record is written.
//! - `POST /v1/pii/reveal` after a record is read.
//! - `GET /health` for liveness and to report the cipher mode.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
