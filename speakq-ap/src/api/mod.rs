//! HTTP API
//!
//! `POST /queue` is the intake endpoint; `GET /queue` and `GET /health`
//! report service status.

pub mod handlers;
pub mod server;

pub use server::{create_router, AppContext};
