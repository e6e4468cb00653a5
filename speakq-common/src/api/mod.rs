//! API module for shared HTTP API types
//!
//! Contains ONLY serde types; each service wraps them with its own framework
//! handlers (Axum).

pub mod types;

pub use types::{
    ErrorResponse, HealthResponse, QueueRequest, QueueResponse, QueueStatusResponse,
};
