//! # SpeakQ Common Library
//!
//! Shared code for the SpeakQ services including:
//! - Error type shared by configuration helpers
//! - Configuration file resolution and TOML loading
//! - HTTP API request/response types
//! - Speech pipeline event types

pub mod api;
pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventBus, SpeechEvent};
