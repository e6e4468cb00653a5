//! # SpeakQ Audio Player Library (speakq-ap)
//!
//! Ordered text-to-speech playback service.
//!
//! **Purpose:** Accept text over HTTP, queue it, and have a single worker
//! synthesize and play each item in submission order.
//!
//! **Architecture:** axum intake -> [`playback::PlaybackQueue`] ->
//! [`playback::PlaybackWorker`] -> [`playback::SpeechPipeline`]
//! (chunker + retrying [`synthesis::SpeechSynthesizer`] + [`audio::PlaybackDevice`]).

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod state;
pub mod synthesis;

pub use error::{Error, Result};
pub use state::SharedState;
