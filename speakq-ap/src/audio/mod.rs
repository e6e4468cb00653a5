//! Audio decode and output
//!
//! The playback pipeline talks to the sound card through [`PlaybackDevice`]:
//! hand over an encoded buffer, then poll the returned handle until it stops
//! being busy. [`output::CpalPlaybackDevice`] is the real implementation
//! (symphonia decode, rubato resample, cpal output).

pub mod decoder;
pub mod output;
pub mod resampler;
pub mod types;

pub use types::{AudioBuffer, DecodedAudio};

use crate::error::Result;
use std::time::Duration;

/// Progress of one playback, as reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Still producing sound
    Playing,
    /// Reached the end of the buffer
    Finished,
    /// The output stream reported an error
    Failed(String),
}

/// An output device that plays one decodable buffer at a time
pub trait PlaybackDevice: Send + Sync {
    /// Decode `audio` and begin playback, returning without waiting for it to end.
    ///
    /// May block while decoding; callers on an async runtime should use
    /// `spawn_blocking`.
    fn start(&self, audio: AudioBuffer) -> Result<Box<dyn PlaybackHandle>>;
}

/// Handle to an in-progress playback
pub trait PlaybackHandle: Send {
    /// Length of the decoded audio
    fn duration(&self) -> Duration;

    /// Current status; polled until it is no longer `Playing`
    fn status(&self) -> PlaybackStatus;

    fn is_busy(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }
}
