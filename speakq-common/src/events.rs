//! Event types for the SpeakQ event system
//!
//! Events describe what happened to queued text after the HTTP response was
//! sent. They are never routed back to the submitter; they exist for logging
//! and for optional observers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Speech pipeline events
///
/// Events are broadcast via [`EventBus`] and can be serialized for transmission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SpeechEvent {
    /// Text accepted into the playback queue
    Enqueued {
        /// 1-indexed queue position reported to the submitter
        position: usize,
        /// When the item was accepted
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Worker took an item off the queue and began synthesis
    PlaybackStarted {
        /// Character count of the item
        chars: usize,
        /// Number of chunks sent to the provider per attempt
        chunks: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item was synthesized and played to the end
    PlaybackCompleted {
        /// Wall time spent synthesizing all chunks (last attempt)
        synthesis_ms: u64,
        /// Duration of the decoded audio
        audio_ms: u64,
        /// Attempts used, including the successful one
        attempts: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item was dropped after a permanent failure or retry exhaustion
    PlaybackAbandoned {
        /// Error description
        reason: String,
        /// Attempts used before giving up
        attempts: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus
///
/// Wraps a `tokio::broadcast` channel:
/// - Non-blocking publish (slow subscribers don't block the worker)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use speakq_common::events::{EventBus, SpeechEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(SpeechEvent::Enqueued {
///     position: 1,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(SpeechEvent::Enqueued { position: 1, .. })));
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SpeechEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the "no subscribers" case
    pub fn emit_lossy(&self, event: SpeechEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
