//! Playback queue
//!
//! Strict FIFO of pending text items shared by the HTTP handlers (producers)
//! and the playback worker (single consumer).
//!
//! The mutex is held only for the push/pop itself; no I/O happens under it.
//! Capacity is unbounded: a producer that outpaces synthesis + playback grows
//! memory without limit.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Thread-safe FIFO of text awaiting speech
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    items: Mutex<VecDeque<String>>,
    /// Wakes the worker early when an item arrives
    item_added: Notify,
}

impl PlaybackQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` at the tail.
    ///
    /// # Returns
    /// The queue length after the append, i.e. the 1-indexed position of the new item
    ///
    /// # Errors
    /// - `BadRequest` for empty text
    /// - `Queue` if the lock was poisoned by a panicking holder
    pub fn enqueue(&self, text: impl Into<String>) -> Result<usize> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::BadRequest("text must not be empty".to_string()));
        }

        let chars = text.chars().count();
        let position = {
            let mut items = self
                .items
                .lock()
                .map_err(|_| Error::Queue("queue lock poisoned".to_string()))?;
            items.push_back(text);
            items.len()
        };

        self.item_added.notify_one();
        debug!("Added to queue at position {} ({} chars)", position, chars);
        Ok(position)
    }

    /// Remove and return the head item without blocking.
    ///
    /// The consumer recovers a poisoned lock: push/pop never leave the deque
    /// half-modified, so the remaining items are still valid.
    pub fn try_dequeue(&self) -> Option<String> {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        items.pop_front()
    }

    /// Number of pending items
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .map(|items| items.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sleep for up to `timeout`, returning early if an item is enqueued.
    ///
    /// An enqueue that happened since the last wait also ends the wait
    /// immediately, so no item sits idle for a full interval.
    pub async fn wait_for_item(&self, timeout: Duration) {
        tokio::select! {
            _ = self.item_added.notified() => {}
            _ = tokio::time::sleep(timeout) => {}
        }
    }
}
