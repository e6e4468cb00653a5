//! Shared service state
//!
//! Everything the HTTP handlers and the playback worker both touch. The queue
//! is the only data mutated by more than one task; the worker state is an
//! atomic snapshot written by the worker and read by `GET /queue`.

use crate::playback::queue::PlaybackQueue;
use crate::playback::worker::WorkerState;
use speakq_common::events::EventBus;
use std::sync::atomic::{AtomicU8, Ordering};

/// Default event channel capacity
const EVENT_CAPACITY: usize = 100;

/// State shared by the API and the worker
#[derive(Debug)]
pub struct SharedState {
    /// Pending text items
    pub queue: PlaybackQueue,

    /// Outcome notifications
    pub events: EventBus,

    worker_state: AtomicU8,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            queue: PlaybackQueue::new(),
            events: EventBus::new(EVENT_CAPACITY),
            worker_state: AtomicU8::new(WorkerState::Idle as u8),
        }
    }

    pub fn worker_state(&self) -> WorkerState {
        WorkerState::from_u8(self.worker_state.load(Ordering::Acquire))
    }

    pub fn set_worker_state(&self, state: WorkerState) {
        self.worker_state.store(state as u8, Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_state_round_trip() {
        let state = SharedState::new();
        assert_eq!(state.worker_state(), WorkerState::Idle);

        state.set_worker_state(WorkerState::Processing);
        assert_eq!(state.worker_state(), WorkerState::Processing);
    }
}
