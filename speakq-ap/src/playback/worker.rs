//! Playback worker
//!
//! The single consumer of the playback queue. Runs the state machine
//!
//! ```text
//! Idle -> Dequeuing -> Processing -> Sleeping -> Idle
//!              \______________________/
//!                     (queue empty)
//! ```
//!
//! until shutdown. Each item runs in its own task so that a panic anywhere in
//! synthesis or playback is caught at the join point; that is the one
//! condition the worker does not survive.

use crate::error::{Error, Result};
use crate::playback::pipeline::{PlaybackOutcome, SpeechPipeline};
use crate::state::SharedState;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Worker loop state, observable through [`SharedState::worker_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Idle = 0,
    Dequeuing = 1,
    Processing = 2,
    Sleeping = 3,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dequeuing => "dequeuing",
            Self::Processing => "processing",
            Self::Sleeping => "sleeping",
        }
    }

    /// Decode a stored discriminant; unknown values read as `Idle`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Dequeuing,
            2 => Self::Processing,
            3 => Self::Sleeping,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedicated consumer that speaks queued items one at a time
pub struct PlaybackWorker {
    state: Arc<SharedState>,
    pipeline: Arc<SpeechPipeline>,
    idle_interval: Duration,
}

impl PlaybackWorker {
    pub fn new(state: Arc<SharedState>, pipeline: Arc<SpeechPipeline>, idle_interval: Duration) -> Self {
        Self {
            state,
            pipeline,
            idle_interval,
        }
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// # Errors
    /// `WorkerFatal` when processing an item panics. The caller is expected
    /// to stop the process.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        info!(
            "Playback worker started (idle interval {}ms)",
            self.idle_interval.as_millis()
        );

        while !shutdown.is_cancelled() {
            self.transition(WorkerState::Idle);

            self.transition(WorkerState::Dequeuing);
            if let Some(text) = self.state.queue.try_dequeue() {
                self.transition(WorkerState::Processing);
                self.process(text, &shutdown).await?;
            }

            self.transition(WorkerState::Sleeping);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.state.queue.wait_for_item(self.idle_interval) => {}
            }
        }

        self.transition(WorkerState::Idle);
        info!("Playback worker stopped");
        Ok(())
    }

    fn transition(&self, next: WorkerState) {
        self.state.set_worker_state(next);
    }

    /// Synthesize and play one item in its own task
    async fn process(&self, text: String, shutdown: &CancellationToken) -> Result<()> {
        debug!("Dequeued item ({} characters)", text.chars().count());

        let pipeline = Arc::clone(&self.pipeline);
        let mut task = tokio::spawn(async move { pipeline.run(&text).await });

        tokio::select! {
            joined = &mut task => match joined {
                Ok(PlaybackOutcome::Completed { attempts, .. }) => {
                    debug!("Item completed after {} attempt(s)", attempts);
                    Ok(())
                }
                Ok(PlaybackOutcome::Abandoned { attempts, .. }) => {
                    debug!("Item abandoned after {} attempt(s)", attempts);
                    Ok(())
                }
                Err(e) if e.is_panic() => {
                    let message = panic_message(e.into_panic());
                    error!(severity = "CRITICAL", "Playback worker panicked: {}", message);
                    Err(Error::WorkerFatal(message))
                }
                Err(e) => {
                    error!(severity = "CRITICAL", "Playback task failed: {}", e);
                    Err(Error::WorkerFatal(e.to_string()))
                }
            },
            _ = shutdown.cancelled() => {
                task.abort();
                warn!("Shutdown during playback, current item dropped");
                Ok(())
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_discriminant_round_trip() {
        for state in [
            WorkerState::Idle,
            WorkerState::Dequeuing,
            WorkerState::Processing,
            WorkerState::Sleeping,
        ] {
            assert_eq!(WorkerState::from_u8(state as u8), state);
        }
        assert_eq!(WorkerState::from_u8(200), WorkerState::Idle);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(WorkerState::Sleeping.as_str(), "sleeping");
        assert_eq!(WorkerState::Dequeuing.to_string(), "dequeuing");
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }
}
