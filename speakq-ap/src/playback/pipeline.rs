//! Synthesis and playback of one queue item
//!
//! Splits the text, synthesizes every chunk into one [`AudioBuffer`] under
//! the [`RetryPolicy`], then plays the buffer and waits for the device to go
//! idle. A transient failure on any chunk restarts the whole item from its
//! first chunk with a fresh buffer.

use crate::audio::{AudioBuffer, PlaybackDevice, PlaybackStatus};
use crate::config::TomlConfig;
use crate::error::{Error, Result};
use crate::playback::chunker::split_text;
use crate::playback::retry::RetryPolicy;
use crate::synthesis::SpeechSynthesizer;
use speakq_common::events::{EventBus, SpeechEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// How one item ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Synthesized and played to the end
    Completed {
        /// Time spent synthesizing on the successful attempt
        synthesis: Duration,
        /// Length of the played audio
        audio: Duration,
        attempts: u32,
    },
    /// Dropped after a permanent failure or retry exhaustion
    Abandoned { reason: String, attempts: u32 },
}

impl PlaybackOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Synthesizes and plays queue items one at a time
pub struct SpeechPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    device: Arc<dyn PlaybackDevice>,
    retry: RetryPolicy,
    max_chunk_chars: usize,
    poll_interval: Duration,
    events: Option<EventBus>,
}

impl SpeechPipeline {
    /// Create a pipeline
    ///
    /// The chunk limit is lowered to the provider's own limit when it has one.
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        device: Arc<dyn PlaybackDevice>,
        retry: RetryPolicy,
        max_chunk_chars: usize,
        poll_interval: Duration,
    ) -> Self {
        let max_chunk_chars = match synthesizer.max_chunk_chars() {
            Some(limit) => max_chunk_chars.min(limit),
            None => max_chunk_chars,
        };

        Self {
            synthesizer,
            device,
            retry,
            max_chunk_chars,
            poll_interval,
            events: None,
        }
    }

    /// Build from loaded configuration
    pub fn from_config(
        config: &TomlConfig,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        device: Arc<dyn PlaybackDevice>,
    ) -> Self {
        Self::new(
            synthesizer,
            device,
            RetryPolicy::from_config(&config.retry),
            config.playback.max_chunk_chars,
            config.playback.poll_interval(),
        )
    }

    /// Publish playback events on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    /// Synthesize and play `text`, waiting until playback finishes.
    ///
    /// Never returns an error: failures are logged critically and reported
    /// as [`PlaybackOutcome::Abandoned`].
    pub async fn run(&self, text: &str) -> PlaybackOutcome {
        let chunks = split_text(text, self.max_chunk_chars);
        if chunks.is_empty() {
            warn!("Skipping queue item with no speakable text");
            let reason = "No speakable text".to_string();
            self.emit(SpeechEvent::PlaybackAbandoned {
                reason: reason.clone(),
                attempts: 0,
                timestamp: chrono::Utc::now(),
            });
            return PlaybackOutcome::Abandoned {
                reason,
                attempts: 0,
            };
        }

        info!(
            "Converting {} characters in {} chunk(s) with {}",
            text.chars().count(),
            chunks.len(),
            self.synthesizer.name()
        );
        self.emit(SpeechEvent::PlaybackStarted {
            chars: text.chars().count(),
            chunks: chunks.len(),
            timestamp: chrono::Utc::now(),
        });

        let attempted = self
            .retry
            .run(|_attempt| self.synthesize_all(&chunks))
            .await;
        let attempts = attempted.attempts;

        let (buffer, synthesis) = match attempted.result {
            Ok(synthesized) => synthesized,
            Err(e) => return self.abandon(e.to_string(), attempts),
        };

        info!(
            "Text to speech conversion took {:.2} seconds",
            synthesis.as_secs_f64()
        );

        match self.play(buffer).await {
            Ok(audio) => {
                info!("Finished playing audio ({:.2} seconds)", audio.as_secs_f64());
                self.emit(SpeechEvent::PlaybackCompleted {
                    synthesis_ms: synthesis.as_millis() as u64,
                    audio_ms: audio.as_millis() as u64,
                    attempts,
                    timestamp: chrono::Utc::now(),
                });
                PlaybackOutcome::Completed {
                    synthesis,
                    audio,
                    attempts,
                }
            }
            Err(e) => self.abandon(e.to_string(), attempts),
        }
    }

    /// One attempt: every chunk in order into a fresh buffer
    async fn synthesize_all(&self, chunks: &[String]) -> Result<(AudioBuffer, Duration)> {
        let started = Instant::now();
        let mut buffer = AudioBuffer::new();

        for chunk in chunks {
            self.synthesizer.synthesize(chunk, &mut buffer).await?;
            buffer.finish_segment();
        }

        Ok((buffer, started.elapsed()))
    }

    /// Start playback and poll the device until it is no longer busy
    async fn play(&self, buffer: AudioBuffer) -> Result<Duration> {
        let device = Arc::clone(&self.device);
        let handle = match tokio::task::spawn_blocking(move || device.start(buffer)).await {
            Ok(started) => started?,
            // Carry the panic into the item task so the worker sees it
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(Error::Playback(format!("Playback start task failed: {}", e))),
        };

        let duration = handle.duration();
        info!("Playing audio: {:.2} seconds", duration.as_secs_f64());

        loop {
            match handle.status() {
                PlaybackStatus::Playing => tokio::time::sleep(self.poll_interval).await,
                PlaybackStatus::Finished => return Ok(duration),
                PlaybackStatus::Failed(message) => return Err(Error::Playback(message)),
            }
        }
    }

    fn abandon(&self, reason: String, attempts: u32) -> PlaybackOutcome {
        error!(
            severity = "CRITICAL",
            attempts,
            "Dropping queue item: {}",
            reason
        );
        self.emit(SpeechEvent::PlaybackAbandoned {
            reason: reason.clone(),
            attempts,
            timestamp: chrono::Utc::now(),
        });
        PlaybackOutcome::Abandoned { reason, attempts }
    }

    fn emit(&self, event: SpeechEvent) {
        if let Some(events) = &self.events {
            events.emit_lossy(event);
        }
    }
}
