//! Test doubles for the speech pipeline
//!
//! - `StubSynthesizer`: scripted provider that records every chunk it is asked for
//! - `StubDevice`: playback device that "plays" for a fixed number of polls

#![allow(dead_code)]

use async_trait::async_trait;
use speakq_ap::audio::{AudioBuffer, PlaybackDevice, PlaybackHandle, PlaybackStatus};
use speakq_ap::error::{Error, Result};
use speakq_ap::synthesis::SpeechSynthesizer;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the stub provider does for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Return the chunk text as the audio bytes
    Ok,
    Transient,
    Permanent,
    Panic,
}

pub struct StubSynthesizer {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    limit: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl StubSynthesizer {
    /// Succeeds on every call
    pub fn ok() -> Self {
        Self::scripted(Vec::new(), Step::Ok)
    }

    /// Plays `script` in order, then repeats `fallback`
    pub fn scripted(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            limit: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Every chunk text requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn max_chunk_chars(&self) -> Option<usize> {
        self.limit
    }

    async fn synthesize(&self, text: &str, out: &mut AudioBuffer) -> Result<()> {
        self.calls.lock().unwrap().push(text.to_string());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match step {
            Step::Ok => {
                out.extend_from_slice(text.as_bytes());
                Ok(())
            }
            Step::Transient => Err(Error::transient("provider unavailable")),
            Step::Permanent => Err(Error::permanent("provider rejected text")),
            Step::Panic => panic!("stub provider exploded"),
        }
    }
}

/// Records started buffers and tracks overlapping playbacks
pub struct StubDevice {
    played: Mutex<Vec<Vec<u8>>>,
    segments: Mutex<Vec<Vec<String>>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    polls_per_playback: usize,
    fail_start: bool,
    panic_on_start: bool,
    fail_during_playback: bool,
}

impl StubDevice {
    pub fn new(polls_per_playback: usize) -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            segments: Mutex::new(Vec::new()),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            polls_per_playback,
            fail_start: false,
            panic_on_start: false,
            fail_during_playback: false,
        }
    }

    /// Every `start` call fails
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new(1)
        }
    }

    /// Every `start` call panics, as a broken decoder would
    pub fn panicking_start() -> Self {
        Self {
            panic_on_start: true,
            ..Self::new(1)
        }
    }

    /// Playback starts, then reports a stream error
    pub fn failing_playback() -> Self {
        Self {
            fail_during_playback: true,
            ..Self::new(1)
        }
    }

    /// Buffers handed to the device, in order
    pub fn played(&self) -> Vec<Vec<u8>> {
        self.played.lock().unwrap().clone()
    }

    /// Buffers decoded as UTF-8 (the stub provider returns chunk text)
    pub fn played_text(&self) -> Vec<String> {
        self.played()
            .into_iter()
            .map(|bytes| String::from_utf8(bytes).unwrap())
            .collect()
    }

    /// Per playback, the text of each segment in the buffer
    pub fn played_segments(&self) -> Vec<Vec<String>> {
        self.segments.lock().unwrap().clone()
    }

    /// Highest number of playbacks that were running at once
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl PlaybackDevice for StubDevice {
    fn start(&self, audio: AudioBuffer) -> Result<Box<dyn PlaybackHandle>> {
        if self.panic_on_start {
            panic!("stub decoder exploded");
        }
        if self.fail_start {
            return Err(Error::Decode("not an audio stream".to_string()));
        }

        let segments = audio
            .segments()
            .map(|segment| String::from_utf8_lossy(segment).into_owned())
            .collect();
        self.segments.lock().unwrap().push(segments);
        self.played.lock().unwrap().push(audio.into_bytes());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        Ok(Box::new(StubHandle {
            remaining_polls: AtomicUsize::new(self.polls_per_playback),
            active: Arc::clone(&self.active),
            done: AtomicBool::new(false),
            fail: self.fail_during_playback,
        }))
    }
}

struct StubHandle {
    remaining_polls: AtomicUsize,
    active: Arc<AtomicUsize>,
    done: AtomicBool,
    fail: bool,
}

impl StubHandle {
    fn finish(&self) {
        if !self.done.swap(true, Ordering::SeqCst) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl PlaybackHandle for StubHandle {
    fn duration(&self) -> Duration {
        Duration::from_millis(250)
    }

    fn status(&self) -> PlaybackStatus {
        if self.fail {
            self.finish();
            return PlaybackStatus::Failed("stream error".to_string());
        }

        let remaining = self.remaining_polls.load(Ordering::SeqCst);
        if remaining == 0 {
            self.finish();
            PlaybackStatus::Finished
        } else {
            self.remaining_polls.store(remaining - 1, Ordering::SeqCst);
            PlaybackStatus::Playing
        }
    }
}
