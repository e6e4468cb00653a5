//! Audio data types

use std::time::Duration;

/// Encoded audio bytes for one queue item
///
/// Synthesized fragments for every chunk are appended in order. Each chunk's
/// response is a complete container of its own, so the end of every chunk is
/// recorded as a segment boundary and the decoder handles segments one by one.
/// Owned by the worker for a single playback cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioBuffer {
    bytes: Vec<u8>,
    /// End offsets of closed segments, ascending
    boundaries: Vec<usize>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment as received from the provider
    pub fn extend_from_slice(&mut self, fragment: &[u8]) {
        self.bytes.extend_from_slice(fragment);
    }

    /// Close the segment being appended to. No-op when nothing was appended
    /// since the last boundary.
    pub fn finish_segment(&mut self) {
        if self.bytes.len() > self.open_start() {
            self.boundaries.push(self.bytes.len());
        }
    }

    /// Non-empty segments in append order, including a trailing unfinished one
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let open = (self.bytes.len() > self.open_start()).then_some(self.bytes.len());
        let mut start = 0;
        self.boundaries.iter().copied().chain(open).map(move |end| {
            let segment = &self.bytes[start..end];
            start = end;
            segment
        })
    }

    fn open_start(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for AudioBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            boundaries: Vec::new(),
        }
    }
}

/// PCM produced by the decoder
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved f32 samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Playback length
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}
