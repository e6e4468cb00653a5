//! Audio output using cpal
//!
//! Each playback decodes the buffer, converts it to the device's native rate
//! and channel count, and plays it on a dedicated audio thread that owns the
//! cpal stream (streams are not `Send` on every platform). The returned handle
//! only shares atomic progress flags with that thread.

use crate::audio::decoder::BufferDecoder;
use crate::audio::resampler::Resampler;
use crate::audio::types::{AudioBuffer, DecodedAudio};
use crate::audio::{PlaybackDevice, PlaybackHandle, PlaybackStatus};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, warn};

/// How often the audio thread checks whether the stream drained
const DRAIN_CHECK_INTERVAL: Duration = Duration::from_millis(20);

/// Output device backed by the system audio host
pub struct CpalPlaybackDevice {
    /// Requested device name (None = default)
    device_name: Option<String>,
    /// Linear gain applied to every sample
    volume: f32,
}

impl CpalPlaybackDevice {
    pub fn new(device_name: Option<String>, volume: f32) -> Self {
        Self {
            device_name,
            volume,
        }
    }

    /// List available audio output devices
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open the requested device, falling back to the default device
    fn open_device(&self) -> Result<Device> {
        let host = cpal::default_host();

        if let Some(name) = self.device_name.as_ref() {
            let mut devices = host
                .output_devices()
                .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?;

            if let Some(device) = devices.find(|d| d.name().ok().as_ref() == Some(name)) {
                debug!("Using requested audio device: {}", name);
                return Ok(device);
            }

            warn!("Requested device '{}' not found, falling back to default device", name);
        }

        host.default_output_device()
            .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))
    }

    /// Convert decoded audio to the device's native rate and channel count
    fn prepare_samples(
        decoded: &DecodedAudio,
        config: &StreamConfig,
        volume: f32,
    ) -> Result<Vec<f32>> {
        let resampled = Resampler::resample(
            &decoded.samples,
            decoded.sample_rate,
            config.sample_rate.0,
            decoded.channels,
        )?;
        let mut samples = Resampler::remap_channels(&resampled, decoded.channels, config.channels);

        if (volume - 1.0).abs() > f32::EPSILON {
            for sample in &mut samples {
                *sample = (*sample * volume).clamp(-1.0, 1.0);
            }
        }

        Ok(samples)
    }
}

impl PlaybackDevice for CpalPlaybackDevice {
    fn start(&self, audio: AudioBuffer) -> Result<Box<dyn PlaybackHandle>> {
        let decoded = BufferDecoder::decode(audio)?;
        let duration = decoded.duration();

        let device = self.open_device()?;
        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;
        let sample_format = supported.sample_format();
        let config = supported.config();

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        let samples = Self::prepare_samples(&decoded, &config, self.volume)?;
        let progress = Arc::new(PlaybackProgress::new(samples));

        // The stream is created, played and dropped on the audio thread.
        // Build/start errors come back over `ready_rx` before we return.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let thread_progress = Arc::clone(&progress);
        std::thread::Builder::new()
            .name("speakq-audio".to_string())
            .spawn(move || {
                run_stream(device, config, sample_format, thread_progress, ready_tx);
            })
            .map_err(|e| Error::AudioOutput(format!("Failed to spawn audio thread: {}", e)))?;

        ready_rx
            .recv()
            .map_err(|_| Error::AudioOutput("Audio thread exited during startup".to_string()))??;

        debug!("Audio stream started ({} samples)", progress.samples.len());

        Ok(Box::new(CpalPlaybackHandle { progress, duration }))
    }
}

/// State shared between the audio callback and the handle
struct PlaybackProgress {
    samples: Vec<f32>,
    position: AtomicUsize,
    finished: AtomicBool,
    error: Mutex<Option<String>>,
}

impl PlaybackProgress {
    fn new(samples: Vec<f32>) -> Self {
        Self {
            finished: AtomicBool::new(samples.is_empty()),
            samples,
            position: AtomicUsize::new(0),
            error: Mutex::new(None),
        }
    }

    fn record_error(&self, message: String) {
        if let Ok(mut slot) = self.error.lock() {
            slot.get_or_insert(message);
        }
    }

    fn error(&self) -> Option<String> {
        self.error.lock().ok().and_then(|slot| slot.clone())
    }

    /// Copy the next samples into `data`, padding with silence at the end
    fn fill<T>(&self, data: &mut [T])
    where
        T: SizedSample + FromSample<f32>,
    {
        let start = self.position.load(Ordering::Acquire);
        let available = self.samples.len().saturating_sub(start);
        let take = available.min(data.len());

        for (out, sample) in data.iter_mut().zip(&self.samples[start..start + take]) {
            *out = T::from_sample(*sample);
        }
        for out in &mut data[take..] {
            *out = T::EQUILIBRIUM;
        }

        self.position.store(start + take, Ordering::Release);
        if start + take >= self.samples.len() {
            self.finished.store(true, Ordering::Release);
        }
    }
}

/// Audio thread body: build the stream, play until drained, drop it
fn run_stream(
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    progress: Arc<PlaybackProgress>,
    ready_tx: mpsc::Sender<Result<()>>,
) {
    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(&progress)),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(&progress)),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(&progress)),
        other => Err(Error::AudioOutput(format!("Unsupported sample format: {:?}", other))),
    };

    let stream = match stream.and_then(|stream| {
        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;
        Ok(stream)
    }) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    while !progress.finished.load(Ordering::Acquire) && progress.error().is_none() {
        std::thread::sleep(DRAIN_CHECK_INTERVAL);
    }

    // Let the device play out the last callback buffer before tearing down
    std::thread::sleep(DRAIN_CHECK_INTERVAL);
    drop(stream);
    debug!("Audio stream closed");
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    progress: Arc<PlaybackProgress>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let error_progress = Arc::clone(&progress);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                progress.fill(data);
            },
            move |err| {
                error!("Audio stream error: {}", err);
                error_progress.record_error(err.to_string());
            },
            None,
        )
        .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
}

/// Handle returned by [`CpalPlaybackDevice::start`]
struct CpalPlaybackHandle {
    progress: Arc<PlaybackProgress>,
    duration: Duration,
}

impl PlaybackHandle for CpalPlaybackHandle {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn status(&self) -> PlaybackStatus {
        if let Some(message) = self.progress.error() {
            return PlaybackStatus::Failed(message);
        }
        if self.progress.finished.load(Ordering::Acquire) {
            PlaybackStatus::Finished
        } else {
            PlaybackStatus::Playing
        }
    }
}
