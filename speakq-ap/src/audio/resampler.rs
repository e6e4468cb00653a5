//! Sample rate and channel conversion
//!
//! Synthesized speech rarely matches the output device: providers commonly
//! return 22.05kHz or 24kHz mono while cards run at 44.1/48kHz stereo. Audio is
//! converted to the device format once, before playback starts.

use crate::error::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Audio resampler using rubato
pub struct Resampler;

impl Resampler {
    /// Resample interleaved audio from `input_rate` to `output_rate`.
    ///
    /// Returns a copy without resampling when the rates already match.
    pub fn resample(
        input: &[f32],
        input_rate: u32,
        output_rate: u32,
        channels: u16,
    ) -> Result<Vec<f32>> {
        if input_rate == output_rate {
            debug!("Sample rate already at {}Hz, skipping resample", output_rate);
            return Ok(input.to_vec());
        }
        if channels == 0 || input_rate == 0 || output_rate == 0 {
            return Err(Error::Decode(format!(
                "Cannot resample {}Hz -> {}Hz with {} channels",
                input_rate, output_rate, channels
            )));
        }

        let planar_input = Self::deinterleave(input, channels);
        let input_frames = planar_input[0].len();
        if input_frames == 0 {
            return Ok(Vec::new());
        }

        debug!(
            "Resampling {} frames from {}Hz to {}Hz ({} channels)",
            input_frames, input_rate, output_rate, channels
        );

        // One chunk covering the whole buffer
        let mut resampler = FastFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            1.0,
            PolynomialDegree::Septic,
            input_frames,
            channels as usize,
        )
        .map_err(|e| Error::Decode(format!("Failed to create resampler: {}", e)))?;

        let planar_output = resampler
            .process(&planar_input, None)
            .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

        Ok(Self::interleave(planar_output))
    }

    /// Convert interleaved audio between channel counts.
    ///
    /// - Mono source: copied to every output channel
    /// - Mono output: average of all source channels
    /// - Otherwise: channels copied by index, missing ones silent
    pub fn remap_channels(input: &[f32], from: u16, to: u16) -> Vec<f32> {
        let (from, to) = (from as usize, to as usize);
        if from == to || from == 0 || to == 0 {
            return input.to_vec();
        }

        let frames = input.len() / from;
        let mut output = Vec::with_capacity(frames * to);

        for frame in input.chunks_exact(from) {
            if from == 1 {
                output.extend(std::iter::repeat(frame[0]).take(to));
            } else if to == 1 {
                output.push(frame.iter().sum::<f32>() / from as f32);
            } else {
                output.extend((0..to).map(|ch| frame.get(ch).copied().unwrap_or(0.0)));
            }
        }

        output
    }

    /// Convert interleaved samples to planar format.
    ///
    /// Input:  [L, R, L, R, L, R, ...]
    /// Output: [[L, L, L, ...], [R, R, R, ...]]
    fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
        let num_channels = channels as usize;
        let num_frames = samples.len() / num_channels;

        let mut planar = vec![Vec::with_capacity(num_frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch_idx, sample) in frame.iter().enumerate() {
                planar[ch_idx].push(*sample);
            }
        }

        planar
    }

    /// Convert planar samples to interleaved format.
    fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
        if planar.is_empty() {
            return Vec::new();
        }

        let num_channels = planar.len();
        let num_frames = planar[0].len();
        let mut interleaved = Vec::with_capacity(num_frames * num_channels);

        for frame_idx in 0..num_frames {
            for channel in &planar {
                interleaved.push(channel[frame_idx]);
            }
        }

        interleaved
    }
}
