//! Audio decoder using symphonia
//!
//! Decodes a synthesized in-memory buffer (MP3, WAV, FLAC, AAC, Vorbis) to
//! interleaved f32 PCM. The container is probed from the bytes themselves;
//! providers don't reliably report a content type.

use crate::audio::resampler::Resampler;
use crate::audio::types::{AudioBuffer, DecodedAudio};
use crate::error::{Error, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace, warn};

/// In-memory audio decoder
pub struct BufferDecoder;

impl BufferDecoder {
    /// Decode an entire buffer to PCM.
    ///
    /// Every segment is a separate container and is decoded on its own; the
    /// PCM is concatenated in order. Segments that differ from the first in
    /// rate or channel count are converted to match it. Corrupt packets are
    /// skipped with a warning; a segment that yields no samples at all is an
    /// error.
    ///
    /// # Errors
    /// - Empty buffer
    /// - Unrecognized container format
    /// - No decodable audio track
    pub fn decode(audio: AudioBuffer) -> Result<DecodedAudio> {
        if audio.is_empty() {
            return Err(Error::Decode("Audio buffer is empty".to_string()));
        }

        debug!("Decoding {} bytes of synthesized audio", audio.len());

        let mut merged: Option<DecodedAudio> = None;
        for (index, segment) in audio.segments().enumerate() {
            let part = Self::decode_segment(segment.to_vec())?;
            trace!(
                "Segment {}: {} frames at {}Hz, {} channel(s)",
                index,
                part.frames(),
                part.sample_rate,
                part.channels
            );

            merged = Some(match merged {
                None => part,
                Some(mut acc) => {
                    let samples = Self::conform(part, acc.sample_rate, acc.channels)?;
                    acc.samples.extend_from_slice(&samples);
                    acc
                }
            });
        }

        let decoded =
            merged.ok_or_else(|| Error::Decode("Audio buffer is empty".to_string()))?;

        debug!(
            "Decoded {} frames at {}Hz, {} channel(s)",
            decoded.frames(),
            decoded.sample_rate,
            decoded.channels
        );

        Ok(decoded)
    }

    /// Bring a later segment to the format of the first one
    fn conform(part: DecodedAudio, sample_rate: u32, channels: u16) -> Result<Vec<f32>> {
        if part.sample_rate == sample_rate && part.channels == channels {
            return Ok(part.samples);
        }
        warn!(
            "Segment format {}Hz/{}ch differs from {}Hz/{}ch, converting",
            part.sample_rate, part.channels, sample_rate, channels
        );
        let remapped = Resampler::remap_channels(&part.samples, part.channels, channels);
        Resampler::resample(&remapped, part.sample_rate, sample_rate, channels)
    }

    fn decode_segment(bytes: Vec<u8>) -> Result<DecodedAudio> {
        let source = Cursor::new(bytes);
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("Decoder reset required mid-stream, stopping");
                    break;
                }
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u16;

                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Skipping corrupt packet: {}", e);
                }
                Err(e) => {
                    return Err(Error::Decode(format!("Decode failed: {}", e)));
                }
            }
        }

        if samples.is_empty() || sample_rate == 0 || channels == 0 {
            return Err(Error::Decode("No audio samples decoded".to_string()));
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }
}
