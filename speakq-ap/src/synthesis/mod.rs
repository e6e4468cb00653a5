//! Speech synthesis providers
//!
//! A provider turns one chunk of text into encoded audio bytes, streaming
//! them into the item's [`AudioBuffer`] as they arrive. Failures are
//! classified as transient or permanent (see [`crate::error::Error::is_transient`])
//! so the retry policy knows whether another attempt makes sense.

pub mod google;
pub mod openai;

pub use google::GoogleTranslateSynthesizer;
pub use openai::OpenAiSynthesizer;

use crate::audio::AudioBuffer;
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{is_transient_status, Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::info;

const USER_AGENT: &str = concat!("speakq/", env!("CARGO_PKG_VERSION"));

/// Text-to-speech backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Largest chunk the provider accepts, if it is stricter than the configured maximum
    fn max_chunk_chars(&self) -> Option<usize> {
        None
    }

    /// Synthesize `text`, appending the encoded audio fragments to `out` in order
    async fn synthesize(&self, text: &str, out: &mut AudioBuffer) -> Result<()>;
}

/// Build the provider selected in configuration
pub fn build_synthesizer(config: &ProviderConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    let synthesizer: Arc<dyn SpeechSynthesizer> = match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiSynthesizer::new(config)?),
        ProviderKind::Google => Arc::new(GoogleTranslateSynthesizer::new(config)?),
    };

    info!(
        "Synthesis provider: {} ({})",
        synthesizer.name(),
        config.base_url()
    );
    Ok(synthesizer)
}

/// Shared HTTP client setup for providers
fn http_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Stream a successful response body into `out`, or classify a failed one
async fn collect_response(
    provider: &str,
    response: reqwest::Response,
    out: &mut AudioBuffer,
) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("{} returned HTTP {}: {}", provider, status.as_u16(), body.trim());
        return Err(if is_transient_status(status.as_u16()) {
            Error::transient(message)
        } else {
            Error::permanent(message)
        });
    }

    let mut received = 0usize;
    let mut stream = response.bytes_stream();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        received += fragment.len();
        out.extend_from_slice(&fragment);
    }

    if received == 0 {
        return Err(Error::permanent(format!("{} returned an empty audio body", provider)));
    }
    Ok(())
}
