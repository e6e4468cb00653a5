//! Google Translate TTS
//!
//! Unauthenticated `GET {base_url}/translate_tts` returning MP3. The endpoint
//! rejects long inputs, so chunks are capped at [`GOOGLE_MAX_CHARS`].

use super::{collect_response, http_client, SpeechSynthesizer};
use crate::audio::AudioBuffer;
use crate::config::ProviderConfig;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Longest text the endpoint accepts per request
pub const GOOGLE_MAX_CHARS: usize = 100;

pub struct GoogleTranslateSynthesizer {
    http_client: reqwest::Client,
    endpoint: String,
    language: String,
}

impl GoogleTranslateSynthesizer {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http_client: http_client(config)?,
            endpoint: format!("{}/translate_tts", config.base_url()),
            language: config.language.clone(),
        })
    }

    fn query<'a>(&'a self, text: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("ie", "UTF-8"),
            ("q", text),
            ("tl", self.language.as_str()),
            ("client", "tw-ob"),
        ]
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateSynthesizer {
    fn name(&self) -> &'static str {
        "google"
    }

    fn max_chunk_chars(&self) -> Option<usize> {
        Some(GOOGLE_MAX_CHARS)
    }

    async fn synthesize(&self, text: &str, out: &mut AudioBuffer) -> Result<()> {
        debug!(
            chars = text.chars().count(),
            language = %self.language,
            "Requesting speech from {}",
            self.endpoint
        );

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&self.query(text))
            .send()
            .await?;

        collect_response(self.name(), response, out).await
    }
}
