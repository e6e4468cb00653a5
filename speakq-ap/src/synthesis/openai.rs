//! OpenAI-compatible speech endpoint
//!
//! `POST {base_url}/audio/speech` with a JSON body. Works against OpenAI and
//! local servers that mimic it (Kokoro-FastAPI, openedai-speech).

use super::{collect_response, http_client, SpeechSynthesizer};
use crate::audio::AudioBuffer;
use crate::config::ProviderConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

pub struct OpenAiSynthesizer {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    voice: String,
    response_format: String,
}

impl OpenAiSynthesizer {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http_client: http_client(config)?,
            endpoint: format!("{}/audio/speech", config.base_url()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            response_format: config.response_format.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn synthesize(&self, text: &str, out: &mut AudioBuffer) -> Result<()> {
        debug!(
            chars = text.chars().count(),
            voice = %self.voice,
            "Requesting speech from {}",
            self.endpoint
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest {
                model: &self.model,
                voice: &self.voice,
                input: text,
                response_format: &self.response_format,
            })
            .send()
            .await?;

        collect_response(self.name(), response, out).await
    }
}
