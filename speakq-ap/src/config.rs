//! Configuration management for speakq-ap
//!
//! Settings sources priority:
//! 1. Command-line arguments (--port, --bind-addr, --config)
//! 2. Environment variables (SPEAKQ_PORT, SPEAKQ_CONFIG, ...)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! Every section and field is optional in the TOML file; missing values take
//! the defaults below.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the TOML file
pub const CONFIG_ENV_VAR: &str = "SPEAKQ_CONFIG";

/// Directory name under the platform config dir
pub const APP_NAME: &str = "speakq";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    pub bind_addr: String,

    /// HTTP server port
    pub port: u16,

    pub logging: LoggingConfig,
    pub provider: ProviderConfig,
    pub playback: PlaybackConfig,
    pub retry: RetryConfig,
    pub worker: WorkerConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 7070,
            logging: LoggingConfig::default(),
            provider: ProviderConfig::default(),
            playback: PlaybackConfig::default(),
            retry: RetryConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "speakq_ap=debug,tower_http=debug".to_string(),
        }
    }
}

/// Which synthesis backend to call
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/audio/speech` endpoint (OpenAI, Kokoro-FastAPI, ...)
    OpenAi,
    /// Google Translate TTS endpoint
    Google,
}

/// Synthesis provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API root; `/audio/speech` is appended for OpenAI-compatible servers.
    /// None selects the provider's default endpoint.
    pub base_url: Option<String>,
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub response_format: String,
    /// Language code (Google provider)
    pub language: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            base_url: None,
            api_key: "not-needed".to_string(),
            model: "kokoro".to_string(),
            voice: "af_sky+af_bella".to_string(),
            response_format: "mp3".to_string(),
            language: "en".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Local Kokoro-FastAPI server
pub const DEFAULT_OPENAI_BASE_URL: &str = "http://localhost:8880/v1";

/// Public Google Translate host
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://translate.google.com";

impl ProviderConfig {
    /// Configured base URL or the default for [`ProviderConfig::kind`], without a trailing slash
    pub fn base_url(&self) -> &str {
        let url = match (&self.base_url, self.kind) {
            (Some(url), _) => url.as_str(),
            (None, ProviderKind::OpenAi) => DEFAULT_OPENAI_BASE_URL,
            (None, ProviderKind::Google) => DEFAULT_GOOGLE_BASE_URL,
        };
        url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Audio output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Longest text (in characters) sent to the provider in one request
    pub max_chunk_chars: usize,
    /// Output device name (None = system default)
    pub device: Option<String>,
    /// Linear gain applied to samples (0.0-2.0)
    pub volume: f32,
    /// How often the device's busy flag is polled
    pub poll_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1000,
            device: None,
            volume: 1.0,
            poll_interval_ms: 100,
        }
    }
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Retry policy for transient synthesis failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            delay_secs: 30,
        }
    }
}

/// Playback worker loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Pause between queue polls
    pub idle_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: 500,
        }
    }
}

impl WorkerConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

impl TomlConfig {
    /// Resolve and load the config file, falling back to defaults
    ///
    /// `cli_path` comes from `--config`; otherwise [`CONFIG_ENV_VAR`] and the
    /// platform locations are consulted.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path =
            speakq_common::config::resolve_config_file(cli_path, CONFIG_ENV_VAR, APP_NAME);
        let config: Self = speakq_common::config::load_toml_or_default(path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }
        if self.playback.max_chunk_chars == 0 {
            return Err(Error::Config(
                "playback.max_chunk_chars must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.playback.volume) {
            return Err(Error::Config(format!(
                "playback.volume must be within 0.0-2.0, got {}",
                self.playback.volume
            )));
        }
        if self.playback.poll_interval_ms == 0 {
            return Err(Error::Config(
                "playback.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 7070);
        assert_eq!(config.retry.max_attempts, 120);
        assert_eq!(config.retry.delay_secs, 30);
        assert_eq!(config.worker.idle_interval(), Duration::from_millis(500));
        assert_eq!(config.playback.max_chunk_chars, 1000);
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.base_url(), DEFAULT_OPENAI_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 8000

            [provider]
            kind = "google"
            language = "fr"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.provider.kind, ProviderKind::Google);
        assert_eq!(config.provider.language, "fr");
        assert_eq!(config.provider.model, "kokoro");
        assert_eq!(config.provider.base_url(), DEFAULT_GOOGLE_BASE_URL);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_secs, 30);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = TomlConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_volume_out_of_range() {
        let mut config = TomlConfig::default();
        config.playback.volume = 3.5;
        assert!(config.validate().is_err());
    }
}
