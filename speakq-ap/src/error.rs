//! Error types for speakq-ap
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! [`Error::is_transient`] is the single classifier the retry policy consults.

use thiserror::Error;

/// Main error type for speakq-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Synthesis provider call failed
    ///
    /// `transient` marks network/service-availability failures that may
    /// succeed on a later attempt.
    #[error("Synthesis error: {message}")]
    Synthesis { message: String, transient: bool },

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Playback errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Queue errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Every attempt failed with a transient error
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    /// Unexpected failure inside the playback worker; the process must stop
    #[error("Playback worker failed: {0}")]
    WorkerFatal(String),
}

impl Error {
    /// Transient synthesis failure (retryable)
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
            transient: true,
        }
    }

    /// Permanent synthesis failure (not retryable)
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
            transient: false,
        }
    }

    /// Whether a retry may succeed
    ///
    /// Only synthesis provider failures flagged transient qualify. Decode,
    /// output device and playback failures are always permanent.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Synthesis { transient: true, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let transient = e.is_connect() || e.is_timeout() || e.is_request() || e.is_body();
        let transient = transient
            || e.status()
                .map(|status| is_transient_status(status.as_u16()))
                .unwrap_or(false);

        Self::Synthesis {
            message: e.to_string(),
            transient,
        }
    }
}

impl From<speakq_common::Error> for Error {
    fn from(e: speakq_common::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// HTTP statuses worth retrying: request timeout, rate limit and server errors
pub fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Convenience Result type using speakq-ap Error
pub type Result<T> = std::result::Result<T, Error>;
