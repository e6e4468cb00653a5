//! Common error types for SpeakQ

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for SpeakQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SpeakQ services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML file could not be parsed
    #[error("Invalid TOML in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
