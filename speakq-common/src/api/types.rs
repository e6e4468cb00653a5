//! Shared API request/response types
//!
//! Wire shapes for the SpeakQ HTTP surface. Field names are part of the
//! public contract and must not change.

use serde::{Deserialize, Serialize};

// ========================================
// Queue Types
// ========================================

/// Body of `POST /queue`
///
/// `text` is optional at the serde level so a missing field reaches the
/// handler's validation instead of failing inside the extractor.
///
/// # Examples
///
/// ```
/// use speakq_common::api::types::QueueRequest;
///
/// let req: QueueRequest = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
/// assert_eq!(req.text.as_deref(), Some("Hello"));
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueueRequest {
    /// Text to speak
    #[serde(default)]
    pub text: Option<String>,
}

impl QueueRequest {
    /// The submitted text, if present and non-empty
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Successful enqueue acknowledgment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueResponse {
    /// Human-readable message including the 1-indexed queue position
    pub message: String,
}

impl QueueResponse {
    /// Build the acknowledgment for an item that landed at `position`
    pub fn for_position(position: usize) -> Self {
        Self {
            message: format!("Added to queue position: {}.", position),
        }
    }
}

/// Snapshot returned by `GET /queue`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueStatusResponse {
    /// Items waiting to be spoken (excludes the one being processed)
    pub pending: usize,
    /// Playback worker state (idle, dequeuing, processing, sleeping)
    pub worker_state: String,
}

// ========================================
// Health / Error Types
// ========================================

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// Error body used for every non-2xx response
///
/// # Examples
///
/// ```
/// use speakq_common::api::types::ErrorResponse;
///
/// let body = serde_json::to_string(&ErrorResponse::new("json is required.")).unwrap();
/// assert_eq!(body, r#"{"detail":"json is required."}"#);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
