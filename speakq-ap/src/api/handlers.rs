//! HTTP request handlers
//!
//! Playback outcomes never reach these handlers: a submitter only learns the
//! queue position its text was accepted at.

use crate::api::server::AppContext;
use crate::error::Error;
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use speakq_common::api::types::{
    ErrorResponse, HealthResponse, QueueRequest, QueueResponse, QueueStatusResponse,
};
use speakq_common::events::SpeechEvent;
use tracing::{debug, error, info};

/// Returned for a missing, empty or unparseable body
pub const MISSING_TEXT_DETAIL: &str = "json is required.";

/// Returned when the item could not be queued
pub const ENQUEUE_FAILED_DETAIL: &str = "An error occurred during audio generation.";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn bad_request() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(MISSING_TEXT_DETAIL)),
    )
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "speakq-ap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /queue
///
/// The body is parsed by hand so malformed JSON gets the same 400 body as a
/// missing `text` field, rather than axum's extractor rejection.
pub async fn enqueue_text(State(ctx): State<AppContext>, body: Bytes) -> ApiResult<QueueResponse> {
    let request: QueueRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!("Rejecting unparseable queue request: {}", e);
        bad_request()
    })?;

    let text = request.non_empty_text().ok_or_else(bad_request)?;

    match ctx.state.queue.enqueue(text) {
        Ok(position) => {
            info!("Added to queue position: {}", position);
            ctx.state.events.emit_lossy(SpeechEvent::Enqueued {
                position,
                timestamp: chrono::Utc::now(),
            });
            Ok(Json(QueueResponse::for_position(position)))
        }
        Err(Error::BadRequest(_)) => Err(bad_request()),
        Err(e) => {
            error!("Failed to enqueue text: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(ENQUEUE_FAILED_DETAIL)),
            ))
        }
    }
}

/// GET /queue
pub async fn queue_status(State(ctx): State<AppContext>) -> Json<QueueStatusResponse> {
    Json(QueueStatusResponse {
        pending: ctx.state.queue.len(),
        worker_state: ctx.state.worker_state().as_str().to_string(),
    })
}
