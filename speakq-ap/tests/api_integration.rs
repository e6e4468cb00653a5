//! Integration tests for the SpeakQ HTTP API
//!
//! Drives the router in-process with `oneshot`; no worker is running, so
//! accepted items stay in the queue for inspection.

use axum::body::Body;
use axum::http::StatusCode;
use http::{Method, Request};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use speakq_ap::api::{create_router, AppContext};
use speakq_ap::playback::WorkerState;
use speakq_ap::state::SharedState;
use speakq_common::events::SpeechEvent;
use std::sync::Arc;
use tower::ServiceExt;

fn setup() -> (axum::Router, Arc<SharedState>) {
    let state = Arc::new(SharedState::new());
    let router = create_router(AppContext {
        state: Arc::clone(&state),
    });
    (router, state)
}

async fn send(app: &axum::Router, method: Method, path: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn post_queue(app: &axum::Router, body: &str) -> (StatusCode, Value) {
    send(app, Method::POST, "/queue", Some(body)).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "speakq-ap");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_enqueue_reports_positions() {
    let (app, state) = setup();

    let (status, body) = post_queue(&app, r#"{"text": "Hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Added to queue position: 1."}));

    let (status, body) = post_queue(&app, r#"{"text": "World"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Added to queue position: 2."}));

    assert_eq!(state.queue.try_dequeue().as_deref(), Some("Hello"));
    assert_eq!(state.queue.try_dequeue().as_deref(), Some("World"));
}

#[tokio::test]
async fn test_invalid_requests_rejected_with_400() {
    let (app, state) = setup();

    for body in [
        r#"{}"#,
        r#"{"text": ""}"#,
        r#"{"text": null}"#,
        r#"{"text": 42}"#,
        r#"{"message": "Hello"}"#,
        r#"not json"#,
        r#""just a string""#,
        "",
    ] {
        let (status, json) = post_queue(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", body);
        assert_eq!(json, json!({"detail": "json is required."}), "body: {:?}", body);
    }

    assert!(state.queue.is_empty());
}

#[tokio::test]
async fn test_whitespace_text_is_accepted() {
    // Only empty text is invalid; the worker skips unspeakable items later
    let (app, state) = setup();

    let (status, _) = post_queue(&app, r#"{"text": "   "}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.queue.len(), 1);
}

#[tokio::test]
async fn test_queue_status() {
    let (app, state) = setup();
    post_queue(&app, r#"{"text": "one"}"#).await;
    post_queue(&app, r#"{"text": "two"}"#).await;

    let (status, body) = send(&app, Method::GET, "/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"pending": 2, "worker_state": "idle"}));

    state.set_worker_state(WorkerState::Processing);
    state.queue.try_dequeue();

    let (_, body) = send(&app, Method::GET, "/queue", None).await;
    assert_eq!(body, json!({"pending": 1, "worker_state": "processing"}));
}

#[tokio::test]
async fn test_enqueue_publishes_event() {
    let (app, state) = setup();
    let mut events = state.events.subscribe();

    post_queue(&app, r#"{"text": "Hello"}"#).await;

    match events.try_recv().unwrap() {
        SpeechEvent::Enqueued { position, .. } => assert_eq!(position, 1),
        other => panic!("expected Enqueued, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_submissions_get_distinct_positions() {
    let (app, state) = setup();

    let mut handles = Vec::new();
    for i in 0..20 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"text": "item {}"}}"#, i);
            post_queue(&app, &body).await
        }));
    }

    let mut positions = Vec::new();
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let message = body["message"].as_str().unwrap().to_string();
        let position: usize = message
            .trim_start_matches("Added to queue position: ")
            .trim_end_matches('.')
            .parse()
            .unwrap();
        positions.push(position);
    }

    positions.sort_unstable();
    assert_eq!(positions, (1..=20).collect::<Vec<_>>());
    assert_eq!(state.queue.len(), 20);
}
