//! HTTP API tests.
//!
//! Drive the router in-process and check the session it reports and what it
//! leaves in storage.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mantra_counter::{
    create_router,
    services::NullPlayer,
    state::{AppState, SessionController},
    storage::{KeyValueStore, MemoryStore, COUNT_KEY, TARGET_KEY},
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(store: &MemoryStore, presets_only: bool) -> Router {
    let session = SessionController::load(Arc::new(store.clone())).presets_only(presets_only);
    let state = AppState::new(session, Arc::new(NullPlayer), 20108, "127.0.0.1".to_string());
    create_router(Arc::new(state))
}

fn app(store: &MemoryStore) -> Router {
    app_with(store, false)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "POST", uri, None).await
}

#[tokio::test]
async fn fresh_storage_reports_target_selection() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, body) = send(&app, "GET", "/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["mode"], "selecting_target");
    assert_eq!(body["session"]["count"], 0);
    assert!(body["session"]["target"].is_null());
    assert!(body["session"]["progress_percentage"].is_null());
    assert_eq!(body["session"]["playing"], false);
    assert_eq!(body["presets"].as_array().map(Vec::len), Some(3));
    assert!(body["change_target_prompt"].as_str().is_some());
}

#[tokio::test]
async fn targets_lists_presets() {
    let app = app(&MemoryStore::new());

    let (status, body) = send(&app, "GET", "/targets", None).await;

    assert_eq!(status, StatusCode::OK);
    let values: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|preset| preset["value"].as_u64().unwrap())
        .collect();
    assert_eq!(values, vec![7, 49, 108]);
}

#[tokio::test]
async fn counting_to_half_the_target() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, body) = send(&app, "POST", "/target", Some(json!({ "value": 108 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["mode"], "counting");
    assert_eq!(body["session"]["target"], 108);
    assert_eq!(body["session"]["progress_percentage"].as_f64(), Some(0.0));

    let mut last = Value::Null;
    for _ in 0..54 {
        let (status, body) = post(&app, "/increment").await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }

    assert_eq!(last["session"]["count"], 54);
    assert_eq!(last["session"]["progress_percentage"].as_f64(), Some(50.0));
    assert_eq!(store.get(COUNT_KEY).unwrap().as_deref(), Some("54"));
    assert_eq!(store.get(TARGET_KEY).unwrap().as_deref(), Some("108"));
}

#[tokio::test]
async fn cancelled_reset_keeps_count() {
    let store = MemoryStore::with_entries([(COUNT_KEY, "54"), (TARGET_KEY, "108")]);
    let app = app(&store);

    let (_, body) = post(&app, "/reset/start").await;
    assert_eq!(body["session"]["confirming_reset"], true);

    let (status, body) = post(&app, "/reset/cancel").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["confirming_reset"], false);
    assert_eq!(body["session"]["count"], 54);
}

#[tokio::test]
async fn confirmed_reset_zeroes_count() {
    let store = MemoryStore::with_entries([(COUNT_KEY, "30"), (TARGET_KEY, "49")]);
    let app = app(&store);

    post(&app, "/reset/start").await;
    let (status, body) = post(&app, "/reset/confirm").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["count"], 0);
    assert_eq!(body["session"]["confirming_reset"], false);
    assert_eq!(store.get(COUNT_KEY).unwrap().as_deref(), Some("0"));
}

#[tokio::test]
async fn increment_during_reset_confirmation_cancels_it() {
    let store = MemoryStore::with_entries([(COUNT_KEY, "5"), (TARGET_KEY, "7")]);
    let app = app(&store);

    post(&app, "/reset/start").await;
    let (_, body) = post(&app, "/increment").await;

    assert_eq!(body["session"]["confirming_reset"], false);
    assert_eq!(body["session"]["count"], 6);
}

#[tokio::test]
async fn changing_target_after_completion_keeps_count() {
    let store = MemoryStore::with_entries([(COUNT_KEY, "108"), (TARGET_KEY, "108")]);
    let app = app(&store);

    let (status, body) =
        send(&app, "POST", "/target/change", Some(json!({ "confirm": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["target"], 108);

    let (_, body) = send(&app, "POST", "/target/change", Some(json!({ "confirm": true }))).await;
    assert_eq!(body["session"]["mode"], "selecting_target");
    assert_eq!(body["session"]["count"], 108);

    let (_, body) = send(&app, "POST", "/target", Some(json!({ "value": 49 }))).await;
    assert_eq!(body["session"]["count"], 108);
    assert_eq!(body["session"]["target"], 49);
    assert_eq!(body["session"]["progress_percentage"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn wrong_mode_and_invalid_targets_are_rejected() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, body) = post(&app, "/increment").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");

    let (status, _) = send(&app, "POST", "/target", Some(json!({ "value": 0 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(store.get(TARGET_KEY).unwrap(), None);

    send(&app, "POST", "/target", Some(json!({ "value": 7 }))).await;
    let (status, _) = send(&app, "POST", "/target", Some(json!({ "value": 49 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(store.get(TARGET_KEY).unwrap().as_deref(), Some("7"));
}

#[tokio::test]
async fn presets_only_rejects_custom_targets() {
    let app = app_with(&MemoryStore::new(), true);

    let (status, _) = send(&app, "POST", "/target", Some(json!({ "value": 50 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "POST", "/target", Some(json!({ "value": 49 }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn playback_toggle_is_optimistic_without_audio() {
    let store = MemoryStore::with_entries([(TARGET_KEY, "7")]);
    let app = app(&store);

    let (status, body) = post(&app, "/playback/toggle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["playing"], true);
    assert_eq!(body["session"]["playback_source"], "intent");

    let (_, body) = post(&app, "/playback/toggle").await;
    assert_eq!(body["session"]["playing"], false);
}

#[tokio::test]
async fn session_survives_restart() {
    let store = MemoryStore::new();
    {
        let app = app(&store);
        send(&app, "POST", "/target", Some(json!({ "value": 49 }))).await;
        for _ in 0..3 {
            post(&app, "/increment").await;
        }
        post(&app, "/playback/toggle").await;
    }

    let app = app(&store);
    let (_, body) = send(&app, "GET", "/status", None).await;

    assert_eq!(body["session"]["target"], 49);
    assert_eq!(body["session"]["count"], 3);
    assert_eq!(body["session"]["playing"], false);
}

#[tokio::test]
async fn status_tracks_last_action() {
    let store = MemoryStore::with_entries([(TARGET_KEY, "7")]);
    let app = app(&store);

    post(&app, "/increment").await;
    let (_, body) = send(&app, "GET", "/status", None).await;

    assert_eq!(body["last_action"], "increment");
    assert!(body["last_action_time"].is_string());
    assert_eq!(body["port"], 20108);
}

#[tokio::test]
async fn health_check() {
    let app = app(&MemoryStore::new());

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn events_stream_starts_with_current_session() {
    use futures::StreamExt;

    let store = MemoryStore::with_entries([(COUNT_KEY, "12"), (TARGET_KEY, "49")]);
    let app = app(&store);

    let request = Request::builder().uri("/events").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    let text = String::from_utf8_lossy(&first);

    assert!(text.contains("event: session"));
    assert!(text.contains("\"count\":12"));
}
