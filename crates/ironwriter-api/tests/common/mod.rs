//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ironwriter_core::clock::Clock;
use ironwriter_core::repository::SessionStore;
use ironwriter_core::rng::DeterministicRng;
use ironwriter_oracle::OracleBook;
use ironwriter_test_support::{FixedClock, InMemorySessionStore, SequenceRng};
use tower::ServiceExt;

use ironwriter_api::state::AppState;

/// Build the full app router over an in-memory store with no dice queued.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(InMemorySessionStore::new()), SequenceRng::new(vec![]))
}

/// Build the full app router with a custom store and `SequenceRng` for tests
/// that need persistence or deterministic dice.
pub fn build_test_app_with(store: Arc<dyn SessionStore>, rng: SequenceRng) -> Router {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock::default());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let oracles = Arc::new(OracleBook::builtin().unwrap());
    let app_state = AppState::load(clock, rng, store, oracles).unwrap();
    ironwriter_api::build_router(app_state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("POST", uri, body)).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("PUT", uri, body)).await
}

/// Send a bodiless request and return the response.
pub async fn request(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request(app, "GET", uri).await
}
