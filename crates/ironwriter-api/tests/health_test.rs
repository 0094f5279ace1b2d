//! Integration tests for the health endpoint.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "ironwriter-journal");
    assert!(json["version"].is_string());
    assert_eq!(json["moments"], 1);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oracle_tables_are_listed() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/oracles").await;

    assert_eq!(status, StatusCode::OK);
    let tables = json["tables"].as_array().unwrap();
    assert!(tables.iter().any(|t| t == "Likely"));
}
