mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use quizztok_api::models::health::DependencyStatus;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_reports_healthy_when_dependencies_connected() {
    let app = common::create_test_app();

    let (status, json) = common::send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "test");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["services"]["database"], "connected");
    assert_eq!(json["services"]["redis"], "connected");
    assert!(json["uptime"].is_u64());
    assert!(json["responseTime"].is_u64());
    assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_health_degraded_still_returns_200() {
    let app = common::create_test_app_with_health(DependencyStatus::Connected, DependencyStatus::Error);

    let (status, json) = common::send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["services"]["database"], "connected");
    assert_eq!(json["services"]["redis"], "error");
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let app = common::create_test_app_with_health(DependencyStatus::Error, DependencyStatus::Connected);

    let (status, json) = common::send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["services"]["database"], "error");
}

#[tokio::test]
async fn test_trace_id_is_echoed_or_generated() {
    let app = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-trace-id"], "trace-abc");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers()["x-trace-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_status_page_served_with_csp() {
    let app = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-security-policy")
        .is_some());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("QuizzTok Live"));
    assert!(html.contains("/health"));
}
