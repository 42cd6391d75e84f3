mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use serial_test::serial;
use tower::ServiceExt;

#[tokio::test]
#[serial]
async fn test_metrics_requires_basic_auth() {
    std::env::remove_var("METRICS_AUTH");
    let app = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_metrics_exposes_request_and_health_counters() {
    std::env::set_var("METRICS_AUTH", "ops:secret");
    let app = common::create_test_app();

    // Generate some traffic first
    common::send(&app, "GET", "/health", None).await;

    let credentials = general_purpose::STANDARD.encode("ops:secret");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header("authorization", format!("Basic {}", credentials))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("health_checks_total"));

    std::env::remove_var("METRICS_AUTH");
}

#[tokio::test]
#[serial]
async fn test_metrics_rejects_wrong_credentials() {
    std::env::set_var("METRICS_AUTH", "ops:secret");
    let app = common::create_test_app();

    let credentials = general_purpose::STANDARD.encode("ops:wrong");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header("authorization", format!("Basic {}", credentials))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    std::env::remove_var("METRICS_AUTH");
}

#[tokio::test]
#[serial]
async fn test_metrics_default_credentials_outside_production() {
    std::env::remove_var("METRICS_AUTH");
    let app = common::create_test_app();

    let credentials = general_purpose::STANDARD.encode("admin:changeme");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header("authorization", format!("Basic {}", credentials))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
