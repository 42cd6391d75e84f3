#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use tower::ServiceExt;

use quizztok_api::{
    config::Config,
    create_router,
    models::{health::DependencyStatus, video::VideoMetadata, Difficulty, Question, Quiz},
    services::{
        game_service::GameService,
        health_service::{HealthProbe, HealthReporter},
        quiz_repository::InMemoryQuizRepository,
        session_store::InMemorySessionStore,
        video_source::InMemoryVideoSource,
        AppState,
    },
};

pub const TEST_QUIZ_ID: &str = "test-quiz";
pub const INACTIVE_QUIZ_ID: &str = "inactive-quiz";
pub const TEST_VIDEO_ID: &str = "7301234567890";

pub struct StaticProbe {
    name: &'static str,
    status: DependencyStatus,
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn check(&self) -> DependencyStatus {
        self.status
    }
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        mongo_uri: "mongodb://localhost:27017".to_string(),
        mongo_database: "quizztok_test".to_string(),
        redis_uri: "redis://localhost:6379/0".to_string(),
        session_ttl_seconds: 3600,
        tiktok_api_url: "http://localhost:8090".to_string(),
        tiktok_api_key: String::new(),
    }
}

fn question(id: &str, text: &str, options: [&str; 4], correct: usize) -> Question {
    Question::new(
        id,
        text,
        options.iter().map(|o| o.to_string()).collect(),
        correct,
        15000,
        100,
    )
    .expect("test question must be valid")
}

pub fn test_quiz(id: &str, active: bool) -> Quiz {
    let now = Utc::now();
    Quiz {
        id: id.to_string(),
        title: "Quiz de Demonstração".to_string(),
        description: "Perguntas de conhecimentos gerais".to_string(),
        questions: vec![
            question(
                "q-capital",
                "Qual é a capital do Brasil?",
                ["São Paulo", "Rio de Janeiro", "Brasília", "Salvador"],
                2,
            ),
            question(
                "q-agua",
                "Qual é a fórmula química da água?",
                ["H2O", "CO2", "NaCl", "O2"],
                0,
            ),
        ],
        created_by: "test_user_123".to_string(),
        difficulty: Difficulty::Easy,
        categories: vec!["Geografia".to_string(), "Química".to_string()],
        is_active: active,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_video() -> VideoMetadata {
    VideoMetadata {
        id: TEST_VIDEO_ID.to_string(),
        url: format!("https://www.tiktok.com/@testuser_tiktok/video/{}", TEST_VIDEO_ID),
        author: "testuser_tiktok".to_string(),
        description: "Quiz night #quiz #trivia".to_string(),
        hashtags: vec!["quiz".to_string(), "trivia".to_string()],
        views: 1200,
        likes: 300,
        shares: 12,
        created_at: Utc::now(),
    }
}

pub fn create_test_app_with_health(database: DependencyStatus, redis: DependencyStatus) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let game = GameService::new(
        Arc::new(InMemoryQuizRepository::new([
            test_quiz(TEST_QUIZ_ID, true),
            test_quiz(INACTIVE_QUIZ_ID, false),
        ])),
        Arc::new(InMemorySessionStore::new()),
    );
    let videos = Arc::new(InMemoryVideoSource::new([test_video()]));
    let health = HealthReporter::new(
        Arc::new(StaticProbe {
            name: "database",
            status: database,
        }),
        Arc::new(StaticProbe {
            name: "redis",
            status: redis,
        }),
        "test",
    );

    let state = Arc::new(AppState::from_parts(test_config(), game, videos, health));
    create_router(state)
}

pub fn create_test_app() -> Router {
    create_test_app_with_health(DependencyStatus::Connected, DependencyStatus::Connected)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, json)
}
