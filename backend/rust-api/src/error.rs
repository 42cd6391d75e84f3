use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::game_service::GameError;
use crate::services::video_source::VideoSourceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Video(#[from] VideoSourceError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            ApiError::InvalidBody(rejection) => (rejection.status(), "invalid_body"),
            ApiError::Game(err) => match err {
                GameError::SessionNotFound(_) | GameError::QuizNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found")
                }
                GameError::QuizInactive(_) => (StatusCode::CONFLICT, "quiz_inactive"),
                GameError::SessionClosed { .. } => (StatusCode::CONFLICT, "session_closed"),
                GameError::QuizExhausted { .. } => (StatusCode::CONFLICT, "quiz_exhausted"),
                GameError::OutOfOrderAnswer { .. } => (StatusCode::CONFLICT, "out_of_order_answer"),
                GameError::UnansweredQuestions { .. } => {
                    (StatusCode::CONFLICT, "unanswered_questions")
                }
                GameError::Store(_) | GameError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            ApiError::Video(err) => match err {
                VideoSourceError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, "validation_failed")
                }
                _ => (StatusCode::BAD_GATEWAY, "video_source_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
