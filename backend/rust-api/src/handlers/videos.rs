use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::ApiError, extractors::AppJson, models::video::QuizFromVideoRequest,
    services::AppState,
};

/// GET /api/v1/videos/{id}
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let video = state
        .videos
        .fetch_video(&video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Video {}", video_id)))?;

    Ok(Json(video))
}

/// POST /api/v1/videos/quiz
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<QuizFromVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    tracing::info!(
        "Generating quiz from video: {} ({} questions)",
        req.video_id,
        req.question_count
    );

    let quiz = state
        .videos
        .generate_quiz(&req)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz for video {}", req.video_id)))?;

    Ok(Json(quiz))
}
