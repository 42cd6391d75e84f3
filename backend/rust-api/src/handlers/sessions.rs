use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::AppJson,
    models::{CreateSessionRequest, SubmitAnswerRequest, SubmitAnswerResponse},
    services::AppState,
};

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    tracing::info!(
        "Creating session for user_id={}, quiz_id={}",
        req.user_id,
        req.quiz_id
    );

    let session = state.game.start_session(&req.quiz_id, &req.user_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.game.get_session(&session_id).await?;
    Ok(Json(session))
}

/// POST /api/v1/sessions/{id}/answers
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        "Submitting answer for session: {} question: {}",
        session_id,
        req.question_id
    );

    let (answer, session) = state.game.submit_answer(&session_id, &req).await?;
    Ok(Json(SubmitAnswerResponse { answer, session }))
}

/// POST /api/v1/sessions/{id}/complete
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Completing session: {}", session_id);

    let session = state.game.complete_session(&session_id).await?;
    Ok(Json(session))
}

/// POST /api/v1/sessions/{id}/abandon
pub async fn abandon_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Abandoning session: {}", session_id);

    let session = state.game.abandon_session(&session_id).await?;
    Ok(Json(session))
}
