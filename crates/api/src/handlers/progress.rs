//! Cross-kind and overall progress handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use studytrack_core::types::DbId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/progress/users/{user_id}/unified
pub async fn unified_report(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = state.service.unified_report(user_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/progress/classes/{class_id}/users/{user_id}/subjects
pub async fn class_subject_progress(
    State(state): State<AppState>,
    Path((class_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let subjects = state
        .service
        .class_subject_progress(class_id, user_id)
        .await?;
    Ok(Json(DataResponse { data: subjects }))
}

/// GET /api/v1/progress/subjects/{subject_id}/users/{user_id}
pub async fn subject_progress(
    State(state): State<AppState>,
    Path((subject_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let progress = state
        .service
        .subject_overall_progress(subject_id, user_id)
        .await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/progress/subjects/{subject_id}/users/{user_id}/mock-tests
pub async fn subject_mock_test_progress(
    State(state): State<AppState>,
    Path((subject_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let progress = state
        .service
        .mock_test_overall_progress(subject_id, user_id)
        .await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/progress/chapters/{chapter_id}/users/{user_id}/short-forms
pub async fn chapter_short_form_progress(
    State(state): State<AppState>,
    Path((chapter_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let progress = state
        .service
        .short_form_chapter_progress(chapter_id, user_id)
        .await?;
    Ok(Json(DataResponse { data: progress }))
}
