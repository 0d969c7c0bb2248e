//! Handlers for short-form sequence progress.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use studytrack_core::progress::SaveShortFormProgress;
use studytrack_core::types::DbId;

use crate::error::AppResult;
use crate::query::UserChapterParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/short-form-progress
///
/// Replaces the stored watched clips, attempted MCQs and answers for
/// `(user_id, short_form_id, chapter_id)`.
pub async fn save_short_form_progress(
    State(state): State<AppState>,
    body: Result<Json<SaveShortFormProgress>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    let saved = state.service.save_short_form_progress(input).await?;
    Ok(Json(DataResponse { data: saved }))
}

/// GET /api/v1/short-form-progress/users/{user_id}/short-forms/{short_form_id}
pub async fn get_short_form_progress(
    State(state): State<AppState>,
    Path((user_id, short_form_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .service
        .short_form_progress(user_id, short_form_id)
        .await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/short-form-progress/users/{user_id}/report
pub async fn short_form_report(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = state.service.short_form_report(user_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/short-form-progress/attempt-status?user_id=&chapter_id=
pub async fn attempt_status(
    State(state): State<AppState>,
    Query(params): Query<UserChapterParams>,
) -> AppResult<impl IntoResponse> {
    let statuses = state
        .service
        .short_form_attempt_status(params.user_id, params.chapter_id)
        .await?;
    Ok(Json(DataResponse { data: statuses }))
}
