//! Handlers for long-form video progress.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use studytrack_core::progress::SaveVideoProgress;
use studytrack_core::types::DbId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/video-progress
///
/// Upsert the caller's position in one video. `is_watched` and
/// `progress_percent` are derived server-side.
pub async fn save_video_progress(
    State(state): State<AppState>,
    body: Result<Json<SaveVideoProgress>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    let saved = state.service.save_video_progress(input).await?;
    Ok(Json(DataResponse { data: saved }))
}

/// GET /api/v1/video-progress/users/{user_id}/videos/{video_id}
pub async fn get_video_progress(
    State(state): State<AppState>,
    Path((user_id, video_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let records = state.service.video_progress(user_id, video_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/video-progress/users/{user_id}/report
pub async fn video_report(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = state.service.video_report(user_id).await?;
    Ok(Json(DataResponse { data: report }))
}
