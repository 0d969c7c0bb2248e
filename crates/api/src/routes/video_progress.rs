use axum::routing::{get, put};
use axum::Router;

use crate::handlers::video_progress;
use crate::state::AppState;

/// Routes mounted at `/video-progress`.
///
/// ```text
/// PUT  /                                    -> save_video_progress
/// GET  /users/{user_id}/videos/{video_id}   -> get_video_progress
/// GET  /users/{user_id}/report              -> video_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(video_progress::save_video_progress))
        .route(
            "/users/{user_id}/videos/{video_id}",
            get(video_progress::get_video_progress),
        )
        .route("/users/{user_id}/report", get(video_progress::video_report))
}
