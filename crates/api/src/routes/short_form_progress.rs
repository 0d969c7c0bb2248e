use axum::routing::{get, put};
use axum::Router;

use crate::handlers::short_form_progress;
use crate::state::AppState;

/// Routes mounted at `/short-form-progress`.
///
/// ```text
/// PUT  /                                              -> save_short_form_progress
/// GET  /users/{user_id}/short-forms/{short_form_id}   -> get_short_form_progress
/// GET  /users/{user_id}/report                        -> short_form_report
/// GET  /attempt-status                                -> attempt_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(short_form_progress::save_short_form_progress))
        .route(
            "/users/{user_id}/short-forms/{short_form_id}",
            get(short_form_progress::get_short_form_progress),
        )
        .route(
            "/users/{user_id}/report",
            get(short_form_progress::short_form_report),
        )
        .route("/attempt-status", get(short_form_progress::attempt_status))
}
