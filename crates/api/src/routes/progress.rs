use axum::routing::get;
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Cross-kind and overall progress routes mounted at `/progress`.
///
/// ```text
/// GET /users/{user_id}/unified                          -> unified_report
/// GET /classes/{class_id}/users/{user_id}/subjects      -> class_subject_progress
/// GET /subjects/{subject_id}/users/{user_id}            -> subject_progress
/// GET /subjects/{subject_id}/users/{user_id}/mock-tests -> subject_mock_test_progress
/// GET /chapters/{chapter_id}/users/{user_id}/short-forms -> chapter_short_form_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/unified", get(progress::unified_report))
        .route(
            "/classes/{class_id}/users/{user_id}/subjects",
            get(progress::class_subject_progress),
        )
        .route(
            "/subjects/{subject_id}/users/{user_id}",
            get(progress::subject_progress),
        )
        .route(
            "/subjects/{subject_id}/users/{user_id}/mock-tests",
            get(progress::subject_mock_test_progress),
        )
        .route(
            "/chapters/{chapter_id}/users/{user_id}/short-forms",
            get(progress::chapter_short_form_progress),
        )
}
