pub mod health;
pub mod progress;
pub mod short_form_progress;
pub mod video_progress;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /video-progress                                          save (PUT)
/// /video-progress/users/{user_id}/videos/{video_id}        records for one video
/// /video-progress/users/{user_id}/report                   class-wide video report
///
/// /short-form-progress                                     save (PUT)
/// /short-form-progress/users/{user_id}/short-forms/{id}    one record
/// /short-form-progress/users/{user_id}/report              class-wide short-form report
/// /short-form-progress/attempt-status                      ?user_id=&chapter_id=
///
/// /mock-tests/attempts                                     record (POST)
/// /mock-tests/attempts/users/{u}/subjects/{s}/tests/{t}    attempt detail
/// /mock-tests/users/{user_id}/report                       class-wide mock-test report
/// /mock-tests/attempt-status                               ?user_id=&subject_id=
///
/// /progress/users/{user_id}/unified                        unified report
/// /progress/classes/{class_id}/users/{user_id}/subjects    per-subject progress list
/// /progress/subjects/{subject_id}/users/{user_id}          one subject
/// /progress/subjects/{subject_id}/users/{user_id}/mock-tests
/// /progress/chapters/{chapter_id}/users/{user_id}/short-forms
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/video-progress", video_progress::router())
        .nest("/short-form-progress", short_form_progress::router())
        .nest("/mock-tests", mock_test::router())
        .nest("/progress", progress::router())
}
