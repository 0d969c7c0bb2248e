//! Repository for the `video_progress` table.

use sqlx::PgPool;
use studytrack_core::progress::VideoProgressUpsert;
use studytrack_core::types::DbId;

use crate::models::progress::VideoProgressRow;

/// Column list for `video_progress` queries.
const COLUMNS: &str = "id, user_id, video_id, chapter_id, resume_time, total_time, \
    progress_percent, is_watched, mcqs_attempted, correct_mcqs, updated_at";

pub struct VideoProgressRepo;

impl VideoProgressRepo {
    /// A user's records, optionally narrowed by chapter and/or video.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        chapter_id: Option<DbId>,
        video_id: Option<DbId>,
    ) -> Result<Vec<VideoProgressRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM video_progress
             WHERE user_id = $1
               AND ($2::BIGINT IS NULL OR chapter_id = $2)
               AND ($3::BIGINT IS NULL OR video_id = $3)
             ORDER BY id"
        );
        sqlx::query_as::<_, VideoProgressRow>(&query)
            .bind(user_id)
            .bind(chapter_id)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or fully replace the record for `(user_id, video_id, chapter_id)`.
    pub async fn upsert(
        pool: &PgPool,
        input: &VideoProgressUpsert,
    ) -> Result<VideoProgressRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_progress \
                (user_id, video_id, chapter_id, resume_time, total_time, \
                 progress_percent, is_watched, mcqs_attempted, correct_mcqs) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT ON CONSTRAINT uq_video_progress_key DO UPDATE \
             SET resume_time = EXCLUDED.resume_time, \
                 total_time = EXCLUDED.total_time, \
                 progress_percent = EXCLUDED.progress_percent, \
                 is_watched = EXCLUDED.is_watched, \
                 mcqs_attempted = EXCLUDED.mcqs_attempted, \
                 correct_mcqs = EXCLUDED.correct_mcqs, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoProgressRow>(&query)
            .bind(input.user_id)
            .bind(input.video_id)
            .bind(input.chapter_id)
            .bind(input.resume_time)
            .bind(input.total_time)
            .bind(input.progress_percent)
            .bind(input.is_watched)
            .bind(input.mcqs_attempted)
            .bind(input.correct_mcqs)
            .fetch_one(pool)
            .await
    }
}
