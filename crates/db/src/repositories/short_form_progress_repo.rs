//! Repository for the `short_form_progress` table.

use sqlx::types::Json;
use sqlx::PgPool;
use studytrack_core::progress::ShortFormProgressUpsert;
use studytrack_core::types::DbId;

use crate::models::progress::ShortFormProgressRow;

/// Column list for `short_form_progress` queries.
const COLUMNS: &str = "id, user_id, short_form_id, chapter_id, watched_clip_indexes, \
    attempted_mcq_ids, mcq_attempts, total_mcqs_attempted, correct_count, incorrect_count, \
    is_watched, percentage, updated_at";

pub struct ShortFormProgressRepo;

impl ShortFormProgressRepo {
    /// A user's records, optionally narrowed by chapter and/or short-form.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        chapter_id: Option<DbId>,
        short_form_id: Option<DbId>,
    ) -> Result<Vec<ShortFormProgressRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM short_form_progress
             WHERE user_id = $1
               AND ($2::BIGINT IS NULL OR chapter_id = $2)
               AND ($3::BIGINT IS NULL OR short_form_id = $3)
             ORDER BY id"
        );
        sqlx::query_as::<_, ShortFormProgressRow>(&query)
            .bind(user_id)
            .bind(chapter_id)
            .bind(short_form_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or fully replace the record for `(user_id, short_form_id, chapter_id)`.
    pub async fn upsert(
        pool: &PgPool,
        input: &ShortFormProgressUpsert,
    ) -> Result<ShortFormProgressRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO short_form_progress \
                (user_id, short_form_id, chapter_id, watched_clip_indexes, attempted_mcq_ids, \
                 mcq_attempts, total_mcqs_attempted, correct_count, incorrect_count, \
                 is_watched, percentage) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT ON CONSTRAINT uq_short_form_progress_key DO UPDATE \
             SET watched_clip_indexes = EXCLUDED.watched_clip_indexes, \
                 attempted_mcq_ids = EXCLUDED.attempted_mcq_ids, \
                 mcq_attempts = EXCLUDED.mcq_attempts, \
                 total_mcqs_attempted = EXCLUDED.total_mcqs_attempted, \
                 correct_count = EXCLUDED.correct_count, \
                 incorrect_count = EXCLUDED.incorrect_count, \
                 is_watched = EXCLUDED.is_watched, \
                 percentage = EXCLUDED.percentage, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShortFormProgressRow>(&query)
            .bind(input.user_id)
            .bind(input.short_form_id)
            .bind(input.chapter_id)
            .bind(&input.watched_clip_indexes)
            .bind(&input.attempted_mcq_ids)
            .bind(Json(&input.mcq_attempts))
            .bind(input.total_mcqs_attempted)
            .bind(input.correct_count)
            .bind(input.incorrect_count)
            .bind(input.is_watched)
            .bind(input.percentage)
            .fetch_one(pool)
            .await
    }
}
