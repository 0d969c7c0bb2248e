//! Repository for the `mock_test_attempts` table.

use sqlx::types::Json;
use sqlx::PgPool;
use studytrack_core::mock_test::MockTestAttemptUpsert;
use studytrack_core::types::DbId;

use crate::models::progress::MockTestAttemptRow;

/// Column list for `mock_test_attempts` queries.
const COLUMNS: &str = "id, user_id, subject_id, mock_test_id, mcq_attempts, \
    total_mcqs_attempted, correct_count, incorrect_count, is_attempted, created_at, updated_at";

pub struct MockTestAttemptRepo;

impl MockTestAttemptRepo {
    pub async fn find_by_key(
        pool: &PgPool,
        user_id: DbId,
        mock_test_id: DbId,
        subject_id: DbId,
    ) -> Result<Option<MockTestAttemptRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mock_test_attempts \
             WHERE user_id = $1 AND mock_test_id = $2 AND subject_id = $3"
        );
        sqlx::query_as::<_, MockTestAttemptRow>(&query)
            .bind(user_id)
            .bind(mock_test_id)
            .bind(subject_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        subject_id: Option<DbId>,
    ) -> Result<Vec<MockTestAttemptRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mock_test_attempts
             WHERE user_id = $1
               AND ($2::BIGINT IS NULL OR subject_id = $2)
             ORDER BY id"
        );
        sqlx::query_as::<_, MockTestAttemptRow>(&query)
            .bind(user_id)
            .bind(subject_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or replace the scored batch for `(user_id, mock_test_id, subject_id)`.
    ///
    /// `created_at` survives replacement; `updated_at` is bumped.
    /// Insert or replace the attempt for its key.
    ///
    /// Returns `None` without writing when the stored attempt already holds
    /// one of the submitted MCQs. The check runs against the locked
    /// conflicting row, so concurrent overlapping batches cannot both land.
    pub async fn upsert(
        pool: &PgPool,
        input: &MockTestAttemptUpsert,
    ) -> Result<Option<MockTestAttemptRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO mock_test_attempts \
                (user_id, subject_id, mock_test_id, mcq_attempts, \
                 total_mcqs_attempted, correct_count, incorrect_count, is_attempted) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE) \
             ON CONFLICT ON CONSTRAINT uq_mock_test_attempt_key DO UPDATE \
             SET mcq_attempts = EXCLUDED.mcq_attempts, \
                 total_mcqs_attempted = EXCLUDED.total_mcqs_attempted, \
                 correct_count = EXCLUDED.correct_count, \
                 incorrect_count = EXCLUDED.incorrect_count, \
                 is_attempted = TRUE, \
                 updated_at = NOW() \
             WHERE NOT EXISTS ( \
                 SELECT 1 \
                 FROM jsonb_array_elements(mock_test_attempts.mcq_attempts) AS stored \
                 JOIN jsonb_array_elements(EXCLUDED.mcq_attempts) AS submitted \
                   ON stored->>'mcq_id' = submitted->>'mcq_id' \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MockTestAttemptRow>(&query)
            .bind(input.user_id)
            .bind(input.subject_id)
            .bind(input.mock_test_id)
            .bind(Json(&input.mcq_attempts))
            .bind(input.total_mcqs_attempted)
            .bind(input.correct_count)
            .bind(input.incorrect_count)
            .fetch_optional(pool)
            .await
    }
}
