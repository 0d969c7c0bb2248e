//! Read-only queries over the catalog mirror tables.

use sqlx::PgPool;
use studytrack_core::types::DbId;

use crate::models::catalog::{
    ChapterRow, LongFormVideoRow, MockTestMcqRow, MockTestRow, ShortFormContentRow, StudentRow,
    SubjectRow,
};

const SUBJECT_COLUMNS: &str = "id, class_id, name";
const CHAPTER_COLUMNS: &str = "id, subject_id, name";
const SHORT_FORM_COLUMNS: &str = "id, chapter_id, title, thumbnail_url, sequence";
const MOCK_TEST_COLUMNS: &str = "id, subject_id, title";

pub struct CatalogRepo;

impl CatalogRepo {
    pub async fn find_student(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StudentRow>, sqlx::Error> {
        sqlx::query_as::<_, StudentRow>("SELECT user_id, class_id FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_subject(pool: &PgPool, id: DbId) -> Result<Option<SubjectRow>, sqlx::Error> {
        let query = format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1");
        sqlx::query_as::<_, SubjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Subjects of a class in catalog order.
    pub async fn list_subjects_by_class(
        pool: &PgPool,
        class_id: DbId,
    ) -> Result<Vec<SubjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE class_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, SubjectRow>(&query)
            .bind(class_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_chapter(pool: &PgPool, id: DbId) -> Result<Option<ChapterRow>, sqlx::Error> {
        let query = format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = $1");
        sqlx::query_as::<_, ChapterRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All chapters under any of `subject_ids`, in one query.
    pub async fn list_chapters_by_subjects(
        pool: &PgPool,
        subject_ids: &[DbId],
    ) -> Result<Vec<ChapterRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters \
             WHERE subject_id = ANY($1) \
             ORDER BY subject_id, sort_order, id"
        );
        sqlx::query_as::<_, ChapterRow>(&query)
            .bind(subject_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn find_video(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LongFormVideoRow>, sqlx::Error> {
        sqlx::query_as::<_, LongFormVideoRow>(
            "SELECT id, chapter_id, total_time_secs FROM long_form_videos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_short_form(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ShortFormContentRow>, sqlx::Error> {
        let query = format!("SELECT {SHORT_FORM_COLUMNS} FROM short_form_contents WHERE id = $1");
        sqlx::query_as::<_, ShortFormContentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All short-forms under any of `chapter_ids`, in one query.
    pub async fn list_short_forms_by_chapters(
        pool: &PgPool,
        chapter_ids: &[DbId],
    ) -> Result<Vec<ShortFormContentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {SHORT_FORM_COLUMNS} FROM short_form_contents \
             WHERE chapter_id = ANY($1) \
             ORDER BY chapter_id, sort_order, id"
        );
        sqlx::query_as::<_, ShortFormContentRow>(&query)
            .bind(chapter_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn find_mock_test(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MockTestRow>, sqlx::Error> {
        let query = format!("SELECT {MOCK_TEST_COLUMNS} FROM mock_tests WHERE id = $1");
        sqlx::query_as::<_, MockTestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_mock_tests_by_subjects(
        pool: &PgPool,
        subject_ids: &[DbId],
    ) -> Result<Vec<MockTestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {MOCK_TEST_COLUMNS} FROM mock_tests \
             WHERE subject_id = ANY($1) \
             ORDER BY subject_id, id"
        );
        sqlx::query_as::<_, MockTestRow>(&query)
            .bind(subject_ids)
            .fetch_all(pool)
            .await
    }

    /// MCQs of the given mock tests with their correct options resolved.
    pub async fn list_mock_test_mcqs(
        pool: &PgPool,
        mock_test_ids: &[DbId],
    ) -> Result<Vec<MockTestMcqRow>, sqlx::Error> {
        sqlx::query_as::<_, MockTestMcqRow>(
            "SELECT mtm.mock_test_id, mtm.mcq_id, m.correct_option \
             FROM mock_test_mcqs mtm \
             JOIN mcqs m ON m.id = mtm.mcq_id \
             WHERE mtm.mock_test_id = ANY($1) \
             ORDER BY mtm.mock_test_id, mtm.position, mtm.mcq_id",
        )
        .bind(mock_test_ids)
        .fetch_all(pool)
        .await
    }
}
