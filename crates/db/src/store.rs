//! [`PgStore`]: the core store traits over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use studytrack_core::catalog::{
    Chapter, LongFormVideo, MockTest, ShortFormContent, Student, Subject,
};
use studytrack_core::error::CoreError;
use studytrack_core::mock_test::{already_attempted, MockTestAttempt, MockTestAttemptUpsert};
use studytrack_core::progress::{
    ShortFormProgress, ShortFormProgressUpsert, VideoProgress, VideoProgressUpsert,
};
use studytrack_core::store::{
    CatalogStore, ProgressStore, ShortFormProgressFilter, VideoProgressFilter,
};
use studytrack_core::types::DbId;

use crate::models::catalog::MockTestRow;
use crate::repositories::{
    CatalogRepo, MockTestAttemptRepo, ShortFormProgressRepo, VideoProgressRepo,
};

/// Backend failures never leave this module as anything but `Internal`.
fn internal(op: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |e| {
        tracing::error!(op, error = %e, "Database query failed");
        CoreError::Internal(format!("Database error during {op}"))
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_mcqs(&self, tests: Vec<MockTestRow>) -> Result<Vec<MockTest>, CoreError> {
        if tests.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = tests.iter().map(|t| t.id).collect();
        let mcqs = CatalogRepo::list_mock_test_mcqs(&self.pool, &ids)
            .await
            .map_err(internal("list_mock_test_mcqs"))?;
        Ok(tests.into_iter().map(|t| t.with_mcqs(&mcqs)).collect())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_student_by_user_id(&self, user_id: DbId) -> Result<Option<Student>, CoreError> {
        let row = CatalogRepo::find_student(&self.pool, user_id)
            .await
            .map_err(internal("find_student"))?;
        Ok(row.map(Into::into))
    }

    async fn find_subject(&self, subject_id: DbId) -> Result<Option<Subject>, CoreError> {
        let row = CatalogRepo::find_subject(&self.pool, subject_id)
            .await
            .map_err(internal("find_subject"))?;
        Ok(row.map(Into::into))
    }

    async fn find_subjects_by_class(&self, class_id: DbId) -> Result<Vec<Subject>, CoreError> {
        let rows = CatalogRepo::list_subjects_by_class(&self.pool, class_id)
            .await
            .map_err(internal("list_subjects_by_class"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_chapter(&self, chapter_id: DbId) -> Result<Option<Chapter>, CoreError> {
        let row = CatalogRepo::find_chapter(&self.pool, chapter_id)
            .await
            .map_err(internal("find_chapter"))?;
        Ok(row.map(Into::into))
    }

    async fn find_chapters_by_subjects(
        &self,
        subject_ids: &[DbId],
    ) -> Result<Vec<Chapter>, CoreError> {
        let rows = CatalogRepo::list_chapters_by_subjects(&self.pool, subject_ids)
            .await
            .map_err(internal("list_chapters_by_subjects"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_video(&self, video_id: DbId) -> Result<Option<LongFormVideo>, CoreError> {
        let row = CatalogRepo::find_video(&self.pool, video_id)
            .await
            .map_err(internal("find_video"))?;
        Ok(row.map(Into::into))
    }

    async fn find_short_form(
        &self,
        short_form_id: DbId,
    ) -> Result<Option<ShortFormContent>, CoreError> {
        let row = CatalogRepo::find_short_form(&self.pool, short_form_id)
            .await
            .map_err(internal("find_short_form"))?;
        Ok(row.map(Into::into))
    }

    async fn find_short_forms_by_chapters(
        &self,
        chapter_ids: &[DbId],
    ) -> Result<Vec<ShortFormContent>, CoreError> {
        let rows = CatalogRepo::list_short_forms_by_chapters(&self.pool, chapter_ids)
            .await
            .map_err(internal("list_short_forms_by_chapters"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_mock_test(&self, mock_test_id: DbId) -> Result<Option<MockTest>, CoreError> {
        let row = CatalogRepo::find_mock_test(&self.pool, mock_test_id)
            .await
            .map_err(internal("find_mock_test"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.attach_mcqs(vec![row]).await?.pop())
    }

    async fn find_mock_tests_by_subjects(
        &self,
        subject_ids: &[DbId],
    ) -> Result<Vec<MockTest>, CoreError> {
        let rows = CatalogRepo::list_mock_tests_by_subjects(&self.pool, subject_ids)
            .await
            .map_err(internal("list_mock_tests_by_subjects"))?;
        self.attach_mcqs(rows).await
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(internal("health_check"))
    }

    async fn find_video_progress(
        &self,
        user_id: DbId,
        filter: VideoProgressFilter,
    ) -> Result<Vec<VideoProgress>, CoreError> {
        let rows =
            VideoProgressRepo::list_by_user(&self.pool, user_id, filter.chapter_id, filter.video_id)
                .await
                .map_err(internal("list_video_progress"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_video_progress(
        &self,
        input: &VideoProgressUpsert,
    ) -> Result<VideoProgress, CoreError> {
        let row = VideoProgressRepo::upsert(&self.pool, input)
            .await
            .map_err(internal("upsert_video_progress"))?;
        Ok(row.into())
    }

    async fn find_short_form_progress(
        &self,
        user_id: DbId,
        filter: ShortFormProgressFilter,
    ) -> Result<Vec<ShortFormProgress>, CoreError> {
        let rows = ShortFormProgressRepo::list_by_user(
            &self.pool,
            user_id,
            filter.chapter_id,
            filter.short_form_id,
        )
        .await
        .map_err(internal("list_short_form_progress"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_short_form_progress(
        &self,
        input: &ShortFormProgressUpsert,
    ) -> Result<ShortFormProgress, CoreError> {
        let row = ShortFormProgressRepo::upsert(&self.pool, input)
            .await
            .map_err(internal("upsert_short_form_progress"))?;
        Ok(row.into())
    }

    async fn find_mock_test_attempt(
        &self,
        user_id: DbId,
        mock_test_id: DbId,
        subject_id: DbId,
    ) -> Result<Option<MockTestAttempt>, CoreError> {
        let row = MockTestAttemptRepo::find_by_key(&self.pool, user_id, mock_test_id, subject_id)
            .await
            .map_err(internal("find_mock_test_attempt"))?;
        Ok(row.map(Into::into))
    }

    async fn find_mock_test_attempts(
        &self,
        user_id: DbId,
        subject_id: Option<DbId>,
    ) -> Result<Vec<MockTestAttempt>, CoreError> {
        let rows = MockTestAttemptRepo::list_by_user(&self.pool, user_id, subject_id)
            .await
            .map_err(internal("list_mock_test_attempts"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_mock_test_attempt(
        &self,
        input: &MockTestAttemptUpsert,
    ) -> Result<MockTestAttempt, CoreError> {
        let row = MockTestAttemptRepo::upsert(&self.pool, input)
            .await
            .map_err(internal("upsert_mock_test_attempt"))?
            .ok_or_else(already_attempted)?;
        Ok(row.into())
    }
}
