//! Storage seams consumed by [`crate::service::ProgressService`].
//!
//! The catalog is read-only from this crate's point of view. Progress
//! upserts fully replace the mutable fields of the record identified by
//! its natural key, atomically per key, and never create a second record
//! for the same key.

use async_trait::async_trait;

use crate::catalog::{Chapter, LongFormVideo, MockTest, ShortFormContent, Student, Subject};
use crate::error::CoreError;
use crate::mock_test::{MockTestAttempt, MockTestAttemptUpsert};
use crate::progress::{
    ShortFormProgress, ShortFormProgressUpsert, VideoProgress, VideoProgressUpsert,
};
use crate::types::DbId;

/// Optional narrowing for video progress lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoProgressFilter {
    pub chapter_id: Option<DbId>,
    pub video_id: Option<DbId>,
}

/// Optional narrowing for short-form progress lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShortFormProgressFilter {
    pub chapter_id: Option<DbId>,
    pub short_form_id: Option<DbId>,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_student_by_user_id(&self, user_id: DbId) -> Result<Option<Student>, CoreError>;

    async fn find_subject(&self, subject_id: DbId) -> Result<Option<Subject>, CoreError>;

    async fn find_subjects_by_class(&self, class_id: DbId) -> Result<Vec<Subject>, CoreError>;

    async fn find_chapter(&self, chapter_id: DbId) -> Result<Option<Chapter>, CoreError>;

    async fn find_chapters_by_subjects(
        &self,
        subject_ids: &[DbId],
    ) -> Result<Vec<Chapter>, CoreError>;

    async fn find_video(&self, video_id: DbId) -> Result<Option<LongFormVideo>, CoreError>;

    async fn find_short_form(
        &self,
        short_form_id: DbId,
    ) -> Result<Option<ShortFormContent>, CoreError>;

    async fn find_short_forms_by_chapters(
        &self,
        chapter_ids: &[DbId],
    ) -> Result<Vec<ShortFormContent>, CoreError>;

    /// Mock test with every MCQ's correct option resolved.
    async fn find_mock_test(&self, mock_test_id: DbId) -> Result<Option<MockTest>, CoreError>;

    async fn find_mock_tests_by_subjects(
        &self,
        subject_ids: &[DbId],
    ) -> Result<Vec<MockTest>, CoreError>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn find_video_progress(
        &self,
        user_id: DbId,
        filter: VideoProgressFilter,
    ) -> Result<Vec<VideoProgress>, CoreError>;

    async fn upsert_video_progress(
        &self,
        input: &VideoProgressUpsert,
    ) -> Result<VideoProgress, CoreError>;

    async fn find_short_form_progress(
        &self,
        user_id: DbId,
        filter: ShortFormProgressFilter,
    ) -> Result<Vec<ShortFormProgress>, CoreError>;

    async fn upsert_short_form_progress(
        &self,
        input: &ShortFormProgressUpsert,
    ) -> Result<ShortFormProgress, CoreError>;

    async fn find_mock_test_attempt(
        &self,
        user_id: DbId,
        mock_test_id: DbId,
        subject_id: DbId,
    ) -> Result<Option<MockTestAttempt>, CoreError>;

    /// All attempts of a user, optionally narrowed to one subject.
    async fn find_mock_test_attempts(
        &self,
        user_id: DbId,
        subject_id: Option<DbId>,
    ) -> Result<Vec<MockTestAttempt>, CoreError>;

    /// Replace the attempt for its key. Fails with [`CoreError::Conflict`],
    /// writing nothing, when the stored attempt already holds one of the
    /// submitted MCQs; the check and the write are one atomic step.
    async fn upsert_mock_test_attempt(
        &self,
        input: &MockTestAttemptUpsert,
    ) -> Result<MockTestAttempt, CoreError>;
}
