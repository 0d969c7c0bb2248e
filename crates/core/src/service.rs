//! Request-level orchestration over the catalog and progress stores.
//!
//! Every method resolves the catalog subtree it needs, fetches the user's
//! progress for that subtree with one query per kind, and hands both to a
//! pure builder. Reads without a data dependency are joined concurrently.

use std::sync::Arc;

use crate::attempt_status::{
    mock_test_statuses, short_form_statuses, MockTestAttemptStatus, ShortFormAttemptStatus,
};
use crate::catalog::{CatalogIndex, Subject};
use crate::error::{ensure_id, CoreError};
use crate::mock_test::{score_attempt, MockTestAttempt, RecordMockTestAttempt};
use crate::progress::{
    normalize_short_form_progress, normalize_video_progress, SaveShortFormProgress,
    SaveVideoProgress, ShortFormProgress, VideoProgress,
};
use crate::rollup::{
    self, MockTestReport, ProgressPercentage, ShortFormReport, SubjectProgress, VideoReport,
};
use crate::store::{CatalogStore, ProgressStore, ShortFormProgressFilter, VideoProgressFilter};
use crate::types::DbId;
use crate::unified::{self, UnifiedReport};

#[derive(Clone)]
pub struct ProgressService {
    catalog: Arc<dyn CatalogStore>,
    progress: Arc<dyn ProgressStore>,
}

impl ProgressService {
    pub fn new(catalog: Arc<dyn CatalogStore>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { catalog, progress }
    }

    /// Service over one store that implements both traits.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CatalogStore + ProgressStore + 'static,
    {
        Self {
            catalog: store.clone(),
            progress: store,
        }
    }

    /// Ping the progress backend.
    pub async fn ping(&self) -> Result<(), CoreError> {
        self.progress.ping().await
    }

    // -----------------------------------------------------------------------
    // Catalog resolution
    // -----------------------------------------------------------------------

    /// Subjects of the class the user's student profile belongs to.
    async fn class_subjects(&self, user_id: DbId) -> Result<(DbId, Vec<Subject>), CoreError> {
        ensure_id("user_id", user_id)?;
        let student = self
            .catalog
            .find_student_by_user_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Student", user_id))?;
        let subjects = self.catalog.find_subjects_by_class(student.class_id).await?;
        Ok((student.class_id, subjects))
    }

    /// Like [`Self::class_subjects`] but a class without subjects is an error.
    async fn required_class_subjects(&self, user_id: DbId) -> Result<Vec<Subject>, CoreError> {
        let (class_id, subjects) = self.class_subjects(user_id).await?;
        if subjects.is_empty() {
            return Err(CoreError::not_found("Subjects for class", class_id));
        }
        Ok(subjects)
    }

    /// Chapters (and optionally short-forms) below `subjects`, indexed once.
    async fn build_index(
        &self,
        subjects: Vec<Subject>,
        with_short_forms: bool,
    ) -> Result<CatalogIndex, CoreError> {
        let subject_ids: Vec<DbId> = subjects.iter().map(|s| s.id).collect();
        let chapters = self.catalog.find_chapters_by_subjects(&subject_ids).await?;
        let short_forms = if with_short_forms && !chapters.is_empty() {
            let chapter_ids: Vec<DbId> = chapters.iter().map(|c| c.id).collect();
            self.catalog.find_short_forms_by_chapters(&chapter_ids).await?
        } else {
            Vec::new()
        };
        Ok(CatalogIndex::build(subjects, &chapters, short_forms))
    }

    async fn require_subject(&self, subject_id: DbId) -> Result<Subject, CoreError> {
        self.catalog
            .find_subject(subject_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Subject", subject_id))
    }

    // -----------------------------------------------------------------------
    // Long-form video progress
    // -----------------------------------------------------------------------

    pub async fn save_video_progress(
        &self,
        input: SaveVideoProgress,
    ) -> Result<VideoProgress, CoreError> {
        ensure_id("video_id", input.video_id)?;
        let video = self
            .catalog
            .find_video(input.video_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Video", input.video_id))?;

        let upsert = normalize_video_progress(&input, &video)?;
        let saved = self.progress.upsert_video_progress(&upsert).await?;
        tracing::info!(
            user_id = saved.user_id,
            video_id = saved.video_id,
            chapter_id = saved.chapter_id,
            progress_percent = saved.progress_percent,
            is_watched = saved.is_watched,
            "Video progress saved"
        );
        Ok(saved)
    }

    /// Every stored record for `(user_id, video_id)`; empty is a valid answer.
    pub async fn video_progress(
        &self,
        user_id: DbId,
        video_id: DbId,
    ) -> Result<Vec<VideoProgress>, CoreError> {
        ensure_id("user_id", user_id)?;
        ensure_id("video_id", video_id)?;
        self.progress
            .find_video_progress(
                user_id,
                VideoProgressFilter {
                    video_id: Some(video_id),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn video_report(&self, user_id: DbId) -> Result<VideoReport, CoreError> {
        let (subjects, progress) = tokio::try_join!(
            self.required_class_subjects(user_id),
            self.progress
                .find_video_progress(user_id, VideoProgressFilter::default()),
        )?;
        let index = self.build_index(subjects, false).await?;
        tracing::debug!(user_id, records = progress.len(), "Building video report");
        Ok(rollup::video_report(&index, &progress))
    }

    // -----------------------------------------------------------------------
    // Short-form progress
    // -----------------------------------------------------------------------

    pub async fn save_short_form_progress(
        &self,
        input: SaveShortFormProgress,
    ) -> Result<ShortFormProgress, CoreError> {
        ensure_id("short_form_id", input.short_form_id)?;
        let content = self
            .catalog
            .find_short_form(input.short_form_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Short-form content", input.short_form_id))?;

        let upsert = normalize_short_form_progress(&input, &content)?;
        let saved = self.progress.upsert_short_form_progress(&upsert).await?;
        tracing::info!(
            user_id = saved.user_id,
            short_form_id = saved.short_form_id,
            chapter_id = saved.chapter_id,
            percentage = saved.percentage,
            is_watched = saved.is_watched,
            "Short-form progress saved"
        );
        Ok(saved)
    }

    pub async fn short_form_progress(
        &self,
        user_id: DbId,
        short_form_id: DbId,
    ) -> Result<ShortFormProgress, CoreError> {
        ensure_id("user_id", user_id)?;
        ensure_id("short_form_id", short_form_id)?;
        let filter = ShortFormProgressFilter {
            short_form_id: Some(short_form_id),
            ..Default::default()
        };
        self.progress
            .find_short_form_progress(user_id, filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("Short-form progress", short_form_id))
    }

    pub async fn short_form_report(&self, user_id: DbId) -> Result<ShortFormReport, CoreError> {
        let ((_, subjects), progress) = tokio::try_join!(
            self.class_subjects(user_id),
            self.progress
                .find_short_form_progress(user_id, ShortFormProgressFilter::default()),
        )?;
        let index = self.build_index(subjects, true).await?;
        tracing::debug!(user_id, records = progress.len(), "Building short-form report");
        Ok(rollup::short_form_report(&index, &progress))
    }

    pub async fn short_form_attempt_status(
        &self,
        user_id: DbId,
        chapter_id: DbId,
    ) -> Result<Vec<ShortFormAttemptStatus>, CoreError> {
        ensure_id("user_id", user_id)?;
        ensure_id("chapter_id", chapter_id)?;
        let filter = ShortFormProgressFilter {
            chapter_id: Some(chapter_id),
            ..Default::default()
        };
        let (short_forms, progress) = tokio::try_join!(
            self.catalog.find_short_forms_by_chapters(std::slice::from_ref(&chapter_id)),
            self.progress.find_short_form_progress(user_id, filter),
        )?;
        if short_forms.is_empty() {
            return Err(CoreError::not_found("Short-form content for chapter", chapter_id));
        }
        Ok(short_form_statuses(&short_forms, &progress))
    }

    // -----------------------------------------------------------------------
    // Mock tests
    // -----------------------------------------------------------------------

    /// Score and store one batch of answers.
    ///
    /// Nothing is written when any submitted MCQ was already attempted
    /// under the same key.
    pub async fn record_mock_test_attempt(
        &self,
        input: RecordMockTestAttempt,
    ) -> Result<MockTestAttempt, CoreError> {
        ensure_id("user_id", input.user_id)?;
        ensure_id("subject_id", input.subject_id)?;
        ensure_id("mock_test_id", input.mock_test_id)?;

        let (subject, mock_test, prior) = tokio::try_join!(
            self.catalog.find_subject(input.subject_id),
            self.catalog.find_mock_test(input.mock_test_id),
            self.progress.find_mock_test_attempt(
                input.user_id,
                input.mock_test_id,
                input.subject_id
            ),
        )?;
        if subject.is_none() {
            return Err(CoreError::not_found("Subject", input.subject_id));
        }
        let mock_test =
            mock_test.ok_or_else(|| CoreError::not_found("Mock test", input.mock_test_id))?;

        let upsert = match score_attempt(&input, &mock_test, prior.as_ref()) {
            Ok(upsert) => upsert,
            Err(e) => {
                tracing::warn!(
                    user_id = input.user_id,
                    mock_test_id = input.mock_test_id,
                    error = %e,
                    "Mock test attempt rejected"
                );
                return Err(e);
            }
        };
        let saved = self.progress.upsert_mock_test_attempt(&upsert).await?;
        tracing::info!(
            user_id = saved.user_id,
            subject_id = saved.subject_id,
            mock_test_id = saved.mock_test_id,
            correct = saved.correct_count,
            incorrect = saved.incorrect_count,
            "Mock test attempt recorded"
        );
        Ok(saved)
    }

    pub async fn mock_test_attempt(
        &self,
        user_id: DbId,
        subject_id: DbId,
        mock_test_id: DbId,
    ) -> Result<MockTestAttempt, CoreError> {
        ensure_id("user_id", user_id)?;
        ensure_id("subject_id", subject_id)?;
        ensure_id("mock_test_id", mock_test_id)?;
        self.progress
            .find_mock_test_attempt(user_id, mock_test_id, subject_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Mock test attempt", mock_test_id))
    }

    pub async fn mock_test_report(&self, user_id: DbId) -> Result<MockTestReport, CoreError> {
        let ((_, subjects), attempts) = tokio::try_join!(
            self.class_subjects(user_id),
            self.progress.find_mock_test_attempts(user_id, None),
        )?;
        let subject_ids: Vec<DbId> = subjects.iter().map(|s| s.id).collect();
        let tests = if subject_ids.is_empty() {
            Vec::new()
        } else {
            self.catalog.find_mock_tests_by_subjects(&subject_ids).await?
        };
        tracing::debug!(user_id, attempts = attempts.len(), "Building mock test report");
        Ok(rollup::mock_test_report(&subjects, &tests, &attempts))
    }

    pub async fn mock_test_attempt_status(
        &self,
        user_id: DbId,
        subject_id: DbId,
    ) -> Result<Vec<MockTestAttemptStatus>, CoreError> {
        ensure_id("user_id", user_id)?;
        ensure_id("subject_id", subject_id)?;
        let (subject, tests, attempts) = tokio::try_join!(
            self.require_subject(subject_id),
            self.catalog.find_mock_tests_by_subjects(std::slice::from_ref(&subject_id)),
            self.progress.find_mock_test_attempts(user_id, Some(subject_id)),
        )?;
        Ok(mock_test_statuses(&subject, &tests, &attempts))
    }

    // -----------------------------------------------------------------------
    // Cross-kind and overall progress
    // -----------------------------------------------------------------------

    pub async fn unified_report(&self, user_id: DbId) -> Result<UnifiedReport, CoreError> {
        let subjects = self.required_class_subjects(user_id).await?;
        let (index, videos, short_forms) = tokio::try_join!(
            self.build_index(subjects, true),
            self.progress
                .find_video_progress(user_id, VideoProgressFilter::default()),
            self.progress
                .find_short_form_progress(user_id, ShortFormProgressFilter::default()),
        )?;
        tracing::debug!(
            user_id,
            videos = videos.len(),
            short_forms = short_forms.len(),
            "Building unified report"
        );
        Ok(unified::unified_report(&index, &videos, &short_forms))
    }

    /// Per-subject chapter progress for every subject of a class.
    pub async fn class_subject_progress(
        &self,
        class_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<SubjectProgress>, CoreError> {
        ensure_id("class_id", class_id)?;
        ensure_id("user_id", user_id)?;
        let (subjects, progress) = tokio::try_join!(
            self.catalog.find_subjects_by_class(class_id),
            self.progress
                .find_video_progress(user_id, VideoProgressFilter::default()),
        )?;
        if subjects.is_empty() {
            return Ok(Vec::new());
        }
        let index = self.build_index(subjects, false).await?;
        Ok(rollup::subject_progress(&index, &progress))
    }

    pub async fn subject_overall_progress(
        &self,
        subject_id: DbId,
        user_id: DbId,
    ) -> Result<SubjectProgress, CoreError> {
        ensure_id("subject_id", subject_id)?;
        ensure_id("user_id", user_id)?;
        let (subject, progress) = tokio::try_join!(
            self.require_subject(subject_id),
            self.progress
                .find_video_progress(user_id, VideoProgressFilter::default()),
        )?;
        let index = self.build_index(vec![subject], false).await?;
        rollup::subject_progress(&index, &progress)
            .pop()
            .ok_or_else(|| CoreError::not_found("Subject", subject_id))
    }

    pub async fn mock_test_overall_progress(
        &self,
        subject_id: DbId,
        user_id: DbId,
    ) -> Result<ProgressPercentage, CoreError> {
        ensure_id("subject_id", subject_id)?;
        ensure_id("user_id", user_id)?;
        let (_, tests, attempts) = tokio::try_join!(
            self.require_subject(subject_id),
            self.catalog.find_mock_tests_by_subjects(std::slice::from_ref(&subject_id)),
            self.progress.find_mock_test_attempts(user_id, Some(subject_id)),
        )?;
        Ok(rollup::mock_test_progress(subject_id, &tests, &attempts))
    }

    pub async fn short_form_chapter_progress(
        &self,
        chapter_id: DbId,
        user_id: DbId,
    ) -> Result<ProgressPercentage, CoreError> {
        ensure_id("chapter_id", chapter_id)?;
        ensure_id("user_id", user_id)?;
        let filter = ShortFormProgressFilter {
            chapter_id: Some(chapter_id),
            ..Default::default()
        };
        let (chapter, short_forms, progress) = tokio::try_join!(
            self.catalog.find_chapter(chapter_id),
            self.catalog.find_short_forms_by_chapters(std::slice::from_ref(&chapter_id)),
            self.progress.find_short_form_progress(user_id, filter),
        )?;
        if chapter.is_none() {
            return Err(CoreError::not_found("Chapter", chapter_id));
        }
        Ok(rollup::short_form_chapter_progress(&short_forms, &progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Chapter, LongFormVideo, MockTest, MockTestMcq, SequenceStep, ShortFormContent, Student,
    };
    use crate::memory::{CatalogSeed, InMemoryStore};
    use crate::mock_test::McqSubmission;
    use crate::progress::ShortFormMcqAttempt;
    use assert_matches::assert_matches;

    const USER: DbId = 1;

    fn seed() -> CatalogSeed {
        CatalogSeed {
            students: vec![
                Student {
                    user_id: USER,
                    class_id: 10,
                },
                Student {
                    user_id: 2,
                    class_id: 99,
                },
            ],
            subjects: vec![
                Subject {
                    id: 100,
                    class_id: 10,
                    name: "Physics".into(),
                },
                Subject {
                    id: 200,
                    class_id: 10,
                    name: "Chemistry".into(),
                },
            ],
            chapters: vec![
                Chapter {
                    id: 1000,
                    subject_id: 100,
                    name: "Motion".into(),
                },
                Chapter {
                    id: 1001,
                    subject_id: 100,
                    name: "Forces".into(),
                },
                Chapter {
                    id: 1002,
                    subject_id: 100,
                    name: "Energy".into(),
                },
                Chapter {
                    id: 2000,
                    subject_id: 200,
                    name: "Atoms".into(),
                },
            ],
            videos: vec![
                LongFormVideo {
                    id: 1,
                    chapter_id: 1000,
                    total_time_secs: 100.0,
                },
                LongFormVideo {
                    id: 2,
                    chapter_id: 1001,
                    total_time_secs: 100.0,
                },
            ],
            short_forms: vec![ShortFormContent {
                id: 50,
                chapter_id: 2000,
                title: "Atoms in 60s".into(),
                thumbnail_url: None,
                sequence: vec![
                    SequenceStep::Clip { duration_secs: 30.0 },
                    SequenceStep::Mcq { mcq_id: 501 },
                    SequenceStep::Clip { duration_secs: 30.0 },
                ],
            }],
            mock_tests: vec![MockTest {
                id: 7,
                subject_id: 100,
                title: "Mechanics".into(),
                mcqs: vec![
                    MockTestMcq {
                        mcq_id: 71,
                        correct_option: "A".into(),
                    },
                    MockTestMcq {
                        mcq_id: 72,
                        correct_option: "B".into(),
                    },
                ],
            }],
        }
    }

    fn service() -> (ProgressService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new(seed()));
        (ProgressService::from_store(store.clone()), store)
    }

    fn video_save(video_id: DbId, chapter_id: DbId, resume_time: f64) -> SaveVideoProgress {
        SaveVideoProgress {
            user_id: USER,
            video_id,
            chapter_id,
            resume_time,
            total_time: 100.0,
            mcqs_attempted: 0,
            correct_mcqs: 0,
        }
    }

    fn attempt(pairs: &[(DbId, &str)]) -> RecordMockTestAttempt {
        RecordMockTestAttempt {
            user_id: USER,
            subject_id: 100,
            mock_test_id: 7,
            mcq_attempts: pairs
                .iter()
                .map(|(id, opt)| McqSubmission {
                    mcq_id: *id,
                    selected_option: opt.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn repeated_video_saves_keep_one_record() {
        let (svc, store) = service();
        svc.save_video_progress(video_save(1, 1000, 20.0)).await.unwrap();
        let second = svc.save_video_progress(video_save(1, 1000, 99.0)).await.unwrap();

        assert!(second.is_watched);
        assert_eq!(store.record_count().await, 1);
        let rows = svc.video_progress(USER, 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resume_time, 99.0);
    }

    #[tokio::test]
    async fn video_save_for_unknown_video_is_not_found() {
        let (svc, _) = service();
        let err = svc.save_video_progress(video_save(42, 1000, 20.0)).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Video", id: 42 });
    }

    #[tokio::test]
    async fn video_report_rolls_up_chapters() {
        let (svc, _) = service();
        svc.save_video_progress(video_save(1, 1000, 100.0)).await.unwrap();
        svc.save_video_progress(video_save(2, 1001, 50.0)).await.unwrap();

        let report = svc.video_report(USER).await.unwrap();
        let physics = &report.subjects[0];
        assert_eq!(physics.total_chapters, 3);
        assert_eq!(physics.completed_chapters, 1);
        assert_eq!(physics.progress_percentage, 33);
        assert_eq!(report.subjects[1].progress_percentage, 0);
    }

    #[tokio::test]
    async fn report_for_class_without_subjects_is_not_found() {
        let (svc, _) = service();
        assert_matches!(
            svc.video_report(2).await,
            Err(CoreError::NotFound { entity: "Subjects for class", id: 99 })
        );
        let report = svc.mock_test_report(2).await.unwrap();
        assert!(report.subjects.is_empty());
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let (svc, _) = service();
        assert_matches!(
            svc.unified_report(404).await,
            Err(CoreError::NotFound { entity: "Student", .. })
        );
    }

    #[tokio::test]
    async fn short_form_save_dedups_and_completes_chapter() {
        let (svc, _) = service();
        let input = SaveShortFormProgress {
            user_id: USER,
            short_form_id: 50,
            chapter_id: 2000,
            watched_clip_indexes: vec![1, 0, 1],
            attempted_mcq_ids: vec![501, 501],
            mcq_attempts: vec![ShortFormMcqAttempt {
                mcq_id: 501,
                selected_option: "B".into(),
                is_correct: true,
            }],
        };
        let saved = svc.save_short_form_progress(input.clone()).await.unwrap();
        let again = svc.save_short_form_progress(input).await.unwrap();
        assert_eq!(saved.watched_clip_indexes, vec![0, 1]);
        assert_eq!(again.attempted_mcq_ids, vec![501]);
        assert!(again.is_watched);

        let unified = svc.unified_report(USER).await.unwrap();
        assert_eq!(unified.subjects[1].completed_chapters, 1);
        assert_eq!(unified.subjects[1].progress_percentage, 100);

        let status = svc.short_form_attempt_status(USER, 2000).await.unwrap();
        assert!(status[0].is_attempted);
        let chapter = svc.short_form_chapter_progress(2000, USER).await.unwrap();
        assert_eq!(chapter.progress_percentage, 100);
    }

    #[tokio::test]
    async fn short_form_status_for_empty_chapter_is_not_found() {
        let (svc, _) = service();
        assert_matches!(
            svc.short_form_attempt_status(USER, 1000).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn conflicting_attempt_writes_nothing() {
        let (svc, _) = service();
        let first = svc.record_mock_test_attempt(attempt(&[(71, "A")])).await.unwrap();
        assert_eq!(first.correct_count, 1);

        let err = svc
            .record_mock_test_attempt(attempt(&[(72, "B"), (71, "C")]))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));

        let stored = svc.mock_test_attempt(USER, 100, 7).await.unwrap();
        assert_eq!(stored.mcq_attempts.len(), 1);
        assert_eq!(stored.mcq_attempts[0].mcq_id, 71);
        assert_eq!(stored.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn attempt_for_unknown_mock_test_is_not_found() {
        let (svc, _) = service();
        let mut input = attempt(&[(71, "A")]);
        input.mock_test_id = 8;
        assert_matches!(
            svc.record_mock_test_attempt(input).await,
            Err(CoreError::NotFound { entity: "Mock test", id: 8 })
        );
    }

    #[tokio::test]
    async fn mock_test_progress_and_status() {
        let (svc, _) = service();
        svc.record_mock_test_attempt(attempt(&[(71, "A")])).await.unwrap();

        let progress = svc.mock_test_overall_progress(100, USER).await.unwrap();
        assert_eq!(progress.progress_percentage, 50);

        let status = svc.mock_test_attempt_status(USER, 100).await.unwrap();
        assert_eq!(status.len(), 1);
        assert!(status[0].is_attempted);
        assert_eq!(status[0].subject, "Physics");
    }

    #[tokio::test]
    async fn subject_overall_progress_for_single_subject() {
        let (svc, _) = service();
        svc.save_video_progress(video_save(1, 1000, 100.0)).await.unwrap();
        let progress = svc.subject_overall_progress(100, USER).await.unwrap();
        assert_eq!(progress.completed_chapters, 1);
        assert_eq!(progress.progress_percentage, 33);

        let listed = svc.class_subject_progress(10, USER).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(svc.class_subject_progress(55, USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_ids_are_validation_errors() {
        let (svc, _) = service();
        assert_matches!(svc.video_progress(0, 1).await, Err(CoreError::Validation(_)));
        assert_matches!(
            svc.mock_test_attempt_status(USER, -3).await,
            Err(CoreError::Validation(_))
        );
    }
}
