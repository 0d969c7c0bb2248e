//! In-process implementation of both store traits.
//!
//! The catalog is fixed at construction. Progress tables live behind a
//! `tokio::sync::RwLock`; every upsert takes the write lock for the whole
//! find-and-replace-or-insert so a natural key never maps to two records.
//! Used by tests and by local runs without a database.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::catalog::{Chapter, LongFormVideo, MockTest, ShortFormContent, Student, Subject};
use crate::error::CoreError;
use crate::mock_test::{already_attempted, MockTestAttempt, MockTestAttemptUpsert};
use crate::progress::{
    ShortFormProgress, ShortFormProgressUpsert, VideoProgress, VideoProgressUpsert,
};
use crate::store::{CatalogStore, ProgressStore, ShortFormProgressFilter, VideoProgressFilter};
use crate::types::DbId;

/// Catalog contents an [`InMemoryStore`] is built from.
#[derive(Debug, Clone, Default)]
pub struct CatalogSeed {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub chapters: Vec<Chapter>,
    pub videos: Vec<LongFormVideo>,
    pub short_forms: Vec<ShortFormContent>,
    pub mock_tests: Vec<MockTest>,
}

type Key = (DbId, DbId, DbId);

#[derive(Default)]
struct ProgressTables {
    next_id: DbId,
    videos: HashMap<Key, VideoProgress>,
    short_forms: HashMap<Key, ShortFormProgress>,
    attempts: HashMap<Key, MockTestAttempt>,
}

impl ProgressTables {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

pub struct InMemoryStore {
    catalog: CatalogSeed,
    progress: RwLock<ProgressTables>,
}

impl InMemoryStore {
    pub fn new(catalog: CatalogSeed) -> Self {
        Self {
            catalog,
            progress: RwLock::new(ProgressTables::default()),
        }
    }

    /// Number of stored records across all three progress kinds.
    pub async fn record_count(&self) -> usize {
        let tables = self.progress.read().await;
        tables.videos.len() + tables.short_forms.len() + tables.attempts.len()
    }
}

/// Records ordered by id so listings are stable.
fn sorted_by_id<T: Clone>(rows: impl Iterator<Item = T>, id: impl Fn(&T) -> DbId) -> Vec<T> {
    let mut out: Vec<T> = rows.collect();
    out.sort_by_key(|r| id(r));
    out
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_student_by_user_id(&self, user_id: DbId) -> Result<Option<Student>, CoreError> {
        Ok(self
            .catalog
            .students
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn find_subject(&self, subject_id: DbId) -> Result<Option<Subject>, CoreError> {
        Ok(self
            .catalog
            .subjects
            .iter()
            .find(|s| s.id == subject_id)
            .cloned())
    }

    async fn find_subjects_by_class(&self, class_id: DbId) -> Result<Vec<Subject>, CoreError> {
        Ok(self
            .catalog
            .subjects
            .iter()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn find_chapter(&self, chapter_id: DbId) -> Result<Option<Chapter>, CoreError> {
        Ok(self
            .catalog
            .chapters
            .iter()
            .find(|c| c.id == chapter_id)
            .cloned())
    }

    async fn find_chapters_by_subjects(
        &self,
        subject_ids: &[DbId],
    ) -> Result<Vec<Chapter>, CoreError> {
        Ok(self
            .catalog
            .chapters
            .iter()
            .filter(|c| subject_ids.contains(&c.subject_id))
            .cloned()
            .collect())
    }

    async fn find_video(&self, video_id: DbId) -> Result<Option<LongFormVideo>, CoreError> {
        Ok(self
            .catalog
            .videos
            .iter()
            .find(|v| v.id == video_id)
            .cloned())
    }

    async fn find_short_form(
        &self,
        short_form_id: DbId,
    ) -> Result<Option<ShortFormContent>, CoreError> {
        Ok(self
            .catalog
            .short_forms
            .iter()
            .find(|sf| sf.id == short_form_id)
            .cloned())
    }

    async fn find_short_forms_by_chapters(
        &self,
        chapter_ids: &[DbId],
    ) -> Result<Vec<ShortFormContent>, CoreError> {
        Ok(self
            .catalog
            .short_forms
            .iter()
            .filter(|sf| chapter_ids.contains(&sf.chapter_id))
            .cloned()
            .collect())
    }

    async fn find_mock_test(&self, mock_test_id: DbId) -> Result<Option<MockTest>, CoreError> {
        Ok(self
            .catalog
            .mock_tests
            .iter()
            .find(|t| t.id == mock_test_id)
            .cloned())
    }

    async fn find_mock_tests_by_subjects(
        &self,
        subject_ids: &[DbId],
    ) -> Result<Vec<MockTest>, CoreError> {
        Ok(self
            .catalog
            .mock_tests
            .iter()
            .filter(|t| subject_ids.contains(&t.subject_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn find_video_progress(
        &self,
        user_id: DbId,
        filter: VideoProgressFilter,
    ) -> Result<Vec<VideoProgress>, CoreError> {
        let tables = self.progress.read().await;
        let rows = tables
            .videos
            .values()
            .filter(|p| p.user_id == user_id)
            .filter(|p| filter.chapter_id.map_or(true, |id| p.chapter_id == id))
            .filter(|p| filter.video_id.map_or(true, |id| p.video_id == id))
            .cloned();
        Ok(sorted_by_id(rows, |p| p.id))
    }

    async fn upsert_video_progress(
        &self,
        input: &VideoProgressUpsert,
    ) -> Result<VideoProgress, CoreError> {
        let mut tables = self.progress.write().await;
        let key = (input.user_id, input.video_id, input.chapter_id);
        let id = match tables.videos.get(&key) {
            Some(existing) => existing.id,
            None => tables.allocate_id(),
        };
        let record = VideoProgress {
            id,
            user_id: input.user_id,
            video_id: input.video_id,
            chapter_id: input.chapter_id,
            resume_time: input.resume_time,
            total_time: input.total_time,
            progress_percent: input.progress_percent,
            is_watched: input.is_watched,
            mcqs_attempted: input.mcqs_attempted,
            correct_mcqs: input.correct_mcqs,
            updated_at: Utc::now(),
        };
        tables.videos.insert(key, record.clone());
        Ok(record)
    }

    async fn find_short_form_progress(
        &self,
        user_id: DbId,
        filter: ShortFormProgressFilter,
    ) -> Result<Vec<ShortFormProgress>, CoreError> {
        let tables = self.progress.read().await;
        let rows = tables
            .short_forms
            .values()
            .filter(|p| p.user_id == user_id)
            .filter(|p| filter.chapter_id.map_or(true, |id| p.chapter_id == id))
            .filter(|p| filter.short_form_id.map_or(true, |id| p.short_form_id == id))
            .cloned();
        Ok(sorted_by_id(rows, |p| p.id))
    }

    async fn upsert_short_form_progress(
        &self,
        input: &ShortFormProgressUpsert,
    ) -> Result<ShortFormProgress, CoreError> {
        let mut tables = self.progress.write().await;
        let key = (input.user_id, input.short_form_id, input.chapter_id);
        let id = match tables.short_forms.get(&key) {
            Some(existing) => existing.id,
            None => tables.allocate_id(),
        };
        let record = ShortFormProgress {
            id,
            user_id: input.user_id,
            short_form_id: input.short_form_id,
            chapter_id: input.chapter_id,
            watched_clip_indexes: input.watched_clip_indexes.clone(),
            attempted_mcq_ids: input.attempted_mcq_ids.clone(),
            mcq_attempts: input.mcq_attempts.clone(),
            total_mcqs_attempted: input.total_mcqs_attempted,
            correct_count: input.correct_count,
            incorrect_count: input.incorrect_count,
            is_watched: input.is_watched,
            percentage: input.percentage,
            updated_at: Utc::now(),
        };
        tables.short_forms.insert(key, record.clone());
        Ok(record)
    }

    async fn find_mock_test_attempt(
        &self,
        user_id: DbId,
        mock_test_id: DbId,
        subject_id: DbId,
    ) -> Result<Option<MockTestAttempt>, CoreError> {
        let tables = self.progress.read().await;
        Ok(tables
            .attempts
            .get(&(user_id, mock_test_id, subject_id))
            .cloned())
    }

    async fn find_mock_test_attempts(
        &self,
        user_id: DbId,
        subject_id: Option<DbId>,
    ) -> Result<Vec<MockTestAttempt>, CoreError> {
        let tables = self.progress.read().await;
        let rows = tables
            .attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .filter(|a| subject_id.map_or(true, |id| a.subject_id == id))
            .cloned();
        Ok(sorted_by_id(rows, |a| a.id))
    }

    async fn upsert_mock_test_attempt(
        &self,
        input: &MockTestAttemptUpsert,
    ) -> Result<MockTestAttempt, CoreError> {
        let mut tables = self.progress.write().await;
        let key = (input.user_id, input.mock_test_id, input.subject_id);
        let now = Utc::now();
        let (id, created_at) = match tables.attempts.get(&key) {
            Some(existing) => {
                let stored: HashSet<DbId> =
                    existing.mcq_attempts.iter().map(|a| a.mcq_id).collect();
                if input.mcq_attempts.iter().any(|a| stored.contains(&a.mcq_id)) {
                    return Err(already_attempted());
                }
                (existing.id, existing.created_at)
            }
            None => (tables.allocate_id(), now),
        };
        let record = MockTestAttempt {
            id,
            user_id: input.user_id,
            subject_id: input.subject_id,
            mock_test_id: input.mock_test_id,
            mcq_attempts: input.mcq_attempts.clone(),
            total_mcqs_attempted: input.total_mcqs_attempted,
            correct_count: input.correct_count,
            incorrect_count: input.incorrect_count,
            is_attempted: true,
            created_at,
            updated_at: now,
        };
        tables.attempts.insert(key, record.clone());
        Ok(record)
    }
}
