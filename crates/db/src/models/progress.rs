//! Progress rows.

use sqlx::types::Json;
use sqlx::FromRow;
use studytrack_core::mock_test::{MockTestAttempt, ScoredMcqAttempt};
use studytrack_core::progress::{ShortFormMcqAttempt, ShortFormProgress, VideoProgress};
use studytrack_core::types::{DbId, Timestamp};

/// A row from the `video_progress` table.
#[derive(Debug, Clone, FromRow)]
pub struct VideoProgressRow {
    pub id: DbId,
    pub user_id: DbId,
    pub video_id: DbId,
    pub chapter_id: DbId,
    pub resume_time: f64,
    pub total_time: f64,
    pub progress_percent: f64,
    pub is_watched: bool,
    pub mcqs_attempted: i32,
    pub correct_mcqs: i32,
    pub updated_at: Timestamp,
}

impl From<VideoProgressRow> for VideoProgress {
    fn from(row: VideoProgressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            video_id: row.video_id,
            chapter_id: row.chapter_id,
            resume_time: row.resume_time,
            total_time: row.total_time,
            progress_percent: row.progress_percent,
            is_watched: row.is_watched,
            mcqs_attempted: row.mcqs_attempted,
            correct_mcqs: row.correct_mcqs,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `short_form_progress` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShortFormProgressRow {
    pub id: DbId,
    pub user_id: DbId,
    pub short_form_id: DbId,
    pub chapter_id: DbId,
    pub watched_clip_indexes: Vec<i32>,
    pub attempted_mcq_ids: Vec<DbId>,
    pub mcq_attempts: Json<Vec<ShortFormMcqAttempt>>,
    pub total_mcqs_attempted: i32,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub is_watched: bool,
    pub percentage: f64,
    pub updated_at: Timestamp,
}

impl From<ShortFormProgressRow> for ShortFormProgress {
    fn from(row: ShortFormProgressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            short_form_id: row.short_form_id,
            chapter_id: row.chapter_id,
            watched_clip_indexes: row.watched_clip_indexes,
            attempted_mcq_ids: row.attempted_mcq_ids,
            mcq_attempts: row.mcq_attempts.0,
            total_mcqs_attempted: row.total_mcqs_attempted,
            correct_count: row.correct_count,
            incorrect_count: row.incorrect_count,
            is_watched: row.is_watched,
            percentage: row.percentage,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `mock_test_attempts` table.
#[derive(Debug, Clone, FromRow)]
pub struct MockTestAttemptRow {
    pub id: DbId,
    pub user_id: DbId,
    pub subject_id: DbId,
    pub mock_test_id: DbId,
    pub mcq_attempts: Json<Vec<ScoredMcqAttempt>>,
    pub total_mcqs_attempted: i32,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub is_attempted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<MockTestAttemptRow> for MockTestAttempt {
    fn from(row: MockTestAttemptRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            subject_id: row.subject_id,
            mock_test_id: row.mock_test_id,
            mcq_attempts: row.mcq_attempts.0,
            total_mcqs_attempted: row.total_mcqs_attempted,
            correct_count: row.correct_count,
            incorrect_count: row.incorrect_count,
            is_attempted: row.is_attempted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
