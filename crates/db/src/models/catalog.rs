//! Catalog rows.

use sqlx::types::Json;
use sqlx::FromRow;
use studytrack_core::catalog::{
    Chapter, LongFormVideo, MockTest, MockTestMcq, SequenceStep, ShortFormContent, Student,
    Subject,
};
use studytrack_core::types::DbId;

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub user_id: DbId,
    pub class_id: DbId,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            user_id: row.user_id,
            class_id: row.class_id,
        }
    }
}

/// A row from the `subjects` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubjectRow {
    pub id: DbId,
    pub class_id: DbId,
    pub name: String,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Self {
            id: row.id,
            class_id: row.class_id,
            name: row.name,
        }
    }
}

/// A row from the `chapters` table.
#[derive(Debug, Clone, FromRow)]
pub struct ChapterRow {
    pub id: DbId,
    pub subject_id: DbId,
    pub name: String,
}

impl From<ChapterRow> for Chapter {
    fn from(row: ChapterRow) -> Self {
        Self {
            id: row.id,
            subject_id: row.subject_id,
            name: row.name,
        }
    }
}

/// A row from the `long_form_videos` table.
#[derive(Debug, Clone, FromRow)]
pub struct LongFormVideoRow {
    pub id: DbId,
    pub chapter_id: DbId,
    pub total_time_secs: f64,
}

impl From<LongFormVideoRow> for LongFormVideo {
    fn from(row: LongFormVideoRow) -> Self {
        Self {
            id: row.id,
            chapter_id: row.chapter_id,
            total_time_secs: row.total_time_secs,
        }
    }
}

/// A row from the `short_form_contents` table. `sequence` is JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ShortFormContentRow {
    pub id: DbId,
    pub chapter_id: DbId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub sequence: Json<Vec<SequenceStep>>,
}

impl From<ShortFormContentRow> for ShortFormContent {
    fn from(row: ShortFormContentRow) -> Self {
        Self {
            id: row.id,
            chapter_id: row.chapter_id,
            title: row.title,
            thumbnail_url: row.thumbnail_url,
            sequence: row.sequence.0,
        }
    }
}

/// A row from the `mock_tests` table, before its MCQs are attached.
#[derive(Debug, Clone, FromRow)]
pub struct MockTestRow {
    pub id: DbId,
    pub subject_id: DbId,
    pub title: String,
}

/// One `mock_test_mcqs` entry joined with the MCQ's correct option.
#[derive(Debug, Clone, FromRow)]
pub struct MockTestMcqRow {
    pub mock_test_id: DbId,
    pub mcq_id: DbId,
    pub correct_option: String,
}

impl MockTestRow {
    /// Attach the MCQs belonging to this test; other rows are ignored.
    pub fn with_mcqs(self, mcqs: &[MockTestMcqRow]) -> MockTest {
        MockTest {
            id: self.id,
            subject_id: self.subject_id,
            title: self.title,
            mcqs: mcqs
                .iter()
                .filter(|m| m.mock_test_id == self.id)
                .map(|m| MockTestMcq {
                    mcq_id: m.mcq_id,
                    correct_option: m.correct_option.clone(),
                })
                .collect(),
        }
    }
}
