//! "Has the user started this?" listings for mock tests and short-forms.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{MockTest, ShortFormContent, Subject};
use crate::mock_test::MockTestAttempt;
use crate::progress::ShortFormProgress;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockTestAttemptStatus {
    pub mock_test_id: DbId,
    pub title: String,
    pub subject: String,
    pub is_attempted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortFormAttemptStatus {
    pub short_form_id: DbId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub is_attempted: bool,
}

/// One row per mock test of `subject`; attempted when an attempt record
/// exists for it, regardless of how many MCQs it holds.
pub fn mock_test_statuses(
    subject: &Subject,
    tests: &[MockTest],
    attempts: &[MockTestAttempt],
) -> Vec<MockTestAttemptStatus> {
    let attempted: HashSet<DbId> = attempts
        .iter()
        .filter(|a| a.subject_id == subject.id)
        .map(|a| a.mock_test_id)
        .collect();

    tests
        .iter()
        .filter(|t| t.subject_id == subject.id)
        .map(|t| MockTestAttemptStatus {
            mock_test_id: t.id,
            title: t.title.clone(),
            subject: subject.name.clone(),
            is_attempted: attempted.contains(&t.id),
        })
        .collect()
}

pub fn short_form_statuses(
    short_forms: &[ShortFormContent],
    progress: &[ShortFormProgress],
) -> Vec<ShortFormAttemptStatus> {
    let attempted: HashSet<DbId> = progress.iter().map(|p| p.short_form_id).collect();
    short_forms
        .iter()
        .map(|sf| ShortFormAttemptStatus {
            short_form_id: sf.id,
            title: sf.title.clone(),
            thumbnail_url: sf.thumbnail_url.clone(),
            is_attempted: attempted.contains(&sf.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn mock_test_status_marks_presence_only() {
        let subject = Subject {
            id: 2,
            class_id: 1,
            name: "Physics".into(),
        };
        let tests = vec![
            MockTest {
                id: 1,
                subject_id: 2,
                title: "Kinematics".into(),
                mcqs: vec![],
            },
            MockTest {
                id: 2,
                subject_id: 2,
                title: "Optics".into(),
                mcqs: vec![],
            },
        ];
        let attempts = vec![MockTestAttempt {
            id: 1,
            user_id: 1,
            subject_id: 2,
            mock_test_id: 2,
            mcq_attempts: vec![],
            total_mcqs_attempted: 0,
            correct_count: 0,
            incorrect_count: 0,
            is_attempted: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];

        let rows = mock_test_statuses(&subject, &tests, &attempts);
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_attempted);
        assert!(rows[1].is_attempted);
        assert_eq!(rows[1].subject, "Physics");
    }

    #[test]
    fn short_form_status_without_progress() {
        let forms = vec![ShortFormContent {
            id: 4,
            chapter_id: 1,
            title: "Atoms".into(),
            thumbnail_url: Some("https://cdn.example/atoms.png".into()),
            sequence: vec![],
        }];
        let rows = short_form_statuses(&forms, &[]);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_attempted);
    }
}
