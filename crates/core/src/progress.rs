//! Per-user progress records and their save-time normalization.
//!
//! Each record is keyed by a natural key and is always upserted: a save
//! fully replaces the mutable fields of the record for that key, it never
//! merge-patches. Completion flags and counters are derived here, on the
//! server, from the submitted raw state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::{LongFormVideo, ShortFormContent};
use crate::completion::Coverage;
use crate::error::CoreError;
use crate::percent::{watch_percentage, WATCHED_THRESHOLD_PCT};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Long-form video progress
// ---------------------------------------------------------------------------

/// Stored video progress, unique per `(user_id, video_id, chapter_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub video_id: DbId,
    pub chapter_id: DbId,
    pub resume_time: f64,
    pub total_time: f64,
    /// Clamped to `[0, 100]`.
    pub progress_percent: f64,
    pub is_watched: bool,
    /// Checkpoint MCQs answered while watching.
    pub mcqs_attempted: i32,
    pub correct_mcqs: i32,
    pub updated_at: Timestamp,
}

/// Request body for saving video progress.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveVideoProgress {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub user_id: DbId,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub video_id: DbId,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub chapter_id: DbId,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub resume_time: f64,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub total_time: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub mcqs_attempted: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub correct_mcqs: i32,
}

/// Fully computed replacement state for one video progress key.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProgressUpsert {
    pub user_id: DbId,
    pub video_id: DbId,
    pub chapter_id: DbId,
    pub resume_time: f64,
    pub total_time: f64,
    pub progress_percent: f64,
    pub is_watched: bool,
    pub mcqs_attempted: i32,
    pub correct_mcqs: i32,
}

/// Validate a save request against the catalog video and derive the
/// stored fields.
pub fn normalize_video_progress(
    input: &SaveVideoProgress,
    video: &LongFormVideo,
) -> Result<VideoProgressUpsert, CoreError> {
    input.validate()?;

    if !input.resume_time.is_finite() || !input.total_time.is_finite() {
        return Err(CoreError::Validation(
            "resume_time and total_time must be finite numbers".to_string(),
        ));
    }
    if video.chapter_id != input.chapter_id {
        return Err(CoreError::Validation(format!(
            "Video {} does not belong to chapter {}",
            input.video_id, input.chapter_id
        )));
    }
    if input.correct_mcqs > input.mcqs_attempted {
        return Err(CoreError::Validation(
            "correct_mcqs cannot exceed mcqs_attempted".to_string(),
        ));
    }

    let progress_percent = watch_percentage(input.resume_time, input.total_time);

    Ok(VideoProgressUpsert {
        user_id: input.user_id,
        video_id: input.video_id,
        chapter_id: input.chapter_id,
        resume_time: input.resume_time,
        total_time: input.total_time,
        progress_percent,
        is_watched: progress_percent >= WATCHED_THRESHOLD_PCT,
        mcqs_attempted: input.mcqs_attempted,
        correct_mcqs: input.correct_mcqs,
    })
}

// ---------------------------------------------------------------------------
// Short-form progress
// ---------------------------------------------------------------------------

/// A single MCQ answer inside a short-form sequence, as reported by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortFormMcqAttempt {
    pub mcq_id: DbId,
    pub selected_option: String,
    pub is_correct: bool,
}

/// Stored short-form progress, unique per `(user_id, short_form_id, chapter_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortFormProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub short_form_id: DbId,
    pub chapter_id: DbId,
    /// Sorted, distinct clip positions (0-based among clip steps).
    pub watched_clip_indexes: Vec<i32>,
    /// Sorted, distinct MCQ ids.
    pub attempted_mcq_ids: Vec<DbId>,
    pub mcq_attempts: Vec<ShortFormMcqAttempt>,
    pub total_mcqs_attempted: i32,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub is_watched: bool,
    pub percentage: f64,
    pub updated_at: Timestamp,
}

/// Request body for saving short-form progress.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveShortFormProgress {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub user_id: DbId,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub short_form_id: DbId,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub chapter_id: DbId,
    #[serde(default)]
    pub watched_clip_indexes: Vec<i32>,
    #[serde(default)]
    pub attempted_mcq_ids: Vec<DbId>,
    #[serde(default)]
    pub mcq_attempts: Vec<ShortFormMcqAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortFormProgressUpsert {
    pub user_id: DbId,
    pub short_form_id: DbId,
    pub chapter_id: DbId,
    pub watched_clip_indexes: Vec<i32>,
    pub attempted_mcq_ids: Vec<DbId>,
    pub mcq_attempts: Vec<ShortFormMcqAttempt>,
    pub total_mcqs_attempted: i32,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub is_watched: bool,
    pub percentage: f64,
}

/// Validate a save request against its short-form content and derive the
/// stored fields. Re-submitting the same indexes or ids yields the same
/// stored sets.
pub fn normalize_short_form_progress(
    input: &SaveShortFormProgress,
    content: &ShortFormContent,
) -> Result<ShortFormProgressUpsert, CoreError> {
    input.validate()?;

    if content.chapter_id != input.chapter_id {
        return Err(CoreError::Validation(format!(
            "Short-form {} does not belong to chapter {}",
            input.short_form_id, input.chapter_id
        )));
    }

    let total_clips = content.total_clips();
    let clips: BTreeSet<i32> = input.watched_clip_indexes.iter().copied().collect();
    if let Some(bad) = clips
        .iter()
        .find(|&&idx| idx < 0 || idx as usize >= total_clips)
    {
        return Err(CoreError::Validation(format!(
            "Clip index {bad} is out of range for a sequence with {total_clips} clips"
        )));
    }

    let sequence_mcqs = content.mcq_ids();
    let mcqs: BTreeSet<DbId> = input.attempted_mcq_ids.iter().copied().collect();
    let answered = input.mcq_attempts.iter().map(|a| &a.mcq_id);
    if let Some(bad) = mcqs.iter().chain(answered).find(|id| !sequence_mcqs.contains(*id)) {
        return Err(CoreError::Validation(format!(
            "MCQ {bad} is not part of short-form {}",
            input.short_form_id
        )));
    }

    // At most one answer per attempted MCQ.
    let mut seen = BTreeSet::new();
    for attempt in &input.mcq_attempts {
        if !seen.insert(attempt.mcq_id) {
            return Err(CoreError::Validation(format!(
                "MCQ {} is answered more than once",
                attempt.mcq_id
            )));
        }
        if !mcqs.contains(&attempt.mcq_id) {
            return Err(CoreError::Validation(format!(
                "MCQ {} is answered but missing from attempted_mcq_ids",
                attempt.mcq_id
            )));
        }
    }

    let watched_clip_indexes: Vec<i32> = clips.into_iter().collect();
    let attempted_mcq_ids: Vec<DbId> = mcqs.into_iter().collect();
    let coverage = Coverage::of(content, &watched_clip_indexes, &attempted_mcq_ids);

    let total_mcqs_attempted = count(input.mcq_attempts.len());
    let correct_count = count(input.mcq_attempts.iter().filter(|a| a.is_correct).count());

    Ok(ShortFormProgressUpsert {
        user_id: input.user_id,
        short_form_id: input.short_form_id,
        chapter_id: input.chapter_id,
        watched_clip_indexes,
        attempted_mcq_ids,
        mcq_attempts: input.mcq_attempts.clone(),
        total_mcqs_attempted,
        correct_count,
        incorrect_count: total_mcqs_attempted - correct_count,
        is_watched: coverage.is_complete(),
        percentage: coverage.percentage(),
    })
}

pub(crate) fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SequenceStep;
    use assert_matches::assert_matches;

    fn video(chapter_id: DbId) -> LongFormVideo {
        LongFormVideo {
            id: 5,
            chapter_id,
            total_time_secs: 600.0,
        }
    }

    fn save_video(resume_time: f64, total_time: f64) -> SaveVideoProgress {
        SaveVideoProgress {
            user_id: 1,
            video_id: 5,
            chapter_id: 10,
            resume_time,
            total_time,
            mcqs_attempted: 0,
            correct_mcqs: 0,
        }
    }

    fn content() -> ShortFormContent {
        ShortFormContent {
            id: 3,
            chapter_id: 10,
            title: "Cells".into(),
            thumbnail_url: None,
            sequence: vec![
                SequenceStep::Clip { duration_secs: 10.0 },
                SequenceStep::Mcq { mcq_id: 100 },
                SequenceStep::Clip { duration_secs: 20.0 },
                SequenceStep::Mcq { mcq_id: 101 },
            ],
        }
    }

    fn save_short(clips: Vec<i32>, mcqs: Vec<DbId>) -> SaveShortFormProgress {
        SaveShortFormProgress {
            user_id: 1,
            short_form_id: 3,
            chapter_id: 10,
            watched_clip_indexes: clips,
            attempted_mcq_ids: mcqs,
            mcq_attempts: vec![],
        }
    }

    // -- video ----------------------------------------------------------------

    #[test]
    fn video_at_threshold_is_watched() {
        let out = normalize_video_progress(&save_video(95.0, 100.0), &video(10)).unwrap();
        assert!(out.is_watched);
        assert_eq!(out.progress_percent, 95.0);
    }

    #[test]
    fn video_below_threshold_is_not_watched() {
        let out = normalize_video_progress(&save_video(94.9, 100.0), &video(10)).unwrap();
        assert!(!out.is_watched);
    }

    #[test]
    fn video_progress_clamped_when_resume_exceeds_total() {
        let out = normalize_video_progress(&save_video(250.0, 100.0), &video(10)).unwrap();
        assert_eq!(out.progress_percent, 100.0);
        assert!(out.is_watched);
    }

    #[test]
    fn video_zero_total_time_rejected() {
        let err = normalize_video_progress(&save_video(10.0, 0.0), &video(10)).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("total_time"));
    }

    #[test]
    fn video_wrong_chapter_rejected() {
        let err = normalize_video_progress(&save_video(10.0, 100.0), &video(11)).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn video_correct_above_attempted_rejected() {
        let mut input = save_video(10.0, 100.0);
        input.mcqs_attempted = 1;
        input.correct_mcqs = 2;
        assert_matches!(
            normalize_video_progress(&input, &video(10)),
            Err(CoreError::Validation(_))
        );
    }

    // -- short-form -----------------------------------------------------------

    #[test]
    fn short_form_full_coverage_is_watched() {
        let out = normalize_short_form_progress(&save_short(vec![1, 0], vec![101, 100]), &content())
            .unwrap();
        assert!(out.is_watched);
        assert_eq!(out.percentage, 100.0);
        assert_eq!(out.watched_clip_indexes, vec![0, 1]);
        assert_eq!(out.attempted_mcq_ids, vec![100, 101]);
    }

    #[test]
    fn short_form_duplicates_are_collapsed() {
        let once = normalize_short_form_progress(&save_short(vec![0], vec![100]), &content()).unwrap();
        let twice =
            normalize_short_form_progress(&save_short(vec![0, 0, 0], vec![100, 100]), &content())
                .unwrap();
        assert_eq!(once, twice);
        assert!(!twice.is_watched);
        assert_eq!(twice.percentage, 50.0);
    }

    #[test]
    fn short_form_out_of_range_clip_rejected() {
        let err = normalize_short_form_progress(&save_short(vec![2], vec![]), &content()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("out of range"));
    }

    #[test]
    fn short_form_foreign_mcq_rejected() {
        let err = normalize_short_form_progress(&save_short(vec![], vec![999]), &content()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("999"));
    }

    #[test]
    fn short_form_counts_attempts() {
        let mut input = save_short(vec![], vec![100, 101]);
        input.mcq_attempts = vec![
            ShortFormMcqAttempt {
                mcq_id: 100,
                selected_option: "A".into(),
                is_correct: true,
            },
            ShortFormMcqAttempt {
                mcq_id: 101,
                selected_option: "C".into(),
                is_correct: false,
            },
        ];
        let out = normalize_short_form_progress(&input, &content()).unwrap();
        assert_eq!(out.total_mcqs_attempted, 2);
        assert_eq!(out.correct_count, 1);
        assert_eq!(out.incorrect_count, 1);
    }

    fn answer(mcq_id: DbId, is_correct: bool) -> ShortFormMcqAttempt {
        ShortFormMcqAttempt {
            mcq_id,
            selected_option: "A".into(),
            is_correct,
        }
    }

    #[test]
    fn short_form_repeated_answer_rejected() {
        let mut input = save_short(vec![], vec![100]);
        input.mcq_attempts = vec![answer(100, true), answer(100, true), answer(100, true)];
        let err = normalize_short_form_progress(&input, &content()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("more than once"));
    }

    #[test]
    fn short_form_answer_outside_attempted_set_rejected() {
        let mut input = save_short(vec![], vec![100]);
        input.mcq_attempts = vec![answer(100, true), answer(101, true)];
        let err = normalize_short_form_progress(&input, &content()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("101"));
    }

    #[test]
    fn short_form_empty_sequence_is_not_watched() {
        let mut empty = content();
        empty.sequence.clear();
        let out = normalize_short_form_progress(&save_short(vec![], vec![]), &empty).unwrap();
        assert!(!out.is_watched);
        assert_eq!(out.percentage, 0.0);
    }
}
