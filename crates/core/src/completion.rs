//! Completion predicate engine.
//!
//! Every content kind answers the same question through
//! [`CompletionPredicate`]: given the catalog shape of one item and the
//! user's (possibly absent) progress record, what did the user complete
//! and how much time and MCQ work does it contribute to a roll-up.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{MockTest, ShortFormContent};
use crate::mock_test::MockTestAttempt;
use crate::progress::{ShortFormProgress, VideoProgress};
use crate::types::DbId;

/// Per-item contribution to a roll-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ItemCompletion {
    pub is_completed: bool,
    pub watched_time: f64,
    pub total_time: f64,
    /// Videos, clips or mock tests the item consists of.
    pub units_total: u64,
    /// Units the user finished (watched videos, watched clips, attempted tests).
    pub units_done: u64,
    pub mcqs_total: u64,
    pub mcqs_attempted: u64,
    pub correct_count: u64,
    pub incorrect_count: u64,
}

/// One polymorphic interface over all content kinds.
pub trait CompletionPredicate {
    fn evaluate(&self) -> ItemCompletion;
}

// ---------------------------------------------------------------------------
// Coverage (short-form sequence)
// ---------------------------------------------------------------------------

/// Distinct coverage of one short-form sequence.
///
/// Only clip positions inside the sequence and MCQ ids it references are
/// counted, so `is_complete` holds exactly when every clip and every MCQ
/// is covered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coverage {
    pub clips_total: u64,
    pub clips_watched: u64,
    pub mcqs_total: u64,
    pub mcqs_attempted: u64,
    pub watched_duration: f64,
    pub total_duration: f64,
}

impl Coverage {
    pub fn of(content: &ShortFormContent, watched_clips: &[i32], attempted_mcqs: &[DbId]) -> Self {
        let durations = content.clip_durations();
        let watched: BTreeSet<usize> = watched_clips
            .iter()
            .filter_map(|&idx| usize::try_from(idx).ok())
            .filter(|&idx| idx < durations.len())
            .collect();

        let sequence_mcqs = content.mcq_ids();
        let attempted = attempted_mcqs
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|id| sequence_mcqs.contains(*id))
            .count();

        Self {
            clips_total: durations.len() as u64,
            clips_watched: watched.len() as u64,
            mcqs_total: sequence_mcqs.len() as u64,
            mcqs_attempted: attempted as u64,
            watched_duration: watched.iter().map(|&i| durations[i]).sum(),
            total_duration: durations.iter().sum(),
        }
    }

    /// Full coverage of a non-empty sequence. An empty sequence is never
    /// complete.
    pub fn is_complete(&self) -> bool {
        self.clips_total + self.mcqs_total > 0
            && self.clips_watched >= self.clips_total
            && self.mcqs_attempted >= self.mcqs_total
    }

    /// Share of covered steps, `0.0` for an empty sequence.
    pub fn percentage(&self) -> f64 {
        let total = self.clips_total + self.mcqs_total;
        if total == 0 {
            return 0.0;
        }
        (self.clips_watched + self.mcqs_attempted) as f64 / total as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A long-form video as seen by the predicate engine.
#[derive(Debug, Clone, Copy)]
pub struct VideoItem<'a> {
    pub progress: Option<&'a VideoProgress>,
}

impl CompletionPredicate for VideoItem<'_> {
    fn evaluate(&self) -> ItemCompletion {
        let Some(p) = self.progress else {
            return ItemCompletion::default();
        };
        let attempted = p.mcqs_attempted.max(0) as u64;
        let correct = (p.correct_mcqs.max(0) as u64).min(attempted);
        ItemCompletion {
            is_completed: p.is_watched,
            watched_time: p.resume_time.clamp(0.0, p.total_time.max(0.0)),
            total_time: p.total_time.max(0.0),
            units_total: 1,
            units_done: u64::from(p.is_watched),
            mcqs_total: 0,
            mcqs_attempted: attempted,
            correct_count: correct,
            incorrect_count: attempted - correct,
        }
    }
}

/// A short-form sequence with the user's record for it.
#[derive(Debug, Clone, Copy)]
pub struct ShortFormItem<'a> {
    pub content: &'a ShortFormContent,
    pub progress: Option<&'a ShortFormProgress>,
}

impl CompletionPredicate for ShortFormItem<'_> {
    fn evaluate(&self) -> ItemCompletion {
        let Some(p) = self.progress else {
            return ItemCompletion::default();
        };
        let cov = Coverage::of(self.content, &p.watched_clip_indexes, &p.attempted_mcq_ids);
        ItemCompletion {
            is_completed: cov.is_complete(),
            watched_time: cov.watched_duration,
            total_time: cov.total_duration,
            units_total: cov.clips_total,
            units_done: cov.clips_watched,
            mcqs_total: cov.mcqs_total,
            mcqs_attempted: cov.mcqs_attempted,
            correct_count: p.correct_count.max(0) as u64,
            incorrect_count: p.incorrect_count.max(0) as u64,
        }
    }
}

/// A mock test; attempted as soon as any attempt record exists.
#[derive(Debug, Clone, Copy)]
pub struct MockTestItem<'a> {
    pub mock_test: &'a MockTest,
    pub attempt: Option<&'a MockTestAttempt>,
}

impl CompletionPredicate for MockTestItem<'_> {
    fn evaluate(&self) -> ItemCompletion {
        let mcqs_total = self.mock_test.mcqs.len() as u64;
        let Some(a) = self.attempt else {
            return ItemCompletion {
                units_total: 1,
                mcqs_total,
                ..ItemCompletion::default()
            };
        };
        ItemCompletion {
            is_completed: true,
            units_total: 1,
            units_done: 1,
            mcqs_total,
            mcqs_attempted: a.total_mcqs_attempted.max(0) as u64,
            correct_count: a.correct_count.max(0) as u64,
            incorrect_count: a.incorrect_count.max(0) as u64,
            ..ItemCompletion::default()
        }
    }
}

/// Tagged union over the three content kinds.
#[derive(Debug, Clone, Copy)]
pub enum ContentItem<'a> {
    Video(VideoItem<'a>),
    ShortForm(ShortFormItem<'a>),
    MockTest(MockTestItem<'a>),
}

impl CompletionPredicate for ContentItem<'_> {
    fn evaluate(&self) -> ItemCompletion {
        match self {
            Self::Video(item) => item.evaluate(),
            Self::ShortForm(item) => item.evaluate(),
            Self::MockTest(item) => item.evaluate(),
        }
    }
}
