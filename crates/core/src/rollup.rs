//! Chapter / subject / course roll-ups, one per content kind.
//!
//! All builders take pre-fetched catalog data and progress records and
//! are pure. Item contributions come from the completion predicates and
//! are folded chapter -> subject -> overall. Overall chapter counts use
//! set union, so a chapter touched by several items is counted once.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::catalog::{CatalogIndex, MockTest, ShortFormContent, Subject};
use crate::completion::{
    CompletionPredicate, Coverage, ItemCompletion, MockTestItem, ShortFormItem, VideoItem,
};
use crate::mock_test::MockTestAttempt;
use crate::percent::{ratio_percentage, round_half_up};
use crate::progress::{ShortFormProgress, VideoProgress};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Shared accumulator
// ---------------------------------------------------------------------------

/// Running totals for one node of the hierarchy.
#[derive(Debug, Clone, Default)]
pub(crate) struct Totals {
    pub chapters: BTreeSet<DbId>,
    pub completed_chapters: BTreeSet<DbId>,
    pub watched_time: f64,
    pub total_time: f64,
    pub units_total: u64,
    pub units_done: u64,
    pub mcqs_total: u64,
    pub mcqs_attempted: u64,
    pub correct: u64,
    pub incorrect: u64,
}

impl Totals {
    pub fn with_chapters(chapters: BTreeSet<DbId>) -> Self {
        Self {
            chapters,
            ..Self::default()
        }
    }

    /// Fold one item's contribution. Does not touch chapter sets.
    pub fn add(&mut self, item: &ItemCompletion) {
        self.watched_time += item.watched_time;
        self.total_time += item.total_time;
        self.units_total += item.units_total;
        self.units_done += item.units_done;
        self.mcqs_total += item.mcqs_total;
        self.mcqs_attempted += item.mcqs_attempted;
        self.correct += item.correct_count;
        self.incorrect += item.incorrect_count;
    }

    /// Merge a child node, unioning chapter sets.
    pub fn absorb(&mut self, other: &Totals) {
        self.chapters.extend(other.chapters.iter().copied());
        self.completed_chapters
            .extend(other.completed_chapters.iter().copied());
        self.watched_time += other.watched_time;
        self.total_time += other.total_time;
        self.units_total += other.units_total;
        self.units_done += other.units_done;
        self.mcqs_total += other.mcqs_total;
        self.mcqs_attempted += other.mcqs_attempted;
        self.correct += other.correct;
        self.incorrect += other.incorrect;
    }

    pub fn total_chapters(&self) -> u64 {
        self.chapters.len() as u64
    }

    pub fn completed(&self) -> u64 {
        self.completed_chapters.len() as u64
    }

    pub fn progress_percentage(&self) -> u32 {
        ratio_percentage(self.completed(), self.total_chapters())
    }

    pub fn accuracy_percentage(&self) -> u32 {
        ratio_percentage(self.correct, self.mcqs_attempted)
    }
}

/// Single-value answer for the narrow overall-progress lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressPercentage {
    pub progress_percentage: u32,
}

// ---------------------------------------------------------------------------
// Long-form video report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSubjectReport {
    pub subject_id: DbId,
    pub subject_name: String,
    pub total_watched_time: f64,
    pub total_time: f64,
    pub total_chapters: u64,
    pub completed_chapters: u64,
    pub progress_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoOverall {
    pub total_watched_time: f64,
    pub total_time: f64,
    pub total_chapters: u64,
    pub completed_chapters: u64,
    pub progress_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoReport {
    pub overall: VideoOverall,
    pub subjects: Vec<VideoSubjectReport>,
}

/// Fold video progress into per-subject totals. A chapter counts as
/// completed when at least one of its videos is watched.
fn fold_videos(index: &CatalogIndex, progress: &[VideoProgress]) -> HashMap<DbId, Totals> {
    let mut by_subject: HashMap<DbId, Totals> = index
        .subjects()
        .iter()
        .map(|s| (s.id, Totals::with_chapters(index.chapters_of(s.id))))
        .collect();

    for record in progress {
        let Some(subject_id) = index.subject_of_chapter(record.chapter_id) else {
            continue;
        };
        let Some(totals) = by_subject.get_mut(&subject_id) else {
            continue;
        };
        let item = VideoItem {
            progress: Some(record),
        }
        .evaluate();
        totals.add(&item);
        if item.is_completed {
            totals.completed_chapters.insert(record.chapter_id);
        }
    }
    by_subject
}

pub fn video_report(index: &CatalogIndex, progress: &[VideoProgress]) -> VideoReport {
    let by_subject = fold_videos(index, progress);
    let mut overall = Totals::default();
    let mut subjects = Vec::with_capacity(index.subjects().len());

    for subject in index.subjects() {
        let totals = by_subject.get(&subject.id).cloned().unwrap_or_default();
        overall.absorb(&totals);
        subjects.push(VideoSubjectReport {
            subject_id: subject.id,
            subject_name: subject.name.clone(),
            total_watched_time: totals.watched_time,
            total_time: totals.total_time,
            total_chapters: totals.total_chapters(),
            completed_chapters: totals.completed(),
            progress_percentage: totals.progress_percentage(),
        });
    }

    VideoReport {
        overall: VideoOverall {
            total_watched_time: overall.watched_time,
            total_time: overall.total_time,
            total_chapters: overall.total_chapters(),
            completed_chapters: overall.completed(),
            progress_percentage: overall.progress_percentage(),
        },
        subjects,
    }
}

// ---------------------------------------------------------------------------
// Subject overall progress (class list / single subject)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProgress {
    pub subject_id: DbId,
    pub subject_name: String,
    pub total_chapters: u64,
    pub completed_chapters: u64,
    /// Completed chapters over total chapters.
    pub progress_percentage: u32,
    /// Mean over chapters of the mean video `progress_percent`; chapters
    /// without records count as 0.
    pub average_watch_percentage: u32,
}

pub fn subject_progress(index: &CatalogIndex, progress: &[VideoProgress]) -> Vec<SubjectProgress> {
    let by_subject = fold_videos(index, progress);

    let mut chapter_percents: HashMap<DbId, Vec<f64>> = HashMap::new();
    for record in progress {
        chapter_percents
            .entry(record.chapter_id)
            .or_default()
            .push(record.progress_percent);
    }

    index
        .subjects()
        .iter()
        .map(|subject| {
            let totals = by_subject.get(&subject.id).cloned().unwrap_or_default();
            let chapters = index.chapters_of(subject.id);
            let average = if chapters.is_empty() {
                0.0
            } else {
                let sum: f64 = chapters
                    .iter()
                    .map(|ch| match chapter_percents.get(ch) {
                        Some(values) if !values.is_empty() => {
                            values.iter().sum::<f64>() / values.len() as f64
                        }
                        _ => 0.0,
                    })
                    .sum();
                sum / chapters.len() as f64
            };
            SubjectProgress {
                subject_id: subject.id,
                subject_name: subject.name.clone(),
                total_chapters: totals.total_chapters(),
                completed_chapters: totals.completed(),
                progress_percentage: totals.progress_percentage(),
                average_watch_percentage: round_half_up(average),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Short-form report (chapter granularity)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortFormSubjectReport {
    pub subject_id: DbId,
    pub subject_name: String,
    pub total_chapters: u64,
    pub completed_chapters: u64,
    pub total_videos: u64,
    pub videos_watched: u64,
    pub total_mcqs: u64,
    pub mcqs_attempted: u64,
    pub correct_mcqs: u64,
    pub incorrect_mcqs: u64,
    pub accuracy_percentage: u32,
    pub progress_percentage: u32,
    pub content_coverage_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortFormOverall {
    pub total_chapters: u64,
    pub completed_chapters: u64,
    pub total_videos: u64,
    pub videos_watched: u64,
    pub total_mcqs: u64,
    pub mcqs_attempted: u64,
    pub correct_mcqs: u64,
    pub incorrect_mcqs: u64,
    pub accuracy_percentage: u32,
    pub progress_percentage: u32,
    pub content_coverage_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortFormReport {
    pub overall: ShortFormOverall,
    pub subjects: Vec<ShortFormSubjectReport>,
}

fn coverage_percentage(t: &Totals) -> u32 {
    ratio_percentage(t.units_done + t.mcqs_attempted, t.units_total + t.mcqs_total)
}

/// Short-form roll-up where a chapter is completed only when the user's
/// records cover every clip and MCQ of every short-form in that chapter.
pub fn short_form_report(index: &CatalogIndex, progress: &[ShortFormProgress]) -> ShortFormReport {
    // Chapter-level user coverage, built from the per-item evaluations.
    let mut chapter_done: BTreeMap<DbId, Totals> = BTreeMap::new();
    for record in progress {
        let Some(content) = index.short_form(record.short_form_id) else {
            continue;
        };
        if content.chapter_id != record.chapter_id {
            continue;
        }
        let item = ShortFormItem {
            content,
            progress: Some(record),
        }
        .evaluate();
        chapter_done.entry(record.chapter_id).or_default().add(&item);
    }

    let mut overall = Totals::default();
    let mut subjects = Vec::with_capacity(index.subjects().len());

    for subject in index.subjects() {
        let mut totals = Totals::with_chapters(index.chapters_of(subject.id));

        for sf in index.short_forms_of_subject(subject.id) {
            totals.units_total += sf.total_clips() as u64;
            totals.mcqs_total += sf.total_mcqs() as u64;
        }

        for chapter_id in totals.chapters.clone() {
            let Some(done) = chapter_done.get(&chapter_id) else {
                continue;
            };
            let (clips, mcqs) = index
                .short_forms_in(chapter_id)
                .iter()
                .fold((0u64, 0u64), |(c, m), sf| {
                    (c + sf.total_clips() as u64, m + sf.total_mcqs() as u64)
                });
            let complete = clips + mcqs > 0 && done.units_done >= clips && done.mcqs_attempted >= mcqs;
            if complete {
                totals.completed_chapters.insert(chapter_id);
            }
            totals.units_done += done.units_done;
            totals.mcqs_attempted += done.mcqs_attempted;
            totals.correct += done.correct;
            totals.incorrect += done.incorrect;
        }

        overall.absorb(&totals);
        subjects.push(ShortFormSubjectReport {
            subject_id: subject.id,
            subject_name: subject.name.clone(),
            total_chapters: totals.total_chapters(),
            completed_chapters: totals.completed(),
            total_videos: totals.units_total,
            videos_watched: totals.units_done,
            total_mcqs: totals.mcqs_total,
            mcqs_attempted: totals.mcqs_attempted,
            correct_mcqs: totals.correct,
            incorrect_mcqs: totals.incorrect,
            accuracy_percentage: totals.accuracy_percentage(),
            progress_percentage: totals.progress_percentage(),
            content_coverage_percentage: coverage_percentage(&totals),
        });
    }

    ShortFormReport {
        overall: ShortFormOverall {
            total_chapters: overall.total_chapters(),
            completed_chapters: overall.completed(),
            total_videos: overall.units_total,
            videos_watched: overall.units_done,
            total_mcqs: overall.mcqs_total,
            mcqs_attempted: overall.mcqs_attempted,
            correct_mcqs: overall.correct,
            incorrect_mcqs: overall.incorrect,
            accuracy_percentage: overall.accuracy_percentage(),
            progress_percentage: overall.progress_percentage(),
            content_coverage_percentage: coverage_percentage(&overall),
        },
        subjects,
    }
}

/// Content coverage across every short-form of one chapter.
pub fn short_form_chapter_progress(
    short_forms: &[ShortFormContent],
    progress: &[ShortFormProgress],
) -> ProgressPercentage {
    let mut totals = Totals::default();
    for sf in short_forms {
        totals.units_total += sf.total_clips() as u64;
        totals.mcqs_total += sf.total_mcqs() as u64;
        if let Some(record) = progress.iter().find(|p| p.short_form_id == sf.id) {
            let cov = Coverage::of(sf, &record.watched_clip_indexes, &record.attempted_mcq_ids);
            totals.units_done += cov.clips_watched;
            totals.mcqs_attempted += cov.mcqs_attempted;
        }
    }
    ProgressPercentage {
        progress_percentage: coverage_percentage(&totals),
    }
}

// ---------------------------------------------------------------------------
// Mock-test report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockTestSubjectReport {
    pub subject_id: DbId,
    pub subject_name: String,
    pub total_mock_tests: u64,
    pub attempted_mock_tests: u64,
    pub total_mcqs: u64,
    pub mcqs_attempted: u64,
    pub correct_mcqs: u64,
    pub accuracy: u32,
    pub progress_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockTestOverall {
    pub total_mock_tests: u64,
    pub attempted_mock_tests: u64,
    pub total_mcqs: u64,
    pub mcqs_attempted: u64,
    pub correct_mcqs: u64,
    pub accuracy: u32,
    pub progress_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockTestReport {
    pub overall: MockTestOverall,
    pub subjects: Vec<MockTestSubjectReport>,
}

/// Fold the mock tests of one subject. Progress is MCQ based: attempted
/// MCQs over MCQs available across the subject's tests.
///
/// Denominators come from the catalog. Numerators come from every attempt
/// the user has in the subject, including attempts whose mock test has
/// since left the catalog.
fn fold_mock_tests(subject_id: DbId, tests: &[MockTest], attempts: &[MockTestAttempt]) -> Totals {
    let mut totals = Totals::default();
    for test in tests.iter().filter(|t| t.subject_id == subject_id) {
        totals.add(
            &MockTestItem {
                mock_test: test,
                attempt: None,
            }
            .evaluate(),
        );
    }

    let mut attempted = BTreeSet::new();
    for attempt in attempts.iter().filter(|a| a.subject_id == subject_id) {
        attempted.insert(attempt.mock_test_id);
        totals.mcqs_attempted += attempt.total_mcqs_attempted.max(0) as u64;
        totals.correct += attempt.correct_count.max(0) as u64;
        totals.incorrect += attempt.incorrect_count.max(0) as u64;
    }
    totals.units_done = attempted.len() as u64;
    totals
}

pub fn mock_test_report(
    subjects: &[Subject],
    tests: &[MockTest],
    attempts: &[MockTestAttempt],
) -> MockTestReport {
    let mut overall = Totals::default();
    let mut rows = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let totals = fold_mock_tests(subject.id, tests, attempts);
        overall.absorb(&totals);
        rows.push(MockTestSubjectReport {
            subject_id: subject.id,
            subject_name: subject.name.clone(),
            total_mock_tests: totals.units_total,
            attempted_mock_tests: totals.units_done,
            total_mcqs: totals.mcqs_total,
            mcqs_attempted: totals.mcqs_attempted,
            correct_mcqs: totals.correct,
            accuracy: totals.accuracy_percentage(),
            progress_percentage: ratio_percentage(totals.mcqs_attempted, totals.mcqs_total),
        });
    }

    MockTestReport {
        overall: MockTestOverall {
            total_mock_tests: overall.units_total,
            attempted_mock_tests: overall.units_done,
            total_mcqs: overall.mcqs_total,
            mcqs_attempted: overall.mcqs_attempted,
            correct_mcqs: overall.correct,
            accuracy: overall.accuracy_percentage(),
            progress_percentage: ratio_percentage(overall.mcqs_attempted, overall.mcqs_total),
        },
        subjects: rows,
    }
}

/// Attempted MCQs over available MCQs for one subject's mock tests.
pub fn mock_test_progress(
    subject_id: DbId,
    tests: &[MockTest],
    attempts: &[MockTestAttempt],
) -> ProgressPercentage {
    let totals = fold_mock_tests(subject_id, tests, attempts);
    ProgressPercentage {
        progress_percentage: ratio_percentage(totals.mcqs_attempted, totals.mcqs_total),
    }
}
