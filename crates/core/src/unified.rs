//! Unified long-form + short-form report.
//!
//! The only report that reconciles both formats inside one chapter: a
//! chapter is completed when either a watched video or a fully covered
//! short-form says so, and the two verdicts are unioned per subject.
//! Overall figures are recomputed from unioned sets and raw sums, never
//! by averaging subject percentages.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::CatalogIndex;
use crate::completion::{
    CompletionPredicate, ContentItem, ItemCompletion, ShortFormItem, VideoItem,
};
use crate::progress::{ShortFormProgress, VideoProgress};
use crate::rollup::Totals;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedSubjectReport {
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
    pub total_watch_time: f64,
    pub total_time: f64,
    pub accuracy_percentage: u32,
    pub progress_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedOverall {
    pub total_chapters: u64,
    pub completed_chapters: u64,
    pub course_completion_percentage: u32,
    pub total_videos: u64,
    pub videos_watched: u64,
    pub total_mcqs: u64,
    pub mcqs_attempted: u64,
    pub correct_mcqs: u64,
    pub incorrect_mcqs: u64,
    pub accuracy_percentage: u32,
    pub total_watch_time: f64,
    pub total_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedReport {
    pub overall: UnifiedOverall,
    pub subjects: Vec<UnifiedSubjectReport>,
}

/// Build the unified report from one catalog index and both progress sets.
///
/// `total_mcqs` counts only short-form sequence MCQs; checkpoint MCQs
/// recorded on video progress still add to the attempted/correct
/// numerators.
pub fn unified_report(
    index: &CatalogIndex,
    videos: &[VideoProgress],
    short_forms: &[ShortFormProgress],
) -> UnifiedReport {
    let mut stats: HashMap<DbId, Totals> = index
        .subjects()
        .iter()
        .map(|s| {
            let mut totals = Totals::with_chapters(index.chapters_of(s.id));
            totals.mcqs_total = index
                .short_forms_of_subject(s.id)
                .iter()
                .map(|sf| sf.total_mcqs() as u64)
                .sum();
            (s.id, totals)
        })
        .collect();

    let mut items: Vec<(DbId, ContentItem<'_>)> =
        Vec::with_capacity(videos.len() + short_forms.len());
    items.extend(videos.iter().map(|record| {
        let item = ContentItem::Video(VideoItem {
            progress: Some(record),
        });
        (record.chapter_id, item)
    }));
    items.extend(short_forms.iter().filter_map(|record| {
        let content = index.short_form(record.short_form_id)?;
        let item = ContentItem::ShortForm(ShortFormItem {
            content,
            progress: Some(record),
        });
        Some((record.chapter_id, item))
    }));

    for (chapter_id, item) in &items {
        let Some(totals) = index
            .subject_of_chapter(*chapter_id)
            .and_then(|sid| stats.get_mut(&sid))
        else {
            continue;
        };
        let done = item.evaluate();
        // The MCQ denominator was fixed from the catalog above.
        totals.add(&ItemCompletion {
            mcqs_total: 0,
            ..done
        });
        if done.is_completed {
            totals.completed_chapters.insert(*chapter_id);
        }
    }

    let mut overall = Totals::default();
    let mut subjects = Vec::with_capacity(index.subjects().len());
    for subject in index.subjects() {
        let totals = stats.remove(&subject.id).unwrap_or_default();
        overall.absorb(&totals);
        subjects.push(UnifiedSubjectReport {
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
            total_watch_time: totals.watched_time,
            total_time: totals.total_time,
            accuracy_percentage: totals.accuracy_percentage(),
            progress_percentage: totals.progress_percentage(),
        });
    }

    UnifiedReport {
        overall: UnifiedOverall {
            total_chapters: overall.total_chapters(),
            completed_chapters: overall.completed(),
            course_completion_percentage: overall.progress_percentage(),
            total_videos: overall.units_total,
            videos_watched: overall.units_done,
            total_mcqs: overall.mcqs_total,
            mcqs_attempted: overall.mcqs_attempted,
            correct_mcqs: overall.correct,
            incorrect_mcqs: overall.incorrect,
            accuracy_percentage: overall.accuracy_percentage(),
            total_watch_time: overall.watched_time,
            total_time: overall.total_time,
        },
        subjects,
    }
}
