//! Read-only catalog shapes and the per-request [`CatalogIndex`].
//!
//! The catalog hierarchy is Class -> Subject -> Chapter -> content item.
//! It is owned by an external system; this crate only consumes it. Every
//! aggregation call builds one `CatalogIndex` from the subtree it fetched
//! and reuses it for all lookups instead of rebuilding ad-hoc maps.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Catalog nodes
// ---------------------------------------------------------------------------

/// A student profile; only the class link matters for progress reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub user_id: DbId,
    pub class_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: DbId,
    pub class_id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: DbId,
    pub subject_id: DbId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Content items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongFormVideo {
    pub id: DbId,
    pub chapter_id: DbId,
    pub total_time_secs: f64,
}

/// One step of a short-form sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SequenceStep {
    Clip { duration_secs: f64 },
    Mcq { mcq_id: DbId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortFormContent {
    pub id: DbId,
    pub chapter_id: DbId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    /// Display order only. Completion is computed by coverage.
    pub sequence: Vec<SequenceStep>,
}

impl ShortFormContent {
    /// Durations of the clip steps, indexed by clip position.
    pub fn clip_durations(&self) -> Vec<f64> {
        self.sequence
            .iter()
            .filter_map(|step| match step {
                SequenceStep::Clip { duration_secs } => Some(*duration_secs),
                SequenceStep::Mcq { .. } => None,
            })
            .collect()
    }

    pub fn total_clips(&self) -> usize {
        self.sequence
            .iter()
            .filter(|s| matches!(s, SequenceStep::Clip { .. }))
            .count()
    }

    /// Distinct MCQ ids referenced by the sequence.
    pub fn mcq_ids(&self) -> BTreeSet<DbId> {
        self.sequence
            .iter()
            .filter_map(|step| match step {
                SequenceStep::Mcq { mcq_id } => Some(*mcq_id),
                SequenceStep::Clip { .. } => None,
            })
            .collect()
    }

    pub fn total_mcqs(&self) -> usize {
        self.mcq_ids().len()
    }
}

/// An MCQ slot in a mock test with its resolved correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockTestMcq {
    pub mcq_id: DbId,
    pub correct_option: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockTest {
    pub id: DbId,
    pub subject_id: DbId,
    pub title: String,
    pub mcqs: Vec<MockTestMcq>,
}

impl MockTest {
    pub fn correct_option(&self, mcq_id: DbId) -> Option<&str> {
        self.mcqs
            .iter()
            .find(|m| m.mcq_id == mcq_id)
            .map(|m| m.correct_option.as_str())
    }
}

// ---------------------------------------------------------------------------
// CatalogIndex
// ---------------------------------------------------------------------------

/// Lookup tables over one fetched catalog subtree.
///
/// Subjects keep the order in which they were supplied so reports list
/// them the same way the catalog does.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    subjects: Vec<Subject>,
    chapter_subject: HashMap<DbId, DbId>,
    subject_chapters: HashMap<DbId, BTreeSet<DbId>>,
    short_forms: HashMap<DbId, ShortFormContent>,
    chapter_short_forms: BTreeMap<DbId, Vec<DbId>>,
}

impl CatalogIndex {
    /// Build the index. Chapters whose subject is not in `subjects` and
    /// short-forms whose chapter is not indexed are ignored.
    pub fn build(
        subjects: Vec<Subject>,
        chapters: &[Chapter],
        short_forms: Vec<ShortFormContent>,
    ) -> Self {
        let mut subject_chapters: HashMap<DbId, BTreeSet<DbId>> =
            subjects.iter().map(|s| (s.id, BTreeSet::new())).collect();
        let mut chapter_subject = HashMap::new();

        for chapter in chapters {
            if let Some(set) = subject_chapters.get_mut(&chapter.subject_id) {
                set.insert(chapter.id);
                chapter_subject.insert(chapter.id, chapter.subject_id);
            }
        }

        let mut chapter_short_forms: BTreeMap<DbId, Vec<DbId>> = BTreeMap::new();
        let mut by_id = HashMap::new();
        for sf in short_forms {
            if chapter_subject.contains_key(&sf.chapter_id) {
                chapter_short_forms
                    .entry(sf.chapter_id)
                    .or_default()
                    .push(sf.id);
                by_id.insert(sf.id, sf);
            }
        }

        Self {
            subjects,
            chapter_subject,
            subject_chapters,
            short_forms: by_id,
            chapter_short_forms,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject_of_chapter(&self, chapter_id: DbId) -> Option<DbId> {
        self.chapter_subject.get(&chapter_id).copied()
    }

    /// Chapter ids of a subject; empty for unknown subjects.
    pub fn chapters_of(&self, subject_id: DbId) -> BTreeSet<DbId> {
        self.subject_chapters
            .get(&subject_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn short_form(&self, id: DbId) -> Option<&ShortFormContent> {
        self.short_forms.get(&id)
    }

    /// Short-forms attached to a chapter, in catalog order.
    pub fn short_forms_in(&self, chapter_id: DbId) -> Vec<&ShortFormContent> {
        self.chapter_short_forms
            .get(&chapter_id)
            .map(|ids| ids.iter().filter_map(|id| self.short_forms.get(id)).collect())
            .unwrap_or_default()
    }

    /// Short-forms whose chapter belongs to `subject_id`.
    pub fn short_forms_of_subject(&self, subject_id: DbId) -> Vec<&ShortFormContent> {
        self.chapters_of(subject_id)
            .into_iter()
            .flat_map(|ch| self.short_forms_in(ch))
            .collect()
    }
}
