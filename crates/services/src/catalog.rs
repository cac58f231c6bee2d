use std::collections::HashSet;
use std::sync::OnceLock;

use quiz_core::model::{Question, Subject, SubjectId, WrongAnswerLog};
use quiz_core::partition::VariantSet;

use crate::error::BankError;

/// The loaded subjects plus their lazily built variant sets.
///
/// Each subject's `VariantSet` is computed on first use and kept for the
/// lifetime of the catalog.
#[derive(Debug)]
pub struct SubjectCatalog {
    subjects: Vec<Subject>,
    variants: Vec<OnceLock<VariantSet>>,
}

impl SubjectCatalog {
    /// # Errors
    ///
    /// Returns `BankError::DuplicateSubject` when two subjects share an id.
    pub fn new(subjects: Vec<Subject>) -> Result<Self, BankError> {
        let mut seen = HashSet::new();
        for subject in &subjects {
            if !seen.insert(subject.id()) {
                return Err(BankError::DuplicateSubject(subject.id().clone()));
            }
        }
        let variants = subjects.iter().map(|_| OnceLock::new()).collect();
        Ok(Self { subjects, variants })
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn ids(&self) -> impl Iterator<Item = &SubjectId> {
        self.subjects.iter().map(Subject::id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &SubjectId) -> Option<&Subject> {
        self.position(id).map(|i| &self.subjects[i])
    }

    /// Variant set for `id`, built on first request.
    #[must_use]
    pub fn variants(&self, id: &SubjectId) -> Option<&VariantSet> {
        let index = self.position(id)?;
        let subject = &self.subjects[index];
        Some(self.variants[index].get_or_init(|| {
            let set = VariantSet::for_subject(subject);
            log::debug!(
                "built {} variants for {} from {} questions",
                set.variant_count(),
                subject.id(),
                set.total_questions()
            );
            set
        }))
    }

    /// Question count shown for a variant: its size, capped at the subject's
    /// questions-per-variant.
    #[must_use]
    pub fn variant_question_count(&self, id: &SubjectId, variant: u32) -> usize {
        let (Some(subject), Some(set)) = (self.get(id), self.variants(id)) else {
            return 0;
        };
        let cap = usize::try_from(subject.questions_per_variant()).unwrap_or(usize::MAX);
        set.questions(variant).len().min(cap)
    }

    /// Subject questions whose text is in `wrong`, in bank order.
    #[must_use]
    pub fn error_review_pool(&self, id: &SubjectId, wrong: &WrongAnswerLog) -> Vec<Question> {
        if wrong.is_empty() {
            return Vec::new();
        }
        self.get(id)
            .map(|subject| {
                subject
                    .questions()
                    .iter()
                    .filter(|q| wrong.contains(&q.question))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn position(&self, id: &SubjectId) -> Option<usize> {
        self.subjects.iter().position(|s| s.id() == id)
    }
}
