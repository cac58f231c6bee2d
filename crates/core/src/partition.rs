//! Splitting a subject's question bank into numbered variants.

use std::collections::BTreeMap;

use crate::model::{Question, Subject, SubjectId};
use crate::rng::{seeded_shuffle, string_to_seed};

/// A leftover block larger than this becomes its own, shorter variant;
/// otherwise it is folded into the last full variant.
pub const REMAINDER_SPLIT_THRESHOLD: usize = 20;

/// Appended to the subject id before hashing it into a partition seed.
pub const VARIANT_SEED_SUFFIX: &str = "_variants";

/// Variants available for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet {
    questions_by_variant: BTreeMap<u32, Vec<Question>>,
    total_questions: usize,
}

impl VariantSet {
    /// Builds the variant set for a subject, reading existing tags when the
    /// bank has them and partitioning otherwise.
    #[must_use]
    pub fn for_subject(subject: &Subject) -> Self {
        if subject.has_variants() {
            Self::from_tagged(subject.questions())
        } else {
            let per_variant = usize::try_from(subject.questions_per_variant()).unwrap_or(usize::MAX);
            Self::partition(subject.questions(), per_variant, subject.id())
        }
    }

    /// Groups questions by their `variant` tag, keeping source order inside
    /// each group. Untagged questions belong to no variant.
    #[must_use]
    pub fn from_tagged(questions: &[Question]) -> Self {
        let mut questions_by_variant: BTreeMap<u32, Vec<Question>> = BTreeMap::new();
        for question in questions {
            if let Some(variant) = question.variant {
                questions_by_variant
                    .entry(variant)
                    .or_default()
                    .push(question.clone());
            }
        }
        Self {
            questions_by_variant,
            total_questions: questions.len(),
        }
    }

    /// Deterministically partitions `questions` into blocks of `per_variant`.
    ///
    /// The order comes from a Mulberry32 shuffle seeded with
    /// `string_to_seed(subject_id + "_variants")`, so the same bank and id
    /// always yield identical variants. Each question gets
    /// `id = "<variant>-<position>"` and its `variant` tag.
    ///
    /// A `per_variant` of zero is treated as one.
    #[must_use]
    pub fn partition(questions: &[Question], per_variant: usize, subject_id: &SubjectId) -> Self {
        let per_variant = per_variant.max(1);
        let seed = string_to_seed(&format!("{subject_id}{VARIANT_SEED_SUFFIX}"));
        let shuffled = seeded_shuffle(questions, seed);

        let total = shuffled.len();
        let full_variants = total / per_variant;
        let remainder = total % per_variant;
        let split_remainder = remainder > REMAINDER_SPLIT_THRESHOLD;
        let num_variants = if split_remainder {
            full_variants + 1
        } else {
            full_variants.max(1)
        };

        let mut questions_by_variant = BTreeMap::new();
        let mut rest = shuffled.as_slice();
        for i in 0..num_variants {
            let is_last = i + 1 == num_variants;
            let take = if is_last { rest.len() } else { per_variant.min(rest.len()) };
            let (block, tail) = rest.split_at(take);
            rest = tail;

            let Ok(number) = u32::try_from(i + 1) else {
                break;
            };
            let block = block
                .iter()
                .enumerate()
                .map(|(pos, q)| Question {
                    id: format!("{number}-{}", pos + 1),
                    variant: Some(number),
                    ..q.clone()
                })
                .collect();
            questions_by_variant.insert(number, block);
        }

        Self {
            questions_by_variant,
            total_questions: total,
        }
    }

    /// Variant numbers in ascending order.
    #[must_use]
    pub fn variant_numbers(&self) -> Vec<u32> {
        self.questions_by_variant.keys().copied().collect()
    }

    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.questions_by_variant.len()
    }

    /// Questions of one variant; empty for unknown numbers.
    #[must_use]
    pub fn questions(&self, variant: u32) -> &[Question] {
        self.questions_by_variant
            .get(&variant)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Size of the whole bank, including questions outside any variant.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Question])> {
        self.questions_by_variant
            .iter()
            .map(|(n, qs)| (*n, qs.as_slice()))
    }
}
