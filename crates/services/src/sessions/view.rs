use chrono::{DateTime, Utc};

use quiz_core::model::{
    CompletedVariants, CompletionRecord, Question, Subject, SubjectId, SubjectStats, VariantKey,
    percentage,
};
use quiz_core::partition::VariantSet;
use quiz_core::time::elapsed_ms;

use super::progress::SessionProgress;
use super::service::{AnswerOutcome, QuizSession, SessionResult};

/// Presentation-agnostic grading of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTier {
    Perfect,
    Excellent,
    Good,
    NeedsPractice,
}

impl ResultTier {
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            100.. => ResultTier::Perfect,
            80..=99 => ResultTier::Excellent,
            60..=79 => ResultTier::Good,
            _ => ResultTier::NeedsPractice,
        }
    }
}

/// Read-only state of the active session.
///
/// Timestamps and counts only; formatting is left to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub subject_id: SubjectId,
    pub variant_key: VariantKey,
    pub question: Option<Question>,
    pub index: usize,
    pub total: usize,
    pub score: u32,
    pub answer: Option<AnswerOutcome>,
    pub progress: SessionProgress,
    pub elapsed_ms: u64,
    pub result: Option<SessionResult>,
}

impl QuizSnapshot {
    #[must_use]
    pub fn from_session(session: &QuizSession, now: DateTime<Utc>) -> Self {
        let elapsed_ms = session
            .result()
            .map_or_else(|| elapsed_ms(session.started_at(), now), |r| r.elapsed_ms);
        Self {
            subject_id: session.subject_id().clone(),
            variant_key: session.variant_key(),
            question: session.current_question().cloned(),
            index: session.current_index(),
            total: session.total_questions(),
            score: session.score(),
            answer: session.current_answer().cloned(),
            progress: session.progress(),
            elapsed_ms,
            result: session.result().cloned(),
        }
    }
}

/// Per-subject totals for the subject list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgressSummary {
    pub subject_id: SubjectId,
    pub name: String,
    pub short_name: String,
    pub color_theme: String,
    pub total_variants: usize,
    pub completed_variants: usize,
    pub completion_percent: u8,
    pub average_percent: u8,
    pub total_questions: usize,
    pub wrong_answers: usize,
    pub stats: SubjectStats,
}

impl SubjectProgressSummary {
    #[must_use]
    pub fn new(
        subject: &Subject,
        variants: &VariantSet,
        completed: &CompletedVariants,
        stats: SubjectStats,
        wrong_answers: usize,
    ) -> Self {
        let total_variants = variants.variant_count();
        let completed_variants = completed.completed_variant_count();
        let completion_percent = percentage(
            u32::try_from(completed_variants).unwrap_or(u32::MAX),
            u32::try_from(total_variants).unwrap_or(u32::MAX),
        );
        Self {
            subject_id: subject.id().clone(),
            name: subject.name().to_string(),
            short_name: subject.short_name().to_string(),
            color_theme: subject.color_theme().to_string(),
            total_variants,
            completed_variants,
            completion_percent,
            average_percent: stats.average_percent(),
            total_questions: variants.total_questions(),
            wrong_answers,
            stats,
        }
    }
}

/// One playable entry of the variant menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEntry {
    pub key: VariantKey,
    pub question_count: usize,
    pub best: Option<CompletionRecord>,
}

/// Everything the variant selection screen shows for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMenu {
    pub summary: SubjectProgressSummary,
    /// Numbered variants in ascending order, then the marathon.
    pub entries: Vec<VariantEntry>,
    /// Questions available for error review.
    pub error_review_count: usize,
}

impl VariantMenu {
    #[must_use]
    pub fn entry(&self, key: VariantKey) -> Option<&VariantEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    #[must_use]
    pub fn can_review_errors(&self) -> bool {
        self.error_review_count > 0
    }
}
