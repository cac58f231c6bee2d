use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{CompletionRecord, OptionLetter, Question, SubjectId, VariantKey, percentage};
use quiz_core::time::elapsed_ms;

use super::progress::SessionProgress;
use super::view::ResultTier;

//
// ─── ANSWERS AND RESULTS ───────────────────────────────────────────────────────
//

/// What happened when the current question was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub chosen: OptionLetter,
    pub correct_answer: OptionLetter,
    pub is_correct: bool,
    pub question: String,
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub subject_id: SubjectId,
    pub variant_key: VariantKey,
    pub total_questions: u32,
    pub final_score: u32,
    pub percentage: u8,
    pub wrong_questions: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl SessionResult {
    #[must_use]
    pub fn is_error_review(&self) -> bool {
        self.variant_key.is_error_review()
    }

    #[must_use]
    pub fn tier(&self) -> ResultTier {
        ResultTier::from_percentage(self.percentage)
    }

    /// Best-score candidate for this result. Error reviews produce none.
    #[must_use]
    pub fn completion_record(&self) -> Option<CompletionRecord> {
        if self.is_error_review() {
            return None;
        }
        Some(CompletionRecord::new(
            self.final_score,
            self.total_questions,
            self.completed_at,
        ))
    }
}

/// Result of asking the session to move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The next question is now current.
    Moved,
    /// The last question was left; the session is finished.
    Completed(SessionResult),
    /// Nothing to do: no answer yet, no questions, or already finished.
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt over an already shuffled question list.
///
/// Steps through the questions in order. A question may be deferred with
/// [`QuizSession::skip`] until it is answered; after an answer the caller
/// decides when to [`QuizSession::advance`].
pub struct QuizSession {
    subject_id: SubjectId,
    variant_key: VariantKey,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    current_answer: Option<AnswerOutcome>,
    wrong_this_session: Vec<String>,
    started_at: DateTime<Utc>,
    result: Option<SessionResult>,
}

impl QuizSession {
    /// Start a session. An empty question list is accepted and can never
    /// complete.
    #[must_use]
    pub fn new(
        subject_id: SubjectId,
        variant_key: VariantKey,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id,
            variant_key,
            questions,
            current: 0,
            score: 0,
            current_answer: None,
            wrong_this_session: Vec::new(),
            started_at,
            result: None,
        }
    }

    #[must_use]
    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    #[must_use]
    pub fn variant_key(&self) -> VariantKey {
        self.variant_key
    }

    #[must_use]
    pub fn is_error_review(&self) -> bool {
        self.variant_key.is_error_review()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Correct answers counted so far. The final score is derived from the
    /// wrong answers instead, see [`SessionResult::final_score`].
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.result.as_ref().map(|r| r.completed_at)
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn wrong_this_session(&self) -> &[String] {
        &self.wrong_this_session
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerOutcome> {
        self.current_answer.as_ref()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.current_answer.is_some()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.total_questions();
        let answered = if self.is_complete() {
            total
        } else {
            self.current + usize::from(self.is_answered())
        };
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.is_complete(),
        }
    }

    /// Answer the current question with the option at `index`.
    pub fn answer_option(&mut self, index: usize) -> Option<AnswerOutcome> {
        let letter = self.current_question()?.option_at(index)?.letter;
        self.answer(letter)
    }

    /// Record `chosen` as the answer to the current question.
    ///
    /// Returns `None` if the question was already answered or there is no
    /// current question.
    pub fn answer(&mut self, chosen: OptionLetter) -> Option<AnswerOutcome> {
        if self.is_answered() {
            return None;
        }
        let question = self.current_question()?;
        let outcome = AnswerOutcome {
            chosen,
            correct_answer: question.correct_answer,
            is_correct: question.is_correct(chosen),
            question: question.question.clone(),
        };

        if outcome.is_correct {
            self.score += 1;
        } else {
            self.wrong_this_session.push(outcome.question.clone());
        }
        self.current_answer = Some(outcome.clone());
        Some(outcome)
    }

    /// Defer the current question to the end of the list.
    ///
    /// Returns false if it was already answered or there is none.
    pub fn skip(&mut self) -> bool {
        if self.is_answered() || self.current_question().is_none() {
            return false;
        }
        let question = self.questions.remove(self.current);
        self.questions.push(question);
        true
    }

    /// Move past the answered current question, finishing the session after
    /// the last one.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Advance {
        if self.is_complete() || !self.is_answered() {
            return Advance::Ignored;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.current_answer = None;
            return Advance::Moved;
        }

        self.current_answer = None;
        let result = self.finish(now);
        self.result = Some(result.clone());
        Advance::Completed(result)
    }

    fn finish(&self, completed_at: DateTime<Utc>) -> SessionResult {
        let total_questions = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let wrong = u32::try_from(self.wrong_this_session.len()).unwrap_or(u32::MAX);
        let final_score = total_questions.saturating_sub(wrong);
        SessionResult {
            subject_id: self.subject_id.clone(),
            variant_key: self.variant_key,
            total_questions,
            final_score,
            percentage: percentage(final_score, total_questions),
            wrong_questions: self.wrong_this_session.clone(),
            started_at: self.started_at,
            completed_at,
            elapsed_ms: elapsed_ms(self.started_at, completed_at),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("subject_id", &self.subject_id)
            .field("variant_key", &self.variant_key)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("wrong_len", &self.wrong_this_session.len())
            .field("started_at", &self.started_at)
            .field("completed", &self.is_complete())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
