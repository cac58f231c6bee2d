use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use quiz_core::Clock;
use quiz_core::model::{Question, SubjectId, VariantKey, VariantSelector};

use super::service::{Advance, AnswerOutcome, QuizSession, SessionResult};
use super::shuffle::prepare_questions;
use super::timer::{Generation, TimerToken};
use super::view::{QuizSnapshot, SubjectProgressSummary, VariantEntry, VariantMenu};
use crate::catalog::SubjectCatalog;
use crate::error::SessionError;
use crate::progress::ProgressStore;

/// Which screen the host should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    SelectingSubject,
    SelectingVariant(SubjectId),
    InProgress,
    Completed,
}

/// Result of answering through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub outcome: AnswerOutcome,
    /// Fire with [`QuizController::fire_auto_advance`] after the delay.
    pub advance_token: TimerToken,
}

/// Owns the application state: selected subject, the active session, and the
/// progress mirror.
///
/// Every user or timer action is one method call. Hosts render from the read
/// accessors after each call.
pub struct QuizController {
    clock: Clock,
    catalog: Arc<SubjectCatalog>,
    progress: ProgressStore,
    rng: StdRng,
    selected: Option<SubjectId>,
    session: Option<QuizSession>,
    generation: Generation,
}

impl QuizController {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<SubjectCatalog>, progress: ProgressStore) -> Self {
        Self {
            clock,
            catalog,
            progress,
            rng: StdRng::from_os_rng(),
            selected: None,
            session: None,
            generation: Generation::default(),
        }
    }

    /// Replace the session shuffle source, e.g. with a seeded one in tests.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> ControllerState {
        match (&self.session, &self.selected) {
            (Some(session), _) if session.is_complete() => ControllerState::Completed,
            (Some(_), _) => ControllerState::InProgress,
            (None, Some(id)) => ControllerState::SelectingVariant(id.clone()),
            (None, None) => ControllerState::SelectingSubject,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access to the clock, for advancing a fixed clock in tests.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn selected_subject(&self) -> Option<&SubjectId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<QuizSnapshot> {
        self.session
            .as_ref()
            .map(|s| QuizSnapshot::from_session(s, self.clock.now()))
    }

    /// Progress summary of every subject, in catalog order.
    #[must_use]
    pub fn subject_summaries(&self) -> Vec<SubjectProgressSummary> {
        self.catalog
            .ids()
            .filter_map(|id| self.subject_summary(id))
            .collect()
    }

    #[must_use]
    pub fn subject_summary(&self, id: &SubjectId) -> Option<SubjectProgressSummary> {
        let subject = self.catalog.get(id)?;
        let variants = self.catalog.variants(id)?;
        Some(SubjectProgressSummary::new(
            subject,
            variants,
            &self.progress.completed_variants(id),
            self.progress.stats(id),
            self.progress.wrong_answer_count(id),
        ))
    }

    /// Variant menu for the selected subject.
    #[must_use]
    pub fn variant_menu(&self) -> Option<VariantMenu> {
        let id = self.selected.as_ref()?;
        let summary = self.subject_summary(id)?;
        let variants = self.catalog.variants(id)?;
        let completed = self.progress.completed_variants(id);

        let mut entries: Vec<VariantEntry> = variants
            .variant_numbers()
            .into_iter()
            .map(|n| {
                let key = VariantKey::Numbered(n);
                VariantEntry {
                    key,
                    question_count: self.catalog.variant_question_count(id, n),
                    best: completed.get(key).cloned(),
                }
            })
            .collect();
        entries.push(VariantEntry {
            key: VariantKey::Marathon,
            question_count: variants.total_questions(),
            best: completed.get(VariantKey::Marathon).cloned(),
        });

        let error_review_count = self
            .catalog
            .error_review_pool(id, &self.progress.wrong_answers(id))
            .len();
        Some(VariantMenu {
            summary,
            entries,
            error_review_count,
        })
    }

    /// Milliseconds since the session behind `token` started, or `None` once
    /// that session is gone.
    #[must_use]
    pub fn elapsed_for(&self, token: TimerToken) -> Option<u64> {
        if !self.generation.owns_session(token) {
            return None;
        }
        let session = self.session.as_ref()?;
        if session.is_complete() {
            return None;
        }
        Some(self.clock.elapsed_ms_since(session.started_at()))
    }

    /// Token for the question currently shown.
    #[must_use]
    pub fn current_token(&self) -> Option<TimerToken> {
        self.session
            .as_ref()
            .filter(|s| !s.is_complete())
            .map(|_| self.generation.token())
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `SessionError::UnknownSubject` if the catalog has no such subject.
    pub fn select_subject(&mut self, id: &SubjectId) -> Result<(), SessionError> {
        if self.catalog.get(id).is_none() {
            return Err(SessionError::UnknownSubject(id.clone()));
        }
        self.discard_session();
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn back_to_subjects(&mut self) {
        self.discard_session();
        self.selected = None;
    }

    /// Leave the session without recording anything it has not yet recorded.
    pub fn exit_to_menu(&mut self) {
        self.discard_session();
    }

    //
    // ─── SESSION LIFECYCLE ─────────────────────────────────────────────────────
    //

    /// Start a variant or marathon session for the selected subject.
    ///
    /// An unknown variant number yields an empty session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSubjectSelected` without a selected subject.
    pub fn start_quiz(&mut self, selector: VariantSelector) -> Result<TimerToken, SessionError> {
        let id = self.selected.clone().ok_or(SessionError::NoSubjectSelected)?;
        let subject = self
            .catalog
            .get(&id)
            .ok_or_else(|| SessionError::UnknownSubject(id.clone()))?;
        let questions = match selector {
            VariantSelector::Marathon => subject.questions(),
            VariantSelector::Numbered(n) => self
                .catalog
                .variants(&id)
                .map(|set| set.questions(n))
                .unwrap_or_default(),
        };
        let questions = prepare_questions(questions, &mut self.rng);
        Ok(self.begin(id, selector.into(), questions))
    }

    /// Start an error review over the selected subject's missed questions.
    ///
    /// Returns `Ok(None)` and leaves the state untouched when nothing is left
    /// to review.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSubjectSelected` without a selected subject.
    pub fn start_error_review(&mut self) -> Result<Option<TimerToken>, SessionError> {
        let id = self.selected.clone().ok_or(SessionError::NoSubjectSelected)?;
        let pool = self
            .catalog
            .error_review_pool(&id, &self.progress.wrong_answers(&id));
        if pool.is_empty() {
            log::debug!("no questions to review for {id}");
            return Ok(None);
        }
        let questions = prepare_questions(&pool, &mut self.rng);
        Ok(Some(self.begin(id, VariantKey::Errors, questions)))
    }

    /// Start the same kind of session again with a fresh shuffle.
    ///
    /// Returns `Ok(None)` when there is no session to restart or an error
    /// review has nothing left.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from the underlying start.
    pub fn restart(&mut self) -> Result<Option<TimerToken>, SessionError> {
        let Some(key) = self.session.as_ref().map(QuizSession::variant_key) else {
            return Ok(None);
        };
        match key {
            VariantKey::Numbered(n) => self.start_quiz(VariantSelector::Numbered(n)).map(Some),
            VariantKey::Marathon => self.start_quiz(VariantSelector::Marathon).map(Some),
            VariantKey::Errors => {
                let started = self.start_error_review()?;
                if started.is_none() {
                    self.discard_session();
                }
                Ok(started)
            }
        }
    }

    /// Answer the current question with the option at `index`.
    ///
    /// A correct answer during error review is dropped from the wrong-answer
    /// log at once. Returns `None` when the answer is not accepted.
    pub async fn answer(&mut self, index: usize) -> Option<AnswerFeedback> {
        let session = self.session.as_mut()?;
        let outcome = session.answer_option(index)?;
        if outcome.is_correct && session.is_error_review() {
            let id = session.subject_id().clone();
            self.progress.remove_wrong_answer(&id, &outcome.question).await;
        }
        Some(AnswerFeedback {
            outcome,
            advance_token: self.generation.token(),
        })
    }

    /// Defer the current question. Returns a token for the question now shown.
    pub fn skip(&mut self) -> Option<TimerToken> {
        let session = self.session.as_mut()?;
        if !session.skip() {
            log::debug!("skip ignored");
            return None;
        }
        Some(self.generation.next_question())
    }

    /// Move on from the answered question, recording the result when the
    /// session finishes.
    pub async fn next(&mut self) -> Advance {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return Advance::Ignored;
        };
        let advance = session.advance(now);
        match &advance {
            Advance::Moved => {
                self.generation.next_question();
            }
            Advance::Completed(result) => {
                self.generation.end_session();
                self.record_result(result).await;
            }
            Advance::Ignored => log::debug!("advance ignored"),
        }
        advance
    }

    /// Timer callback for the auto-advance after an answer.
    pub async fn fire_auto_advance(&mut self, token: TimerToken) -> Advance {
        if !self.generation.owns_question(token) {
            return Advance::Ignored;
        }
        self.next().await
    }

    /// Zero all progress of the selected subject.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSubjectSelected` without a selected subject.
    pub async fn reset_subject_stats(&mut self) -> Result<(), SessionError> {
        let id = self.selected.clone().ok_or(SessionError::NoSubjectSelected)?;
        self.progress.reset_subject(&id).await;
        Ok(())
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn begin(&mut self, id: SubjectId, key: VariantKey, questions: Vec<Question>) -> TimerToken {
        log::info!("starting {key} of {id} with {} questions", questions.len());
        self.session = Some(QuizSession::new(id, key, questions, self.clock.now()));
        self.generation.start_session()
    }

    fn discard_session(&mut self) {
        if self.session.take().is_some() {
            self.generation.end_session();
        }
    }

    async fn record_result(&mut self, result: &SessionResult) {
        let id = &result.subject_id;
        log::info!(
            "finished {} of {id}: {}/{} ({}%)",
            result.variant_key,
            result.final_score,
            result.total_questions,
            result.percentage
        );
        if !result.is_error_review() && !result.wrong_questions.is_empty() {
            self.progress
                .merge_wrong_answers(id, result.wrong_questions.iter().cloned())
                .await;
        }
        if let Some(record) = result.completion_record() {
            self.progress
                .record_completion(id, result.variant_key, record)
                .await;
        }
        self.progress
            .record_attempt(id, result.total_questions, result.final_score, result.elapsed_ms)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::flat_subject;
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryStore;

    fn controller(count: usize) -> QuizController {
        let catalog = Arc::new(SubjectCatalog::new(vec![flat_subject("demo", count, 40)]).unwrap());
        let progress = ProgressStore::new(Arc::new(InMemoryStore::new()));
        QuizController::new(fixed_clock(), catalog, progress).with_rng(StdRng::seed_from_u64(5))
    }

    fn demo() -> SubjectId {
        SubjectId::new("demo").unwrap()
    }

    fn correct_index(c: &QuizController) -> usize {
        c.session()
            .and_then(QuizSession::current_question)
            .and_then(|q| q.correct_answer.index())
            .unwrap()
    }

    #[test]
    fn state_follows_navigation() {
        let mut c = controller(3);
        assert_eq!(c.state(), ControllerState::SelectingSubject);
        c.select_subject(&demo()).unwrap();
        assert_eq!(c.state(), ControllerState::SelectingVariant(demo()));
        c.start_quiz(VariantSelector::Marathon).unwrap();
        assert_eq!(c.state(), ControllerState::InProgress);
        c.exit_to_menu();
        assert_eq!(c.state(), ControllerState::SelectingVariant(demo()));
        c.back_to_subjects();
        assert_eq!(c.state(), ControllerState::SelectingSubject);
    }

    #[test]
    fn start_requires_selection() {
        let mut c = controller(3);
        assert_eq!(
            c.start_quiz(VariantSelector::Marathon),
            Err(SessionError::NoSubjectSelected)
        );
        let unknown = SubjectId::new("nope").unwrap();
        assert_eq!(
            c.select_subject(&unknown),
            Err(SessionError::UnknownSubject(unknown.clone()))
        );
    }

    #[test]
    fn unknown_variant_gives_empty_session() {
        let mut c = controller(3);
        c.select_subject(&demo()).unwrap();
        c.start_quiz(VariantSelector::Numbered(9)).unwrap();
        assert_eq!(c.session().unwrap().total_questions(), 0);
        assert_eq!(c.state(), ControllerState::InProgress);
    }

    #[tokio::test]
    async fn stale_auto_advance_is_ignored() {
        let mut c = controller(3);
        c.select_subject(&demo()).unwrap();
        c.start_quiz(VariantSelector::Marathon).unwrap();

        let index = correct_index(&c);
        let feedback = c.answer(index).await.unwrap();
        assert!(feedback.outcome.is_correct);
        assert_eq!(c.next().await, Advance::Moved);

        assert_eq!(c.fire_auto_advance(feedback.advance_token).await, Advance::Ignored);
        assert_eq!(c.session().unwrap().current_index(), 1);
    }

    #[tokio::test]
    async fn elapsed_timer_dies_with_its_session() {
        let mut c = controller(3);
        c.select_subject(&demo()).unwrap();
        let token = c.start_quiz(VariantSelector::Marathon).unwrap();
        c.clock_mut().advance(chrono::Duration::seconds(4));
        assert_eq!(c.elapsed_for(token), Some(4_000));

        let index = correct_index(&c);
        c.answer(index).await;
        c.next().await;
        assert_eq!(c.elapsed_for(token), Some(4_000));

        c.restart().unwrap();
        assert_eq!(c.elapsed_for(token), None);
    }

    #[tokio::test]
    async fn menu_lists_variants_then_marathon() {
        let mut c = controller(105);
        c.select_subject(&demo()).unwrap();
        let menu = c.variant_menu().unwrap();
        let keys: Vec<_> = menu.entries.iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                VariantKey::Numbered(1),
                VariantKey::Numbered(2),
                VariantKey::Numbered(3),
                VariantKey::Marathon
            ]
        );
        assert_eq!(menu.entry(VariantKey::Numbered(3)).unwrap().question_count, 25);
        assert_eq!(menu.entry(VariantKey::Marathon).unwrap().question_count, 105);
        assert!(!menu.can_review_errors());
        assert_eq!(menu.summary.total_variants, 3);
    }

    #[tokio::test]
    async fn error_review_without_mistakes_does_not_start() {
        let mut c = controller(3);
        c.select_subject(&demo()).unwrap();
        assert_eq!(c.start_error_review(), Ok(None));
        assert_eq!(c.state(), ControllerState::SelectingVariant(demo()));
    }
}
