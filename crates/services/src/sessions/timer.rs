use std::time::Duration;

/// Delay between answering and moving on to the next question.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Handle given to the host for a scheduled callback.
///
/// A token goes stale as soon as the question or session it was issued for is
/// left; firing a stale token does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    session: u64,
    question: u64,
}

/// Generation counters owned by the controller.
#[derive(Debug, Default)]
pub(crate) struct Generation {
    session: u64,
    question: u64,
}

impl Generation {
    pub(crate) fn start_session(&mut self) -> TimerToken {
        self.session += 1;
        self.question += 1;
        self.token()
    }

    pub(crate) fn next_question(&mut self) -> TimerToken {
        self.question += 1;
        self.token()
    }

    pub(crate) fn end_session(&mut self) {
        self.session += 1;
        self.question += 1;
    }

    pub(crate) fn token(&self) -> TimerToken {
        TimerToken {
            session: self.session,
            question: self.question,
        }
    }

    pub(crate) fn owns_question(&self, token: TimerToken) -> bool {
        token == self.token()
    }

    pub(crate) fn owns_session(&self, token: TimerToken) -> bool {
        token.session == self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_change_keeps_session_token_alive() {
        let mut generation = Generation::default();
        let started = generation.start_session();
        let next = generation.next_question();

        assert!(!generation.owns_question(started));
        assert!(generation.owns_session(started));
        assert!(generation.owns_question(next));
    }

    #[test]
    fn ending_a_session_invalidates_everything() {
        let mut generation = Generation::default();
        let token = generation.start_session();
        generation.end_session();

        assert!(!generation.owns_question(token));
        assert!(!generation.owns_session(token));
    }

    #[test]
    fn restart_never_revives_old_tokens() {
        let mut generation = Generation::default();
        let first = generation.start_session();
        let second = generation.start_session();
        assert_ne!(first, second);
        assert!(!generation.owns_session(first));
    }
}
