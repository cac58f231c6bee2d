mod progress;
mod service;
mod shuffle;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{Advance, AnswerOutcome, QuizSession, SessionResult};
pub use shuffle::{prepare_questions, shuffle_options, shuffle_questions};
pub use timer::{AUTO_ADVANCE_DELAY, TimerToken};
pub use view::{QuizSnapshot, ResultTier, SubjectProgressSummary, VariantEntry, VariantMenu};
pub use workflow::{AnswerFeedback, ControllerState, QuizController};
