#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank;
pub mod catalog;
pub mod error;
pub mod progress;
pub mod sessions;
pub mod theme_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::SubjectCatalog;
pub use error::{AppServicesError, BankError, SessionError};
pub use progress::{ProgressStore, SubjectProgress};
pub use theme_service::{Theme, ThemeService};

pub use sessions::{
    AUTO_ADVANCE_DELAY, Advance, AnswerFeedback, ControllerState, QuizController, QuizSession,
    QuizSnapshot, ResultTier, SessionResult, SubjectProgressSummary, TimerToken, VariantMenu,
};
