//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{SubjectError, SubjectId};
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed question bank: {0}")]
    Json(#[from] serde_json::Error),
    #[error("subject #{index} is invalid: {source}")]
    Subject {
        index: usize,
        #[source]
        source: SubjectError,
    },
    #[error("subject {0} is defined more than once")]
    DuplicateSubject(SubjectId),
}

/// Errors emitted by the quiz controller.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("unknown subject: {0}")]
    UnknownSubject(SubjectId),
    #[error("no subject selected")]
    NoSubjectSelected,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
