//! Question-bank loading.
//!
//! A bank is a JSON array of subjects. Structural problems fail the load;
//! inconsistent questions are kept and reported through the log.

use std::path::Path;

use quiz_core::model::{Subject, SubjectDraft};

use crate::catalog::SubjectCatalog;
use crate::error::BankError;

/// Parse and validate every subject in `raw`.
///
/// # Errors
///
/// Returns `BankError::Json` for malformed JSON and `BankError::Subject` for
/// the first subject that fails validation.
pub fn parse_subjects(raw: &str) -> Result<Vec<Subject>, BankError> {
    let drafts: Vec<SubjectDraft> = serde_json::from_str(raw)?;
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .inspect(report_issues)
                .map_err(|source| BankError::Subject { index, source })
        })
        .collect()
}

/// Parse `raw` into a catalog.
///
/// # Errors
///
/// Returns `BankError` for malformed input or duplicate subject ids.
pub fn catalog_from_str(raw: &str) -> Result<SubjectCatalog, BankError> {
    SubjectCatalog::new(parse_subjects(raw)?)
}

/// Read the bank file at `path` into a catalog.
///
/// # Errors
///
/// Returns `BankError::Io` if the file cannot be read, otherwise as
/// [`catalog_from_str`].
pub fn load_catalog(path: impl AsRef<Path>) -> Result<SubjectCatalog, BankError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let catalog = catalog_from_str(&raw)?;
    log::info!(
        "loaded {} subjects from {}",
        catalog.subjects().len(),
        path.display()
    );
    Ok(catalog)
}

fn report_issues(subject: &Subject) {
    for (position, question) in subject.questions().iter().enumerate() {
        if let Err(issue) = question.check() {
            log::warn!(
                "{} question #{} ({:?}): {issue}",
                subject.id(),
                position + 1,
                question.question
            );
        }
    }
}
