use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("subject id cannot be empty")]
    Empty,

    #[error("subject id cannot contain whitespace: {0:?}")]
    Whitespace(String),
}

/// Stable identifier of a subject.
///
/// Used verbatim inside persistence keys (`quiz_<id>_stats`) and as the
/// partition seed source, so it must not change between releases of a bank.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a new `SubjectId`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the id is empty or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(id));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_display() {
        let id = SubjectId::new("culture").unwrap();
        assert_eq!(id.to_string(), "culture");
        assert_eq!(format!("{id:?}"), "SubjectId(culture)");
    }

    #[test]
    fn subject_id_rejects_empty_and_whitespace() {
        assert_eq!(SubjectId::new(""), Err(IdError::Empty));
        assert!(matches!(
            "two words".parse::<SubjectId>(),
            Err(IdError::Whitespace(_))
        ));
    }

    #[test]
    fn subject_id_deserializes_with_validation() {
        let id: SubjectId = serde_json::from_str("\"phil\"").unwrap();
        assert_eq!(id.as_str(), "phil");
        assert!(serde_json::from_str::<SubjectId>("\"\"").is_err());
    }
}
