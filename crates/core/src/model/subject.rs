use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{IdError, SubjectId};
use crate::model::question::Question;

/// Variant size used when a bank does not specify one.
pub const DEFAULT_QUESTIONS_PER_VARIANT: u32 = 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error(transparent)]
    Id(#[from] IdError),

    #[error("subject name cannot be empty")]
    EmptyName,

    #[error("questions per variant must be > 0")]
    InvalidQuestionsPerVariant,
}

/// Unvalidated subject as it appears in a question-bank file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDraft {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub data: Vec<Question>,
    #[serde(default)]
    pub has_variants: bool,
    #[serde(default = "default_questions_per_variant")]
    pub questions_per_variant: u32,
    #[serde(default, rename = "color")]
    pub color_theme: String,
}

fn default_questions_per_variant() -> u32 {
    DEFAULT_QUESTIONS_PER_VARIANT
}

impl SubjectDraft {
    /// Validate the draft into an immutable `Subject`.
    ///
    /// A missing short name falls back to the full name.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` for an invalid id, an empty name, or a zero
    /// variant size.
    pub fn validate(self) -> Result<Subject, SubjectError> {
        let id = SubjectId::new(self.id)?;
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(SubjectError::EmptyName);
        }
        if self.questions_per_variant == 0 {
            return Err(SubjectError::InvalidQuestionsPerVariant);
        }
        let short_name = match self.short_name.trim() {
            "" => name.clone(),
            s => s.to_string(),
        };

        Ok(Subject {
            id,
            name,
            short_name,
            questions: self.data,
            has_variants: self.has_variants,
            questions_per_variant: self.questions_per_variant,
            color_theme: self.color_theme,
        })
    }
}

/// Static subject configuration, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    name: String,
    short_name: String,
    questions: Vec<Question>,
    has_variants: bool,
    questions_per_variant: u32,
    color_theme: String,
}

impl Subject {
    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The full question bank, in source order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// True when questions already carry a `variant` tag.
    #[must_use]
    pub fn has_variants(&self) -> bool {
        self.has_variants
    }

    #[must_use]
    pub fn questions_per_variant(&self) -> u32 {
        self.questions_per_variant
    }

    #[must_use]
    pub fn color_theme(&self) -> &str {
        &self.color_theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SubjectDraft {
        SubjectDraft {
            id: "culture".into(),
            name: "Cultural Studies".into(),
            short_name: String::new(),
            data: Vec::new(),
            has_variants: false,
            questions_per_variant: 40,
            color_theme: "amber".into(),
        }
    }

    #[test]
    fn validate_fills_short_name() {
        let subject = draft().validate().unwrap();
        assert_eq!(subject.short_name(), "Cultural Studies");
        assert_eq!(subject.id().as_str(), "culture");
    }

    #[test]
    fn zero_variant_size_is_rejected() {
        let mut d = draft();
        d.questions_per_variant = 0;
        assert_eq!(d.validate(), Err(SubjectError::InvalidQuestionsPerVariant));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut d = draft();
        d.name = "  ".into();
        assert_eq!(d.validate(), Err(SubjectError::EmptyName));
    }

    #[test]
    fn draft_deserializes_with_defaults() {
        let raw = r#"{"id": "soc", "name": "Sociology", "shortName": "Soc", "color": "lime"}"#;
        let d: SubjectDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(d.questions_per_variant, DEFAULT_QUESTIONS_PER_VARIANT);
        assert!(!d.has_variants);
        assert_eq!(d.color_theme, "lime");
    }
}
