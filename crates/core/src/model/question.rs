use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── OPTION LETTERS ────────────────────────────────────────────────────────────
//

/// Labels used for answer options, in display order.
pub const OPTION_ALPHABET: [char; 5] = ['а', 'б', 'в', 'г', 'д'];

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = OPTION_ALPHABET.len();

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionLetterError {
    #[error("expected a single option letter, got {0:?}")]
    NotSingleChar(String),

    #[error("{0:?} is not an option letter")]
    Unknown(char),
}

/// Label of an answer option as written in a bank.
///
/// Shuffled questions are always labelled from [`OPTION_ALPHABET`]. Bank
/// entries may carry any single character; [`Question::check`] reports
/// labels outside the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionLetter(char);

impl OptionLetter {
    /// Letter for the option at `index`, if the alphabet is long enough.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        OPTION_ALPHABET.get(index).copied().map(Self)
    }

    /// Parses a letter from the option alphabet.
    ///
    /// # Errors
    ///
    /// Returns `OptionLetterError::Unknown` for characters outside the alphabet.
    pub fn from_char(c: char) -> Result<Self, OptionLetterError> {
        if OPTION_ALPHABET.contains(&c) {
            Ok(Self(c))
        } else {
            Err(OptionLetterError::Unknown(c))
        }
    }

    /// Position in the option alphabet; `None` for a foreign label.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        OPTION_ALPHABET.iter().position(|&l| l == self.0)
    }

    #[must_use]
    pub fn is_in_alphabet(self) -> bool {
        self.index().is_some()
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<String> for OptionLetter {
    type Error = OptionLetterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self(c)),
            _ => Err(OptionLetterError::NotSingleChar(value)),
        }
    }
}

impl From<OptionLetter> for String {
    fn from(letter: OptionLetter) -> Self {
        letter.as_char().to_string()
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One answer option. `text` is the durable identity; `letter` is reassigned
/// whenever options are shuffled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub letter: OptionLetter,
    pub text: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(letter: OptionLetter, text: impl Into<String>) -> Self {
        Self {
            letter,
            text: text.into(),
        }
    }
}

/// Problems a question bank entry can have. These are reported, never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionIssue {
    #[error("question has {len} options, expected {MIN_OPTIONS}..={MAX_OPTIONS}")]
    OptionCount { len: usize },

    #[error("option label {letter:?} is outside the option alphabet")]
    ForeignLetter { letter: char },

    #[error("correct answer {letter} matches no option")]
    CorrectAnswerMissing { letter: OptionLetter },

    #[error("correct answer {letter} matches {count} options")]
    CorrectAnswerAmbiguous { letter: OptionLetter, count: usize },
}

/// A multiple-choice question.
///
/// `id` is regenerated by partitioning and is not stable across sessions.
/// The `question` text is the identity used for cross-session matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: OptionLetter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<u32>,
}

impl Question {
    /// Builds a question, labelling `options` `а`, `б`, ... in order.
    ///
    /// Options beyond the alphabet are dropped.
    #[must_use]
    pub fn with_options<I, S>(
        id: impl Into<String>,
        question: impl Into<String>,
        options: I,
        correct_answer: OptionLetter,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options
            .into_iter()
            .enumerate()
            .filter_map(|(i, text)| OptionLetter::from_index(i).map(|l| AnswerOption::new(l, text)))
            .collect();
        Self {
            id: id.into(),
            question: question.into(),
            options,
            correct_answer,
            variant: None,
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: u32) -> Self {
        self.variant = Some(variant);
        self
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.letter == self.correct_answer)
    }

    #[must_use]
    pub fn option_at(&self, index: usize) -> Option<&AnswerOption> {
        self.options.get(index)
    }

    #[must_use]
    pub fn is_correct(&self, letter: OptionLetter) -> bool {
        letter == self.correct_answer
    }

    /// Checks option count, that every label is from the alphabet, and that
    /// exactly one option carries the correct letter.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionIssue` found.
    pub fn check(&self) -> Result<(), QuestionIssue> {
        let len = self.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&len) {
            return Err(QuestionIssue::OptionCount { len });
        }
        if let Some(foreign) = self
            .options
            .iter()
            .map(|o| o.letter)
            .chain(std::iter::once(self.correct_answer))
            .find(|l| !l.is_in_alphabet())
        {
            return Err(QuestionIssue::ForeignLetter {
                letter: foreign.as_char(),
            });
        }
        let count = self
            .options
            .iter()
            .filter(|o| o.letter == self.correct_answer)
            .count();
        match count {
            1 => Ok(()),
            0 => Err(QuestionIssue::CorrectAnswerMissing {
                letter: self.correct_answer,
            }),
            _ => Err(QuestionIssue::CorrectAnswerAmbiguous {
                letter: self.correct_answer,
                count,
            }),
        }
    }
}
