mod ids;
mod progress;
mod question;
mod subject;

pub use ids::{IdError, SubjectId};
pub use progress::{
    CompletedVariants, CompletionRecord, SubjectStats, VariantKey, VariantSelector, WrongAnswerLog,
    percentage,
};
pub use question::{
    AnswerOption, MAX_OPTIONS, MIN_OPTIONS, OPTION_ALPHABET, OptionLetter, OptionLetterError,
    Question, QuestionIssue,
};
pub use subject::{DEFAULT_QUESTIONS_PER_VARIANT, Subject, SubjectDraft, SubjectError};
