use quiz_core::model::SubjectId;

/// Key of the persisted theme preference.
pub const THEME_KEY: &str = "quiz_theme";

/// The three per-subject records kept in the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    /// Best completion per variant key.
    Variants,
    /// Aggregate attempt statistics.
    Stats,
    /// Missed question texts.
    Wrong,
}

impl ProgressKind {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            ProgressKind::Variants => "variants",
            ProgressKind::Stats => "stats",
            ProgressKind::Wrong => "wrong",
        }
    }

    /// `quiz_<subjectId>_<suffix>`
    #[must_use]
    pub fn key(self, subject_id: &SubjectId) -> String {
        format!("quiz_{subject_id}_{}", self.suffix())
    }
}
