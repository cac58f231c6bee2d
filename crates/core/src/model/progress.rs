use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ─── VARIANT KEYS ──────────────────────────────────────────────────────────────
//

/// What the user asked to play from the variant menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantSelector {
    Numbered(u32),
    Marathon,
}

/// Identifies the kind of session that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKey {
    Numbered(u32),
    Marathon,
    Errors,
}

impl VariantKey {
    /// Key under which a completion is stored. Error review has none.
    #[must_use]
    pub fn record_key(self) -> Option<String> {
        match self {
            VariantKey::Numbered(n) => Some(format!("variant_{n}")),
            VariantKey::Marathon => Some("marathon".to_string()),
            VariantKey::Errors => None,
        }
    }

    /// Inverse of [`VariantKey::record_key`], also accepting `errors`.
    #[must_use]
    pub fn parse_record_key(raw: &str) -> Option<Self> {
        match raw {
            "marathon" => Some(VariantKey::Marathon),
            "errors" => Some(VariantKey::Errors),
            _ => raw
                .strip_prefix("variant_")
                .and_then(|n| n.parse().ok())
                .map(VariantKey::Numbered),
        }
    }

    #[must_use]
    pub fn is_error_review(self) -> bool {
        matches!(self, VariantKey::Errors)
    }
}

impl From<VariantSelector> for VariantKey {
    fn from(selector: VariantSelector) -> Self {
        match selector {
            VariantSelector::Numbered(n) => VariantKey::Numbered(n),
            VariantSelector::Marathon => VariantKey::Marathon,
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKey::Numbered(n) => write!(f, "variant {n}"),
            VariantKey::Marathon => f.write_str("marathon"),
            VariantKey::Errors => f.write_str("error review"),
        }
    }
}

/// `round(score / total * 100)`, rounding halves up. Zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score.min(total));
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── COMPLETION RECORDS ────────────────────────────────────────────────────────
//

/// Best result achieved on one variant (or the marathon).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub score: u32,
    pub total: u32,
    pub percentage: u8,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    #[must_use]
    pub fn new(score: u32, total: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            score,
            total,
            percentage: percentage(score, total),
            completed_at,
        }
    }

    /// A record replaces the stored one only with a strictly higher percentage.
    #[must_use]
    pub fn improves_on(&self, existing: Option<&CompletionRecord>) -> bool {
        existing.is_none_or(|old| self.percentage > old.percentage)
    }
}

/// Per-subject map of record key (`variant_<n>`, `marathon`) to best result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedVariants(BTreeMap<String, CompletionRecord>);

impl CompletedVariants {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: VariantKey) -> Option<&CompletionRecord> {
        key.record_key().and_then(|k| self.0.get(&k))
    }

    #[must_use]
    pub fn is_completed(&self, key: VariantKey) -> bool {
        self.get(key).is_some()
    }

    /// Store `record` if it beats the current best. Returns whether it was stored.
    pub fn record_if_better(&mut self, key: VariantKey, record: CompletionRecord) -> bool {
        let Some(k) = key.record_key() else {
            return false;
        };
        if !record.improves_on(self.0.get(&k)) {
            return false;
        }
        self.0.insert(k, record);
        true
    }

    /// Number of numbered variants with a stored result.
    #[must_use]
    pub fn completed_variant_count(&self) -> usize {
        self.0
            .keys()
            .filter(|k| matches!(VariantKey::parse_record_key(k), Some(VariantKey::Numbered(_))))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompletionRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Accumulated totals across every finished attempt of a subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectStats {
    pub total_attempts: u64,
    pub total_questions: u64,
    pub total_correct: u64,
    pub total_time_ms: u64,
}

impl SubjectStats {
    pub fn record_attempt(&mut self, questions: u32, correct: u32, elapsed_ms: u64) {
        self.total_attempts = self.total_attempts.saturating_add(1);
        self.total_questions = self.total_questions.saturating_add(u64::from(questions));
        self.total_correct = self.total_correct.saturating_add(u64::from(correct));
        self.total_time_ms = self.total_time_ms.saturating_add(elapsed_ms);
    }

    /// Share of correct answers over all attempts, 0 when nothing was answered.
    #[must_use]
    pub fn average_percent(&self) -> u8 {
        if self.total_questions == 0 {
            return 0;
        }
        let correct = self.total_correct.min(self.total_questions);
        let rounded = (correct * 200 + self.total_questions) / (self.total_questions * 2);
        u8::try_from(rounded).unwrap_or(100)
    }
}

//
// ─── WRONG ANSWER LOG ──────────────────────────────────────────────────────────
//

/// Question texts the user has missed and not yet corrected in review.
///
/// Entries are unique; order is kept only for stable persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct WrongAnswerLog(Vec<String>);

impl WrongAnswerLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `texts` into the log. Returns how many were new.
    pub fn merge<I, S>(&mut self, texts: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.0.len();
        for text in texts {
            let text = text.into();
            if !self.0.contains(&text) {
                self.0.push(text);
            }
        }
        self.0.len() - before
    }

    /// Returns true if `text` was present.
    pub fn remove(&mut self, text: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != text);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.0.iter().any(|t| t == text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for WrongAnswerLog {
    fn from(texts: Vec<String>) -> Self {
        let mut log = Self::new();
        log.merge(texts);
        log
    }
}

impl From<WrongAnswerLog> for Vec<String> {
    fn from(log: WrongAnswerLog) -> Self {
        log.0
    }
}
