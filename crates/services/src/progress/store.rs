use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use quiz_core::model::{
    CompletedVariants, CompletionRecord, SubjectId, SubjectStats, VariantKey, WrongAnswerLog,
};
use storage::repository::KeyValueStore;

use super::keys::ProgressKind;

/// Everything persisted for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectProgress {
    pub completed: CompletedVariants,
    pub stats: SubjectStats,
    pub wrong: WrongAnswerLog,
}

/// In-memory mirror of per-subject progress with write-through persistence.
///
/// Reads never touch the backend. Every mutator updates the mirror first and
/// then writes the affected record; a failed write is logged and otherwise
/// ignored, leaving the mirror authoritative until the process ends.
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    subjects: HashMap<SubjectId, SubjectProgress>,
}

impl ProgressStore {
    /// Empty mirror; nothing is read from `kv`.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            subjects: HashMap::new(),
        }
    }

    /// Build a mirror holding the stored progress of each subject.
    ///
    /// Missing or malformed records load as their defaults.
    pub async fn load<'a, I>(kv: Arc<dyn KeyValueStore>, subject_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a SubjectId>,
    {
        let mut store = Self::new(kv);
        for id in subject_ids {
            store.reload_subject(id).await;
        }
        store
    }

    /// Replace the mirrored progress of one subject with what is stored.
    pub async fn reload_subject(&mut self, subject_id: &SubjectId) {
        let kv = self.kv.as_ref();
        let progress = SubjectProgress {
            completed: read_or_default(kv, &ProgressKind::Variants.key(subject_id)).await,
            stats: read_or_default(kv, &ProgressKind::Stats.key(subject_id)).await,
            wrong: read_or_default(kv, &ProgressKind::Wrong.key(subject_id)).await,
        };
        self.subjects.insert(subject_id.clone(), progress);
    }

    #[must_use]
    pub fn subject(&self, subject_id: &SubjectId) -> Option<&SubjectProgress> {
        self.subjects.get(subject_id)
    }

    #[must_use]
    pub fn completed_variants(&self, subject_id: &SubjectId) -> CompletedVariants {
        self.subject(subject_id)
            .map(|p| p.completed.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn stats(&self, subject_id: &SubjectId) -> SubjectStats {
        self.subject(subject_id).map(|p| p.stats).unwrap_or_default()
    }

    #[must_use]
    pub fn wrong_answers(&self, subject_id: &SubjectId) -> WrongAnswerLog {
        self.subject(subject_id)
            .map(|p| p.wrong.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn wrong_answer_count(&self, subject_id: &SubjectId) -> usize {
        self.subject(subject_id).map_or(0, |p| p.wrong.len())
    }

    /// Union `texts` into the subject's wrong-answer log. Returns how many were new.
    pub async fn merge_wrong_answers<I, S>(&mut self, subject_id: &SubjectId, texts: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let progress = self.subjects.entry(subject_id.clone()).or_default();
        let added = progress.wrong.merge(texts);
        write_through(self.kv.as_ref(), &ProgressKind::Wrong.key(subject_id), &progress.wrong)
            .await;
        added
    }

    /// Drop one question text from the wrong-answer log.
    ///
    /// Returns false, without writing, when the text was not logged.
    pub async fn remove_wrong_answer(&mut self, subject_id: &SubjectId, text: &str) -> bool {
        let progress = self.subjects.entry(subject_id.clone()).or_default();
        if !progress.wrong.remove(text) {
            return false;
        }
        write_through(self.kv.as_ref(), &ProgressKind::Wrong.key(subject_id), &progress.wrong)
            .await;
        true
    }

    /// Keep `record` as the best for `key` if it has a strictly higher
    /// percentage. Returns whether it was stored.
    pub async fn record_completion(
        &mut self,
        subject_id: &SubjectId,
        key: VariantKey,
        record: CompletionRecord,
    ) -> bool {
        let progress = self.subjects.entry(subject_id.clone()).or_default();
        if !progress.completed.record_if_better(key, record) {
            return false;
        }
        write_through(
            self.kv.as_ref(),
            &ProgressKind::Variants.key(subject_id),
            &progress.completed,
        )
        .await;
        true
    }

    pub async fn record_attempt(
        &mut self,
        subject_id: &SubjectId,
        questions: u32,
        correct: u32,
        elapsed_ms: u64,
    ) {
        let progress = self.subjects.entry(subject_id.clone()).or_default();
        progress.stats.record_attempt(questions, correct, elapsed_ms);
        write_through(self.kv.as_ref(), &ProgressKind::Stats.key(subject_id), &progress.stats)
            .await;
    }

    /// Zero completions, stats and the wrong-answer log of one subject and
    /// persist all three.
    pub async fn reset_subject(&mut self, subject_id: &SubjectId) {
        let progress = SubjectProgress::default();
        let kv = self.kv.as_ref();
        write_through(kv, &ProgressKind::Variants.key(subject_id), &progress.completed).await;
        write_through(kv, &ProgressKind::Stats.key(subject_id), &progress.stats).await;
        write_through(kv, &ProgressKind::Wrong.key(subject_id), &progress.wrong).await;
        self.subjects.insert(subject_id.clone(), progress);
        log::info!("progress reset for subject {subject_id}");
    }
}

async fn read_or_default<T>(kv: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match kv.get(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            log::warn!("ignoring malformed value under {key}: {err}");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(err) => {
            log::warn!("failed to read {key}, using default: {err}");
            T::default()
        }
    }
}

async fn write_through<T: Serialize>(kv: &dyn KeyValueStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("failed to encode {key}: {err}");
            return;
        }
    };
    if let Err(err) = kv.set(key, &raw).await {
        log::warn!("failed to persist {key}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryStore;

    fn id() -> SubjectId {
        SubjectId::new("phil").unwrap()
    }

    #[tokio::test]
    async fn load_falls_back_on_malformed_values() {
        let kv = InMemoryStore::new();
        kv.set("quiz_phil_stats", "{not json").await.unwrap();
        kv.set("quiz_phil_wrong", r#"["Q1","Q2","Q1"]"#).await.unwrap();

        let store = ProgressStore::load(Arc::new(kv), [&id()]).await;
        assert_eq!(store.stats(&id()), SubjectStats::default());
        assert_eq!(store.wrong_answer_count(&id()), 2);
        assert!(store.completed_variants(&id()).is_empty());
    }

    #[tokio::test]
    async fn mutators_write_through() {
        let kv = InMemoryStore::new();
        let mut store = ProgressStore::new(Arc::new(kv.clone()));

        store.merge_wrong_answers(&id(), ["Q1", "Q2"]).await;
        store.record_attempt(&id(), 10, 8, 5_000).await;
        let stored = store
            .record_completion(&id(), VariantKey::Numbered(1), CompletionRecord::new(8, 10, fixed_now()))
            .await;
        assert!(stored);

        assert_eq!(
            kv.get("quiz_phil_wrong").await.unwrap().as_deref(),
            Some(r#"["Q1","Q2"]"#)
        );
        let stats = kv.get("quiz_phil_stats").await.unwrap().unwrap();
        assert!(stats.contains("\"totalCorrect\":8"));
        let variants = kv.get("quiz_phil_variants").await.unwrap().unwrap();
        assert!(variants.contains("\"variant_1\""));

        let reloaded = ProgressStore::load(Arc::new(kv), [&id()]).await;
        assert_eq!(reloaded.subject(&id()), store.subject(&id()));
    }

    #[tokio::test]
    async fn removing_unknown_text_does_not_write() {
        let kv = InMemoryStore::new();
        let mut store = ProgressStore::new(Arc::new(kv.clone()));
        assert!(!store.remove_wrong_answer(&id(), "nope").await);
        assert_eq!(kv.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn worse_completion_is_not_persisted() {
        let kv = InMemoryStore::new();
        let mut store = ProgressStore::new(Arc::new(kv.clone()));
        let key = VariantKey::Marathon;
        store
            .record_completion(&id(), key, CompletionRecord::new(9, 10, fixed_now()))
            .await;
        let stored = store
            .record_completion(&id(), key, CompletionRecord::new(5, 10, fixed_now()))
            .await;
        assert!(!stored);
        assert_eq!(store.completed_variants(&id()).get(key).unwrap().percentage, 90);
    }

    #[tokio::test]
    async fn reset_zeroes_everything() {
        let kv = InMemoryStore::new();
        let mut store = ProgressStore::new(Arc::new(kv.clone()));
        store.merge_wrong_answers(&id(), ["Q1"]).await;
        store.record_attempt(&id(), 3, 1, 100).await;

        store.reset_subject(&id()).await;

        assert_eq!(store.wrong_answer_count(&id()), 0);
        assert_eq!(store.stats(&id()).total_attempts, 0);
        assert_eq!(kv.get("quiz_phil_wrong").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.get("quiz_phil_variants").await.unwrap().as_deref(), Some("{}"));
    }
}
