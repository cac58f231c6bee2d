use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::bank::load_catalog;
use crate::catalog::SubjectCatalog;
use crate::error::AppServicesError;
use crate::progress::ProgressStore;
use crate::sessions::QuizController;
use crate::theme_service::ThemeService;

/// Assembles app-facing services over one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    catalog: Arc<SubjectCatalog>,
    theme: Arc<ThemeService>,
}

impl AppServices {
    #[must_use]
    pub fn new(clock: Clock, storage: Storage, catalog: SubjectCatalog) -> Self {
        let theme = Arc::new(ThemeService::new(Arc::clone(&storage.kv)));
        Self {
            clock,
            storage,
            catalog: Arc::new(catalog),
            theme,
        }
    }

    /// Build services backed by `SQLite` storage and the bank file at `bank_path`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or bank loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        bank_path: impl AsRef<Path>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = load_catalog(bank_path)?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(clock, storage, catalog))
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<SubjectCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn theme(&self) -> Arc<ThemeService> {
        Arc::clone(&self.theme)
    }

    /// Progress mirror loaded for every catalog subject.
    pub async fn load_progress(&self) -> ProgressStore {
        ProgressStore::load(Arc::clone(&self.storage.kv), self.catalog.ids()).await
    }

    /// Controller with freshly loaded progress.
    pub async fn controller(&self) -> QuizController {
        let progress = self.load_progress().await;
        QuizController::new(self.clock, self.catalog(), progress)
    }
}
