use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use storage::repository::{KeyValueStore, StorageError};

use crate::progress::THEME_KEY;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme {other:?}")),
        }
    }
}

/// Persisted light/dark preference.
#[derive(Clone)]
pub struct ThemeService {
    kv: Arc<dyn KeyValueStore>,
}

impl ThemeService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored theme, or dark when missing or unreadable.
    ///
    /// Accepts both the JSON string form and a bare word.
    pub async fn load(&self) -> Theme {
        let raw = match self.kv.get(THEME_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Theme::default(),
            Err(err) => {
                log::warn!("failed to read theme: {err}");
                return Theme::default();
            }
        };
        serde_json::from_str::<Theme>(&raw)
            .ok()
            .or_else(|| raw.parse().ok())
            .unwrap_or_else(|| {
                log::warn!("ignoring stored theme {raw:?}");
                Theme::default()
            })
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be written.
    pub async fn save(&self, theme: Theme) -> Result<Theme, StorageError> {
        let raw = serde_json::to_string(&theme)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(THEME_KEY, &raw).await?;
        Ok(theme)
    }

    /// Flip the stored theme and return the new one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be written.
    pub async fn toggle(&self) -> Result<Theme, StorageError> {
        let next = self.load().await.toggled();
        self.save(next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryStore;

    #[tokio::test]
    async fn defaults_to_dark_and_toggles() {
        let kv = InMemoryStore::new();
        let themes = ThemeService::new(Arc::new(kv.clone()));
        assert_eq!(themes.load().await, Theme::Dark);

        assert_eq!(themes.toggle().await.unwrap(), Theme::Light);
        assert_eq!(kv.get("quiz_theme").await.unwrap().as_deref(), Some("\"light\""));
        assert_eq!(themes.toggle().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn reads_bare_words_and_ignores_garbage() {
        let kv = InMemoryStore::new();
        let themes = ThemeService::new(Arc::new(kv.clone()));
        kv.set("quiz_theme", "light").await.unwrap();
        assert_eq!(themes.load().await, Theme::Light);
        kv.set("quiz_theme", "\"purple\"").await.unwrap();
        assert_eq!(themes.load().await, Theme::Dark);
    }
}
