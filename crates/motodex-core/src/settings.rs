//! Application settings that persist across sessions.

use motodex_api::model::Units;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::storage::{APP_SETTINGS_KEY, FIRST_LAUNCH_KEY, Storage};

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
    /// Follow the system.
    #[default]
    Auto,
}

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    /// Color theme.
    pub theme: Theme,
    /// Interface language code.
    pub language: String,
    /// Measurement units.
    pub units: Units,
    /// Notifications enabled.
    pub notifications: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            language: "en".to_string(),
            units: Units::Metric,
            notifications: true,
        }
    }
}

/// Partial settings change; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// New theme.
    pub theme: Option<Theme>,
    /// New language.
    pub language: Option<String>,
    /// New units.
    pub units: Option<Units>,
    /// New notification preference.
    pub notifications: Option<bool>,
}

/// Settings state container.
#[derive(Debug, Clone)]
pub struct Settings {
    storage: Storage,
    current: AppSettings,
    is_first_launch: bool,
}

impl Settings {
    /// Creates default settings persisting to `storage`.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            current: AppSettings::default(),
            is_first_launch: true,
        }
    }

    /// Current settings.
    #[must_use]
    pub const fn current(&self) -> &AppSettings {
        &self.current
    }

    /// Whether first-launch onboarding is still pending.
    #[must_use]
    pub const fn is_first_launch(&self) -> bool {
        self.is_first_launch
    }

    /// Loads settings and the first-launch flag.
    ///
    /// Missing or partial stored settings fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or the stored value is
    /// malformed.
    pub async fn load(&mut self) -> Result<&AppSettings> {
        self.current = self
            .storage
            .get_json(APP_SETTINGS_KEY)
            .await?
            .unwrap_or_default();
        self.is_first_launch = self.storage.get(FIRST_LAUNCH_KEY).await?.is_none();
        debug!(first_launch = self.is_first_launch, "Loaded settings");
        Ok(&self.current)
    }

    /// Applies `update` and saves the result.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub async fn save(&mut self, update: SettingsUpdate) -> Result<&AppSettings> {
        let mut next = self.current.clone();
        if let Some(theme) = update.theme {
            next.theme = theme;
        }
        if let Some(language) = update.language {
            next.language = language;
        }
        if let Some(units) = update.units {
            next.units = units;
        }
        if let Some(notifications) = update.notifications {
            next.notifications = notifications;
        }

        self.storage.set_json(APP_SETTINGS_KEY, &next).await?;
        self.current = next;
        Ok(&self.current)
    }

    /// Records that onboarding has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub async fn complete_first_launch(&mut self) -> Result<()> {
        self.storage.set(FIRST_LAUNCH_KEY, "true").await?;
        self.is_first_launch = false;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_when_nothing_stored() {
        let mut settings = Settings::new(Storage::in_memory().await.unwrap());
        let loaded = settings.load().await.unwrap();

        assert_eq!(loaded, &AppSettings::default());
        assert_eq!(loaded.language, "en");
        assert!(settings.is_first_launch());
    }

    #[tokio::test]
    async fn test_save_merges_and_persists() {
        let storage = Storage::in_memory().await.unwrap();
        let mut settings = Settings::new(storage.clone());
        settings
            .save(SettingsUpdate {
                theme: Some(Theme::Dark),
                units: Some(Units::Imperial),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        settings.complete_first_launch().await.unwrap();

        let mut reloaded = Settings::new(storage);
        let current = reloaded.load().await.unwrap().clone();
        assert_eq!(current.theme, Theme::Dark);
        assert_eq!(current.units, Units::Imperial);
        assert!(current.notifications);
        assert!(!reloaded.is_first_launch());
    }

    #[tokio::test]
    async fn test_partial_stored_settings() {
        let storage = Storage::in_memory().await.unwrap();
        storage
            .set(APP_SETTINGS_KEY, r#"{"theme":"light"}"#)
            .await
            .unwrap();

        let mut settings = Settings::new(storage);
        let loaded = settings.load().await.unwrap();
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.language, "en");
    }
}
