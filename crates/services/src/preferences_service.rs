use std::sync::Arc;

use dedaena_core::model::Preferences;
use storage::repository::PreferencesRepository;

use crate::error::PreferencesError;

#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferencesRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted preferences (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn load(&self) -> Result<Preferences, PreferencesError> {
        let preferences = self.repo.get_preferences().await?;
        Ok(preferences.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn set_sound_enabled(&self, enabled: bool) -> Result<Preferences, PreferencesError> {
        let preferences = self.load().await?.with_sound_enabled(enabled);
        self.repo.save_preferences(&preferences).await?;
        tracing::info!(enabled, "sound preference saved");
        Ok(preferences)
    }

    /// Flip the sound flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn toggle_sound(&self) -> Result<bool, PreferencesError> {
        let current = self.load().await?.sound_enabled();
        let saved = self.set_sound_enabled(!current).await?;
        Ok(saved.sound_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn service() -> PreferencesService {
        PreferencesService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn missing_preferences_load_as_defaults() {
        let prefs = service().load().await.unwrap();
        assert!(prefs.sound_enabled());
    }

    #[tokio::test]
    async fn toggle_sound_persists() {
        let service = service();
        assert!(!service.toggle_sound().await.unwrap());
        assert!(!service.load().await.unwrap().sound_enabled());
        assert!(service.toggle_sound().await.unwrap());
    }

    #[tokio::test]
    async fn set_sound_enabled_overwrites_the_stored_row() {
        let service = service();
        let prefs = service.set_sound_enabled(false).await.unwrap();
        assert!(!prefs.sound_enabled());
        assert_eq!(service.load().await.unwrap(), prefs);

        service.set_sound_enabled(false).await.unwrap();
        assert!(!service.load().await.unwrap().sound_enabled());
    }
}
