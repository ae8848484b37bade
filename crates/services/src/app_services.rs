use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::admin::{AdminService, HttpAdminApi};
use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::config::ApiConfig;
use crate::content::HttpContentSource;
use crate::error::AppServicesError;
use crate::game_service::GameService;
use crate::moderator::{HttpModerationApi, ModerationService};
use crate::preferences_service::PreferencesService;

/// Assembles app-facing services over one API client and local storage.
#[derive(Clone)]
pub struct AppServices {
    config: ApiConfig,
    game: Arc<GameService>,
    auth: Arc<AuthService>,
    moderation: Arc<ModerationService>,
    admin: Arc<AdminService>,
    preferences: Arc<PreferencesService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the API
    /// client cannot be built.
    pub async fn new_sqlite(
        db_url: &str,
        config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, config, clock).await
    }

    /// Build services over an already constructed storage aggregate.
    ///
    /// # Errors
    ///
    /// See [`AppServices::new_sqlite`].
    pub async fn from_storage(
        storage: Storage,
        config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let preferences = Arc::new(PreferencesService::new(Arc::clone(&storage.preferences)));

        let api = ApiClient::new(&config)?;
        let content = Arc::new(HttpContentSource::new(api.clone()));
        let game = Arc::new(GameService::new(content, config.table.clone()));
        let auth = Arc::new(AuthService::new(
            api.clone(),
            Arc::clone(&storage.sessions),
            clock,
        ));
        let moderation = Arc::new(ModerationService::new(
            Arc::new(HttpModerationApi::new(api.clone())),
            Arc::clone(&storage.sessions),
            clock,
        ));
        let admin = Arc::new(AdminService::new(
            Arc::new(HttpAdminApi::new(api)),
            Arc::clone(&storage.sessions),
        ));

        Ok(Self {
            config,
            game,
            auth,
            moderation,
            admin,
            preferences,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn game(&self) -> Arc<GameService> {
        Arc::clone(&self.game)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn moderation(&self) -> Arc<ModerationService> {
        Arc::clone(&self.moderation)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedaena_core::model::Preferences;
    use storage::repository::PreferencesRepository;

    #[tokio::test]
    async fn stored_preferences_leave_the_api_config_alone() {
        let storage = Storage::in_memory();
        storage
            .preferences
            .save_preferences(&Preferences::default().with_sound_enabled(false))
            .await
            .unwrap();

        let services = AppServices::from_storage(storage, ApiConfig::default(), Clock::default())
            .await
            .unwrap();
        assert_eq!(services.config(), &ApiConfig::default());
        assert!(!services.preferences().load().await.unwrap().sound_enabled());
    }

    #[tokio::test]
    async fn defaults_apply_without_preferences() {
        let services =
            AppServices::from_storage(Storage::in_memory(), ApiConfig::default(), Clock::default())
                .await
                .unwrap();
        assert_eq!(services.config(), &ApiConfig::default());
        assert_eq!(services.game().table(), "gogebashvili_1");
    }
}
