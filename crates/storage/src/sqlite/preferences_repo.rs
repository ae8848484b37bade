use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{PreferencesRepository, StorageError};
use dedaena_core::model::Preferences;

use super::SqliteRepository;

#[async_trait]
impl PreferencesRepository for SqliteRepository {
    async fn get_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        let row = sqlx::query("SELECT sound_enabled FROM preferences WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sound_enabled: bool = row
            .try_get("sound_enabled")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(Preferences::from_persisted(sound_enabled)))
    }

    async fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO preferences (id, sound_enabled)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                sound_enabled = excluded.sound_enabled
            ",
        )
        .bind(1_i64)
        .bind(preferences.sound_enabled())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
