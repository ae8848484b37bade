use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{SessionRepository, StorageError};
use dedaena_core::model::{StoredSession, UserSession};

use super::SqliteRepository;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn get_session(&self) -> Result<Option<StoredSession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT token, username, email, is_admin, is_moder, is_active, saved_at
            FROM auth_session
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(StoredSession {
            token: row.try_get("token").map_err(ser)?,
            user: UserSession {
                username: row.try_get("username").map_err(ser)?,
                email: row.try_get("email").map_err(ser)?,
                is_admin: row.try_get("is_admin").map_err(ser)?,
                is_moder: row.try_get("is_moder").map_err(ser)?,
                is_active: row.try_get("is_active").map_err(ser)?,
            },
            saved_at: row.try_get("saved_at").map_err(ser)?,
        }))
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO auth_session (
                id, token, username, email, is_admin, is_moder, is_active, saved_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                username = excluded.username,
                email = excluded.email,
                is_admin = excluded.is_admin,
                is_moder = excluded.is_moder,
                is_active = excluded.is_active,
                saved_at = excluded.saved_at
            ",
        )
        .bind(1_i64)
        .bind(&session.token)
        .bind(&session.user.username)
        .bind(&session.user.email)
        .bind(session.user.is_admin)
        .bind(session.user.is_moder)
        .bind(session.user.is_active)
        .bind(session.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM auth_session WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
