use async_trait::async_trait;
use dedaena_core::model::{Preferences, StoredSession};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Locally persisted player preferences (a single row).
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Load the stored preferences, if any were saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_preferences(&self) -> Result<Option<Preferences>, StorageError>;

    /// Persist preferences, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preferences cannot be stored.
    async fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError>;
}

/// The signed-in session: bearer token plus the cached user.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_session(&self) -> Result<Option<StoredSession>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn save_session(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Forget the stored session. Clearing when nothing is stored is fine.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for tests and throwaway runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    preferences: Arc<Mutex<Option<Preferences>>>,
    session: Arc<Mutex<Option<StoredSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferencesRepository for InMemoryRepository {
    async fn get_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        let guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        let mut guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(preferences.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn get_session(&self) -> Result<Option<StoredSession>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.take();
        Ok(())
    }
}

/// Aggregates the local repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferencesRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let preferences: Arc<dyn PreferencesRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo);
        Self {
            preferences,
            sessions,
        }
    }
}
