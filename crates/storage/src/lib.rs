//! Local persistence: player preferences and the signed-in session.

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, PreferencesRepository, SessionRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
