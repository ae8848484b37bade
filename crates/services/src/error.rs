//! Shared error types for the services crate.

use reqwest::StatusCode;
use thiserror::Error;

use dedaena_core::model::ContentError;
use dedaena_core::progression::ProgressionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Failures talking to the backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401 or 403 from a protected endpoint.
    #[error("not authorized ({status}): {detail}")]
    Unauthorized { status: StatusCode, detail: String },

    #[error("not found: {detail}")]
    NotFound { detail: String },

    #[error("request failed with status {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("not signed in")]
    MissingToken,

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for errors that mean the stored token is no good.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::MissingToken)
    }

    /// Text to show the user: the backend's `detail` when there is one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { detail, .. }
            | ApiError::NotFound { detail }
            | ApiError::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors emitted by `GameService` and `GameSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error("table {0:?} has no tours")]
    EmptyTable(String),
    /// A load finished after the player had already moved elsewhere.
    #[error("response for generation {requested} arrived after generation {current}")]
    StaleResponse { requested: u64, current: u64 },
    #[error("game state lock poisoned")]
    StatePoisoned,
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ModerationService` and `ContentBoard`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModerationError {
    #[error("moderator or admin role required")]
    Forbidden,
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AdminService` and `UserBoard`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("admin role required")]
    Forbidden,
    #[error("user {0} is not on the board")]
    UnknownUser(dedaena_core::model::UserId),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
