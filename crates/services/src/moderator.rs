use std::sync::Arc;

use async_trait::async_trait;
use dedaena_core::Clock;
use dedaena_core::analysis::{DetectedTour, WordIndex, detect_tour};
use dedaena_core::model::{
    ContentChange, ContentCounts, ContentFilter, ContentItem, ContentRequest, StoredSession,
    TourList, flatten,
};
use serde::Deserialize;
use storage::repository::SessionRepository;

use crate::api::ApiClient;
use crate::error::{ApiError, ModerationError};

//
// ─── REMOTE ────────────────────────────────────────────────────────────────────
//

/// Moderator endpoints of the backend.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// Full editable data of a table.
    async fn fetch_tours(&self, table: &str, token: &str) -> Result<TourList, ApiError>;

    /// Send one content change.
    async fn send_change(
        &self,
        table: &str,
        change: &ContentChange,
        request: &ContentRequest,
        token: &str,
    ) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct ModeratorData {
    #[serde(default)]
    data: TourList,
}

#[derive(Clone, Debug)]
pub struct HttpModerationApi {
    api: ApiClient,
}

impl HttpModerationApi {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ModerationApi for HttpModerationApi {
    async fn fetch_tours(&self, table: &str, token: &str) -> Result<TourList, ApiError> {
        let body: ModeratorData = self
            .api
            .get(&format!("moderator/dedaena/{table}"), Some(token))
            .await?;
        Ok(body.data)
    }

    async fn send_change(
        &self,
        table: &str,
        change: &ContentChange,
        request: &ContentRequest,
        token: &str,
    ) -> Result<(), ApiError> {
        let path = format!(
            "moderator/dedaena/{table}/{}/{}",
            change.kind().endpoint(),
            change.action().endpoint()
        );
        self.api.patch(&path, Some(request), Some(token)).await
    }
}

//
// ─── BOARD ─────────────────────────────────────────────────────────────────────
//

/// The moderator's local copy of a table, edited optimistically.
#[derive(Debug, Clone)]
pub struct ContentBoard {
    table: String,
    tours: TourList,
    pub filter: Option<ContentFilter>,
}

impl ContentBoard {
    #[must_use]
    pub fn new(table: impl Into<String>, tours: TourList) -> Self {
        Self {
            table: table.into(),
            tours,
            filter: None,
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn tours(&self) -> &TourList {
        &self.tours
    }

    #[must_use]
    pub fn items(&self) -> Vec<ContentItem> {
        flatten(&self.tours)
    }

    /// Items passing the current filter; every item when there is none.
    #[must_use]
    pub fn visible_items(&self) -> Vec<ContentItem> {
        let items = self.items();
        match &self.filter {
            Some(filter) => items.into_iter().filter(|item| filter.matches(item)).collect(),
            None => items,
        }
    }

    #[must_use]
    pub fn counts(&self) -> ContentCounts {
        ContentCounts::from_items(&self.items())
    }

    #[must_use]
    pub fn word_index(&self) -> WordIndex<'_> {
        WordIndex::new(&self.tours)
    }

    /// Suggest the tour for text typed into the add/edit form.
    #[must_use]
    pub fn detect_tour(&self, text: &str) -> Option<DetectedTour> {
        detect_tour(&self.tours, text)
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Content editing for moderators and admins.
///
/// Every change is applied to the board first, then sent; if the backend
/// refuses, the board is rolled back.
#[derive(Clone)]
pub struct ModerationService {
    remote: Arc<dyn ModerationApi>,
    sessions: Arc<dyn SessionRepository>,
    clock: Clock,
}

impl ModerationService {
    #[must_use]
    pub fn new(
        remote: Arc<dyn ModerationApi>,
        sessions: Arc<dyn SessionRepository>,
        clock: Clock,
    ) -> Self {
        Self {
            remote,
            sessions,
            clock,
        }
    }

    async fn moderator_session(&self) -> Result<StoredSession, ModerationError> {
        let session = self
            .sessions
            .get_session()
            .await?
            .ok_or(ModerationError::Api(ApiError::MissingToken))?;
        if !session.user.can_moderate() {
            return Err(ModerationError::Forbidden);
        }
        Ok(session)
    }

    async fn on_api_error(&self, err: &ApiError) {
        if matches!(err, ApiError::Unauthorized { .. }) {
            if let Err(storage_err) = self.sessions.clear_session().await {
                tracing::error!(error = %storage_err, "failed to clear rejected session");
            } else {
                tracing::warn!("moderator token rejected, session cleared");
            }
        }
    }

    /// Fetch the table into a fresh board.
    ///
    /// # Errors
    ///
    /// Returns `ModerationError::Forbidden` for plain users,
    /// `ModerationError::Api` when signed out or the request fails.
    pub async fn load_board(&self, table: &str) -> Result<ContentBoard, ModerationError> {
        let session = self.moderator_session().await?;
        match self.remote.fetch_tours(table, &session.token).await {
            Ok(tours) => {
                tracing::info!(table, tours = tours.len(), "moderator data loaded");
                Ok(ContentBoard::new(table, tours))
            }
            Err(err) => {
                self.on_api_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Apply `change` to the board and send it.
    ///
    /// # Errors
    ///
    /// Returns `ModerationError::Content` for blank content or a missing entry
    /// (the board is untouched), and `ModerationError::Api` when the backend
    /// refuses (the board is rolled back).
    pub async fn submit(
        &self,
        board: &mut ContentBoard,
        change: ContentChange,
    ) -> Result<(), ModerationError> {
        let session = self.moderator_session().await?;
        let request = change.to_request(&board.table, &session.user.username, self.clock.now())?;
        let applied = board.tours.apply_change(&change)?;

        let kind = change.kind();
        let action = change.action().endpoint();
        match self
            .remote
            .send_change(&board.table, &change, &request, &session.token)
            .await
        {
            Ok(()) => {
                tracing::info!(%kind, action, position = %change.position(), "content change saved");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%kind, action, error = %err, "content change refused, rolling back");
                if let Err(revert_err) = board.tours.revert_change(applied) {
                    tracing::error!(error = %revert_err, "rollback failed");
                }
                self.on_api_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Re-fetch the board's table, replacing local state.
    ///
    /// # Errors
    ///
    /// See [`ModerationService::load_board`].
    pub async fn refresh(&self, board: &mut ContentBoard) -> Result<(), ModerationError> {
        let fresh = self.load_board(&board.table).await?;
        board.tours = fresh.tours;
        Ok(())
    }
}
