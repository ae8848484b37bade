use std::sync::{Arc, Mutex, MutexGuard};

use dedaena_core::model::{PositionDetail, TourPosition, TourSummary};
use dedaena_core::{AdvanceOutcome, GameState, InputClearPolicy};

use crate::content::ContentSource;
use crate::error::GameError;

/// Starts play sessions for one content table.
#[derive(Clone)]
pub struct GameService {
    source: Arc<dyn ContentSource>,
    table: String,
    clear_policy: InputClearPolicy,
}

impl GameService {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, table: impl Into<String>) -> Self {
        Self {
            source,
            table: table.into(),
            clear_policy: InputClearPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_clear_policy(mut self, policy: InputClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Load the table and start a session at `position`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Api` if the tours cannot be fetched,
    /// `GameError::EmptyTable` when the table has no tours and
    /// `GameError::Progression` when `position` is not one of them.
    pub async fn start(&self, position: TourPosition) -> Result<GameSession, GameError> {
        tracing::info!(table = %self.table, %position, "loading tours");
        let tours = self.source.load_all(&self.table).await?;
        if tours.is_empty() {
            return Err(GameError::EmptyTable(self.table.clone()));
        }
        tracing::info!(table = %self.table, tours = tours.len(), "tours loaded");

        let state = GameState::new(tours, position)?.with_clear_policy(self.clear_policy);
        Ok(GameSession {
            source: Arc::clone(&self.source),
            table: self.table.clone(),
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Table of contents for the configured table.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Api` if the request fails.
    pub async fn table_of_contents(&self) -> Result<Vec<TourSummary>, GameError> {
        Ok(self.source.general_info(&self.table).await?)
    }
}

/// A running game: the state store plus the source it loads detail from.
///
/// The lock is never held across an await. Position loads are stamped with
/// the state's generation and dropped if the player moved meanwhile.
#[derive(Clone)]
pub struct GameSession {
    source: Arc<dyn ContentSource>,
    table: String,
    state: Arc<Mutex<GameState>>,
}

impl GameSession {
    fn lock(&self) -> Result<MutexGuard<'_, GameState>, GameError> {
        self.state.lock().map_err(|_| GameError::StatePoisoned)
    }

    /// Run `f` against the state.
    ///
    /// # Errors
    ///
    /// Returns `GameError::StatePoisoned` if a previous update panicked.
    pub fn update<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> Result<R, GameError> {
        let mut state = self.lock()?;
        Ok(f(&mut state))
    }

    /// A copy of the current state for rendering.
    ///
    /// # Errors
    ///
    /// Returns `GameError::StatePoisoned` if a previous update panicked.
    pub fn snapshot(&self) -> Result<GameState, GameError> {
        Ok(self.lock()?.clone())
    }

    /// Fetch the detail of the current tour.
    ///
    /// # Errors
    ///
    /// Returns `GameError::StaleResponse` when the position changed while the
    /// request was in flight, or `GameError::Api` when it failed.
    pub async fn load_current_detail(&self) -> Result<PositionDetail, GameError> {
        let (generation, position) = {
            let state = self.lock()?;
            (state.generation(), state.position())
        };

        let detail = self.source.load_position(&self.table, position).await?;

        let current = self.lock()?.generation();
        if current != generation {
            tracing::debug!(%position, requested = generation, current, "dropping stale position detail");
            return Err(GameError::StaleResponse {
                requested: generation,
                current,
            });
        }
        Ok(detail)
    }

    /// Jump to `position` and load its detail.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Progression` for an unknown position, otherwise
    /// see [`GameSession::load_current_detail`].
    pub async fn go_to(&self, position: TourPosition) -> Result<PositionDetail, GameError> {
        self.update(|state| state.go_to(position))??;
        tracing::info!(%position, "moved to tour");
        self.load_current_detail().await
    }

    /// Move to the next tour and load its detail. `None` at the last tour.
    ///
    /// # Errors
    ///
    /// See [`GameSession::load_current_detail`].
    pub async fn advance(&self) -> Result<Option<PositionDetail>, GameError> {
        match self.update(GameState::advance)? {
            AdvanceOutcome::Moved(position) => {
                tracing::info!(%position, "advanced to tour");
                self.load_current_detail().await.map(Some)
            }
            AdvanceOutcome::NoMoreTours => {
                tracing::info!("already at the last tour");
                Ok(None)
            }
        }
    }
}
