use std::sync::Arc;

use async_trait::async_trait;
use dedaena_core::model::{
    AuditLogPage, AuditQuery, AuditStats, RoleFlag, RoleUpdate, StoredSession, UserFilter,
    UserId, UserRecord,
};
use serde::Deserialize;
use storage::repository::SessionRepository;

use crate::api::ApiClient;
use crate::error::{AdminError, ApiError};

//
// ─── REMOTE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

/// Admin endpoints of the backend. All calls need an admin token.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self, token: &str) -> Result<UserList, ApiError>;
    async fn toggle_active(&self, id: UserId, token: &str) -> Result<(), ApiError>;
    async fn update_role(&self, id: UserId, update: RoleUpdate, token: &str)
    -> Result<(), ApiError>;
    async fn delete_user(&self, id: UserId, token: &str) -> Result<(), ApiError>;
    async fn audit_logs(&self, query: &AuditQuery, token: &str) -> Result<AuditLogPage, ApiError>;
    async fn audit_stats(&self, token: &str) -> Result<AuditStats, ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpAdminApi {
    api: ApiClient,
}

impl HttpAdminApi {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn list_users(&self, token: &str) -> Result<UserList, ApiError> {
        self.api.get("admin/users", Some(token)).await
    }

    async fn toggle_active(&self, id: UserId, token: &str) -> Result<(), ApiError> {
        self.api
            .patch::<()>(&format!("admin/users/{id}/toggle-active"), None, Some(token))
            .await
    }

    async fn update_role(
        &self,
        id: UserId,
        update: RoleUpdate,
        token: &str,
    ) -> Result<(), ApiError> {
        self.api
            .patch(&format!("admin/users/{id}/role"), Some(&update), Some(token))
            .await
    }

    async fn delete_user(&self, id: UserId, token: &str) -> Result<(), ApiError> {
        self.api
            .delete(&format!("admin/users/{id}"), Some(token))
            .await
    }

    async fn audit_logs(&self, query: &AuditQuery, token: &str) -> Result<AuditLogPage, ApiError> {
        self.api
            .get_with_query("admin/audit/logs", &query.to_pairs(), Some(token))
            .await
    }

    async fn audit_stats(&self, token: &str) -> Result<AuditStats, ApiError> {
        self.api.get("admin/audit/stats", Some(token)).await
    }
}

//
// ─── BOARD ─────────────────────────────────────────────────────────────────────
//

/// The admin's local copy of the users table.
#[derive(Debug, Clone, Default)]
pub struct UserBoard {
    users: Vec<UserRecord>,
    total: u64,
    pub filter: UserFilter,
}

impl UserBoard {
    #[must_use]
    pub fn new(list: UserList) -> Self {
        Self {
            users: list.users,
            total: list.total,
            filter: UserFilter::default(),
        }
    }

    #[must_use]
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&UserRecord> {
        self.filter.apply(&self.users).collect()
    }

    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id == id)
    }

    fn position_of(&self, id: UserId) -> Result<usize, AdminError> {
        self.users
            .iter()
            .position(|user| user.id == id)
            .ok_or(AdminError::UnknownUser(id))
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// User administration and audit views. Admins only.
///
/// User changes are applied to the board before the request and restored if
/// it fails.
#[derive(Clone)]
pub struct AdminService {
    remote: Arc<dyn AdminApi>,
    sessions: Arc<dyn SessionRepository>,
}

impl AdminService {
    #[must_use]
    pub fn new(remote: Arc<dyn AdminApi>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { remote, sessions }
    }

    async fn admin_session(&self) -> Result<StoredSession, AdminError> {
        let session = self
            .sessions
            .get_session()
            .await?
            .ok_or(AdminError::Api(ApiError::MissingToken))?;
        if !session.user.is_admin() {
            return Err(AdminError::Forbidden);
        }
        Ok(session)
    }

    async fn fail(&self, err: ApiError) -> AdminError {
        if matches!(err, ApiError::Unauthorized { .. }) {
            match self.sessions.clear_session().await {
                Ok(()) => tracing::warn!("admin token rejected, session cleared"),
                Err(storage_err) => {
                    tracing::error!(error = %storage_err, "failed to clear rejected session");
                }
            }
        }
        AdminError::Api(err)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins and `AdminError::Api`
    /// when signed out or the request fails.
    pub async fn load_users(&self) -> Result<UserBoard, AdminError> {
        let session = self.admin_session().await?;
        match self.remote.list_users(&session.token).await {
            Ok(list) => {
                tracing::info!(users = list.users.len(), "users loaded");
                Ok(UserBoard::new(list))
            }
            Err(err) => Err(self.fail(err).await),
        }
    }

    /// Flip a user's active flag.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownUser` if the user is not on the board, or
    /// `AdminError::Api` after rolling back a refused change.
    pub async fn toggle_active(&self, board: &mut UserBoard, id: UserId) -> Result<(), AdminError> {
        let session = self.admin_session().await?;
        let index = board.position_of(id)?;
        let previous = board.users[index].clone();
        board.users[index].is_active = !previous.is_active;

        match self.remote.toggle_active(id, &session.token).await {
            Ok(()) => {
                tracing::info!(user = %id, active = !previous.is_active, "user active flag changed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user = %id, error = %err, "toggle refused, rolling back");
                board.users[index] = previous;
                Err(self.fail(err).await)
            }
        }
    }

    /// Grant or revoke the admin or moderator flag.
    ///
    /// # Errors
    ///
    /// See [`AdminService::toggle_active`].
    pub async fn set_role(
        &self,
        board: &mut UserBoard,
        id: UserId,
        flag: RoleFlag,
        value: bool,
    ) -> Result<(), AdminError> {
        let session = self.admin_session().await?;
        let index = board.position_of(id)?;
        let previous = board.users[index].clone();
        let update = RoleUpdate::set(flag, value);
        update.apply_to(&mut board.users[index]);

        match self.remote.update_role(id, update, &session.token).await {
            Ok(()) => {
                tracing::info!(user = %id, ?flag, value, "user role changed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user = %id, error = %err, "role change refused, rolling back");
                board.users[index] = previous;
                Err(self.fail(err).await)
            }
        }
    }

    /// Remove a user.
    ///
    /// # Errors
    ///
    /// See [`AdminService::toggle_active`].
    pub async fn delete_user(&self, board: &mut UserBoard, id: UserId) -> Result<(), AdminError> {
        let session = self.admin_session().await?;
        let index = board.position_of(id)?;
        let removed = board.users.remove(index);
        board.total = board.total.saturating_sub(1);

        match self.remote.delete_user(id, &session.token).await {
            Ok(()) => {
                tracing::info!(user = %id, username = %removed.username, "user deleted");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user = %id, error = %err, "delete refused, rolling back");
                board.users.insert(index, removed);
                board.total += 1;
                Err(self.fail(err).await)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins and `AdminError::Api`
    /// when the request fails.
    pub async fn audit_logs(&self, query: &AuditQuery) -> Result<AuditLogPage, AdminError> {
        let session = self.admin_session().await?;
        match self.remote.audit_logs(query, &session.token).await {
            Ok(page) => Ok(page),
            Err(err) => Err(self.fail(err).await),
        }
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins and `AdminError::Api`
    /// when the request fails.
    pub async fn audit_stats(&self) -> Result<AuditStats, AdminError> {
        let session = self.admin_session().await?;
        match self.remote.audit_stats(&session.token).await {
            Ok(stats) => Ok(stats),
            Err(err) => Err(self.fail(err).await),
        }
    }
}
