use std::sync::Arc;

use chrono::{DateTime, Utc};
use dedaena_core::Clock;
use dedaena_core::model::{StoredSession, UserRecord, UserSession};
use serde::{Deserialize, Serialize};
use storage::repository::SessionRepository;

use crate::api::ApiClient;
use crate::error::{ApiError, AuthError};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserSession,
}

impl TokenResponse {
    fn into_session(self, saved_at: DateTime<Utc>) -> StoredSession {
        StoredSession {
            token: self.access_token,
            user: self.user,
            saved_at,
        }
    }
}

/// New account details.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Local checks mirroring the backend's limits, so obvious mistakes are
    /// reported without a round trip.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` naming the first bad field.
    pub fn validate(self) -> Result<Self, AuthError> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_lowercase();
        if !(3..=50).contains(&username.chars().count()) {
            return Err(AuthError::InvalidInput("username must be 3 to 50 characters"));
        }
        if !looks_like_email(&email) {
            return Err(AuthError::InvalidInput("email address is not valid"));
        }
        if self.password.chars().count() < 6 {
            return Err(AuthError::InvalidInput("password must be at least 6 characters"));
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
}

/// Sign-in, sign-up and the locally stored session.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    sessions: Arc<dyn SessionRepository>,
    clock: Clock,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient, sessions: Arc<dyn SessionRepository>, clock: Clock) -> Self {
        Self {
            api,
            sessions,
            clock,
        }
    }

    /// Exchange credentials for a token and persist the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` when the backend rejects the credentials and
    /// `AuthError::Storage` if the session cannot be saved.
    pub async fn login(&self, username: &str, password: &str) -> Result<StoredSession, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput("username and password are required"));
        }
        let response: TokenResponse = self
            .api
            .post(
                "auth/login",
                &LoginRequest {
                    username: username.trim(),
                    password,
                },
                None,
            )
            .await?;

        let session = response.into_session(self.clock.now());
        self.sessions.save_session(&session).await?;
        tracing::info!(username = %session.user.username, role = session.user.role().as_str(), "signed in");
        Ok(session)
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for local validation failures and
    /// `AuthError::Api` when the backend refuses (e.g. name taken).
    pub async fn register(&self, registration: Registration) -> Result<UserRecord, AuthError> {
        let registration = registration.validate()?;
        let user: UserRecord = self.api.post("auth/register", &registration, None).await?;
        tracing::info!(username = %user.username, "registered");
        Ok(user)
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear_session().await?;
        tracing::info!("signed out");
        Ok(())
    }

    /// The stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session cannot be read.
    pub async fn current(&self) -> Result<Option<StoredSession>, AuthError> {
        Ok(self.sessions.get_session().await?)
    }

    /// The stored session or `ApiError::MissingToken`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api(ApiError::MissingToken)` when signed out.
    pub async fn require_session(&self) -> Result<StoredSession, AuthError> {
        self.current()
            .await?
            .ok_or(AuthError::Api(ApiError::MissingToken))
    }

    /// Drop the stored session when `err` says the token was rejected.
    ///
    /// Returns whether the session was cleared.
    pub async fn handle_api_error(&self, err: &ApiError) -> bool {
        if !matches!(err, ApiError::Unauthorized { .. }) {
            return false;
        }
        match self.sessions.clear_session().await {
            Ok(()) => {
                tracing::warn!(error = %err, "token rejected, session cleared");
                true
            }
            Err(storage_err) => {
                tracing::error!(error = %storage_err, "failed to clear rejected session");
                false
            }
        }
    }
}
