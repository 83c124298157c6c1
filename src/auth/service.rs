use crate::api::{ApiClient, RegisterRequest};
use crate::error::{AppError, Result};
use crate::session::{Role, Session, SessionCache, User};

use super::guard::{check_access, Access};

/// Login/logout flows that keep the session cache in step with the backend
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    sessions: SessionCache,
}

impl AuthService {
    /// Build a service over an API client and the session cache it keeps current
    pub fn new(api: ApiClient, sessions: SessionCache) -> Self {
        Self { api, sessions }
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Log in and cache the session; access and refresh tokens are never stored
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let response = self.api.login(email, password).await?;
        let session = self.sessions.save_session(&response)?;
        tracing::info!(user_id = %session.user.id, role = %session.user.role, "Logged in");
        Ok(session.user)
    }

    /// Create an account and cache the resulting session
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let response = self.api.register(request).await?;
        let session = self.sessions.save_session(&response)?;
        tracing::info!(user_id = %session.user.id, "Registered");
        Ok(session.user)
    }

    /// Extend the session via `/auth/refresh`.
    ///
    /// A 401 means the server-side session is gone, so the local one is
    /// cleared too.
    pub async fn refresh(&self) -> Result<Session> {
        let response = match self.api.refresh().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::info!("Refresh rejected, clearing session");
                    self.sessions.clear_session();
                }
                return Err(e);
            }
        };

        self.sessions
            .apply_refresh(&response)?
            .ok_or_else(|| AppError::Auth("No active session to refresh".to_string()))
    }

    /// Best-effort server logout; the local session is always cleared
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Server logout failed");
        }
        self.sessions.clear_session();
        tracing::info!("Logged out");
    }

    /// User of the current unexpired session
    pub fn current_user(&self) -> Option<User> {
        self.sessions.get_session().map(|s| s.user)
    }

    /// Whether an unexpired session is cached
    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.sessions.has_role(role)
    }

    /// Protected-route gate for the current session
    pub fn check_access(&self, required: Option<Role>) -> Access {
        check_access(&self.sessions, required)
    }
}
