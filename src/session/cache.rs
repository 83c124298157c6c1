use std::sync::Arc;

use chrono::Utc;

use crate::api::{AuthResponse, RefreshResponse};
use crate::error::Result;
use crate::storage::{KeyValueStore, SESSION_KEY, WS_TOKEN_KEY};

use super::types::{Role, Session, StoredSession};

/// Session cache over a key/value store.
///
/// Expiry is checked lazily on every read; nothing runs in the background.
#[derive(Clone)]
pub struct SessionCache {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    /// Cache over the given store; nothing is read until first use
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Backing key/value store
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Persist the session from a login/register response.
    ///
    /// Only the user, the expiry and the WebSocket token are written.
    pub fn save_session(&self, auth: &AuthResponse) -> Result<Session> {
        let stored = StoredSession {
            user: auth.user.clone(),
            expires_at: auth.expiry(Utc::now()),
        };
        self.write(&stored, auth.ws_token.as_deref())?;

        tracing::debug!(user_id = %stored.user.id, expires_at = %stored.expires_at, "Session saved");

        Ok(Session {
            user: stored.user,
            ws_token: auth.ws_token.clone(),
            expires_at: stored.expires_at,
        })
    }

    /// Extend the current session after a token refresh.
    ///
    /// Returns `None` when there is no live session and the response carries
    /// no user to rebuild one from.
    pub fn apply_refresh(&self, refresh: &RefreshResponse) -> Result<Option<Session>> {
        let user = match refresh.user.clone().or_else(|| self.get_session().map(|s| s.user)) {
            Some(user) => user,
            None => return Ok(None),
        };

        let stored = StoredSession {
            user,
            expires_at: refresh.expiry(Utc::now()),
        };

        let ws_token = match refresh.ws_token.clone() {
            Some(token) => Some(token),
            None => self.ws_token(),
        };
        self.write(&stored, ws_token.as_deref())?;

        Ok(Some(Session {
            user: stored.user,
            ws_token,
            expires_at: stored.expires_at,
        }))
    }

    /// Current session, or `None` if missing, unreadable or expired.
    ///
    /// Expired and unreadable entries are removed as a side effect.
    pub fn get_session(&self) -> Option<Session> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session");
                return None;
            }
        };

        let stored: StoredSession = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding malformed session");
                self.clear_session();
                return None;
            }
        };

        if stored.expires_at <= Utc::now() {
            tracing::debug!(user_id = %stored.user.id, "Session expired");
            self.clear_session();
            return None;
        }

        Some(Session {
            user: stored.user,
            ws_token: self.ws_token(),
            expires_at: stored.expires_at,
        })
    }

    /// Remove the session and the WebSocket token
    pub fn clear_session(&self) {
        for key in [SESSION_KEY, WS_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key = %key, error = %e, "Failed to remove session entry");
            }
        }
    }

    /// Stored WebSocket auth token, if any
    pub fn ws_token(&self) -> Option<String> {
        match self.storage.get(WS_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read WebSocket token");
                None
            }
        }
    }

    /// Whether an unexpired session is stored
    pub fn is_authenticated(&self) -> bool {
        self.get_session().is_some()
    }

    /// Admins satisfy every role check
    pub fn has_role(&self, role: Role) -> bool {
        self.get_session().is_some_and(|s| s.has_role(role))
    }

    /// Remaining lifetime of the current session
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.get_session().map(|s| s.expires_at - Utc::now())
    }

    fn write(&self, stored: &StoredSession, ws_token: Option<&str>) -> Result<()> {
        let json = serde_json::to_string(stored)?;
        self.storage.set(SESSION_KEY, &json)?;

        match ws_token {
            Some(token) => self.storage.set(WS_TOKEN_KEY, token)?,
            None => self.storage.remove(WS_TOKEN_KEY)?,
        }
        Ok(())
    }
}
