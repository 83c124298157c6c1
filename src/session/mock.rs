//! Development-only mock sessions

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::api::AuthResponse;
use crate::error::{is_production_mode, AppError, Result};

use super::cache::SessionCache;
use super::types::{Role, Session, User};

/// Lifetime of a mock session
const MOCK_SESSION_HOURS: i64 = 24;

impl SessionCache {
    /// Create and persist a session for a mock user.
    ///
    /// Refuses to run when `run_mode` names a production-like environment.
    /// Every call issues a fresh random token.
    pub fn create_mock_session(&self, run_mode: &str, role: Role) -> Result<Session> {
        if is_production_mode(run_mode) {
            return Err(AppError::Auth(
                "Mock sessions are not available in production".to_string(),
            ));
        }

        let auth = AuthResponse {
            user: User {
                id: format!("mock-{}", role.as_str().to_ascii_lowercase()),
                email: format!("{}@mock.meridian.local", role.as_str().to_ascii_lowercase()),
                name: format!("Mock {}", role),
                role,
                institution_id: None,
            },
            access_token: None,
            refresh_token: None,
            ws_token: Some(format!("mock_{}", Uuid::new_v4().simple())),
            expires_in: None,
            expires_at: Some(Utc::now() + Duration::hours(MOCK_SESSION_HOURS)),
        };

        tracing::warn!(role = %role, run_mode = %run_mode, "Creating mock session");
        self.save_session(&auth)
    }
}
