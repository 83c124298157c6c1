use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portal roles, as issued by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access; satisfies every role check
    Admin,
    /// Institutional client (mint/burn)
    Institution,
    /// Compliance officer (KYC review, dashboard)
    Compliance,
    /// Read-only access
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Institution => "INSTITUTION",
            Role::Compliance => "COMPLIANCE",
            Role::Viewer => "VIEWER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
}

/// What gets written under the session key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// An unexpired session as seen by callers
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    /// WebSocket-scoped token, if the backend issued one
    pub ws_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Expired once `expires_at` is not in the future
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Whether this session satisfies `role`; admins satisfy every role
    pub fn has_role(&self, role: Role) -> bool {
        self.user.role == Role::Admin || self.user.role == role
    }
}
