use crate::session::{Role, Session, SessionCache};

/// Outcome of a protected-route check
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Granted(Session),
    /// No live session; send the user to the login page
    Unauthenticated,
    Forbidden { required: Role, actual: Role },
}

impl Access {
    /// Whether the route may render
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

/// Gate a protected route on a live session and, optionally, a role
pub fn check_access(sessions: &SessionCache, required: Option<Role>) -> Access {
    let Some(session) = sessions.get_session() else {
        return Access::Unauthenticated;
    };

    match required {
        Some(role) if !session.has_role(role) => {
            tracing::debug!(required = %role, actual = %session.user.role, "Access denied");
            Access::Forbidden {
                required: role,
                actual: session.user.role,
            }
        }
        _ => Access::Granted(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_unauthenticated_without_session() {
        let sessions = SessionCache::new(Arc::new(MemoryStore::new()));
        assert_eq!(check_access(&sessions, None), Access::Unauthenticated);
    }

    #[test]
    fn test_role_gate() {
        let sessions = SessionCache::new(Arc::new(MemoryStore::new()));
        sessions.create_mock_session("development", Role::Viewer).unwrap();

        assert!(check_access(&sessions, None).is_granted());
        assert_eq!(
            check_access(&sessions, Some(Role::Compliance)),
            Access::Forbidden {
                required: Role::Compliance,
                actual: Role::Viewer
            }
        );
    }

    #[test]
    fn test_admin_passes_every_gate() {
        let sessions = SessionCache::new(Arc::new(MemoryStore::new()));
        sessions.create_mock_session("development", Role::Admin).unwrap();
        assert!(check_access(&sessions, Some(Role::Institution)).is_granted());
    }
}
