//! Locally persisted session cache
//!
//! Only the user profile, the expiry and a narrowly scoped WebSocket token are
//! stored. Access and refresh tokens live in the backend's httpOnly cookie and
//! never touch local storage.

mod cache;
mod mock;
mod types;

pub use cache::SessionCache;
pub use types::{Role, Session, User};
