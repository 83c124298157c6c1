//! Persistent key/value storage for client state
//!
//! Stands in for browser local storage: string keys, string values,
//! synchronous access.
//!
//! # Backends
//!
//! - `MemoryStore`: process-lifetime storage, used in tests and ephemeral runs
//! - `FileStore`: JSON file on disk, survives restarts

mod factory;
mod file_backend;
mod memory_backend;

pub use factory::create_storage;
pub use file_backend::FileStore;
pub use memory_backend::MemoryStore;

use crate::error::Result;

/// Storage key holding the serialized session (user + expiry)
pub const SESSION_KEY: &str = "meridian_session";

/// Storage key holding the bare WebSocket auth token
pub const WS_TOKEN_KEY: &str = "meridian_ws_token";

/// String key/value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
