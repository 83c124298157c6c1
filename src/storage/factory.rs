//! Storage backend factory

use std::sync::Arc;

use crate::config::StorageConfig;

use super::file_backend::FileStore;
use super::memory_backend::MemoryStore;
use super::KeyValueStore;

/// Create a storage backend based on configuration.
///
/// - `"file"`: a `FileStore` at `settings.path`, falling back to memory if the
///   file cannot be opened
/// - `"memory"` (default): a `MemoryStore`
pub fn create_storage(settings: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match settings.backend.as_str() {
        "file" => match FileStore::open(&settings.path) {
            Ok(store) => {
                tracing::info!(backend = "file", path = %settings.path, "Creating file storage backend");
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!(
                    path = %settings.path,
                    error = %e,
                    "File storage unavailable, falling back to memory"
                );
                Arc::new(MemoryStore::new())
            }
        },
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown storage backend, using memory");
            }
            tracing::info!(backend = "memory", "Creating memory storage backend");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        let store = create_storage(&StorageConfig::default());
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: "file".to_string(),
            path: dir.path().join("s.json").to_string_lossy().into_owned(),
        };
        assert_eq!(create_storage(&config).backend_name(), "file");
    }
}
