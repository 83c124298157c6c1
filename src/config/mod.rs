mod settings;

pub use settings::{PollingConfig, RealtimeConfig, Settings, StorageConfig};
