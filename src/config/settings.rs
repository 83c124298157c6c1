use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::error::is_production_mode;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Deployment mode (`development`, `staging`, `production`)
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
    /// REST backend base URL (`NEXT_PUBLIC_API_URL`)
    pub api_url: Option<String>,
    /// WebSocket endpoint (`NEXT_PUBLIC_WS_URL`)
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    pub walletconnect_project_id: Option<String>,
    pub sepolia_rpc_url: Option<String>,
    pub token_address: Option<String>,
    pub reserve_oracle_address: Option<String>,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Base reconnect delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Reconnect attempts before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Channels requested in the `subscribe` message
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_channels() -> Vec<String> {
    vec![
        "reserve_update".to_string(),
        "price_update".to_string(),
        "attestation_update".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `file`
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Location of the JSON store when the file backend is used
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_storage_path() -> String {
    ".meridian/storage.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Reserve polling interval in seconds
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_currencies() -> Vec<String> {
    vec!["USD".to_string(), "EUR".to_string(), "GBP".to_string()]
}

fn default_run_mode() -> String {
    "development".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

const DEV_API_URL: &str = "http://localhost:8000/api";

impl Settings {
    /// Load settings from defaults, config files and `NEXT_PUBLIC_*` variables
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("ws_url", default_ws_url())?
            .set_default("realtime.base_delay_ms", default_base_delay_ms())?
            .set_default("realtime.max_reconnect_attempts", default_max_reconnect_attempts())?
            .set_default("storage.backend", default_storage_backend())?
            .set_default("polling.interval_seconds", default_poll_interval())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // NEXT_PUBLIC_API_URL, NEXT_PUBLIC_WS_URL, NEXT_PUBLIC_REALTIME__BASE_DELAY_MS, ...
            .add_source(
                Environment::with_prefix("NEXT_PUBLIC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("realtime.channels")
                    .with_list_parse_key("polling.currencies"),
            )
            .set_override("run_mode", run_mode)?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Production builds must point at a real backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_production() {
            return Ok(());
        }

        match self.api_url.as_deref().map(str::trim) {
            None | Some("") => Err(ConfigError::Message(
                "NEXT_PUBLIC_API_URL must be set in production".to_string(),
            )),
            Some(url) if is_local_url(url) => Err(ConfigError::Message(format!(
                "NEXT_PUBLIC_API_URL points at a local address in production: {}",
                url
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Whether `run_mode` names a production deployment
    pub fn is_production(&self) -> bool {
        is_production_mode(&self.run_mode)
    }

    /// Base URL for REST calls, without a trailing slash
    pub fn api_base_url(&self) -> String {
        self.api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEV_API_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

fn is_local_url(url: &str) -> bool {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let host = without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_mode: default_run_mode(),
            api_url: None,
            ws_url: default_ws_url(),
            walletconnect_project_id: None,
            sepolia_rpc_url: None,
            token_address: None,
            reserve_oracle_address: None,
            realtime: RealtimeConfig::default(),
            storage: StorageConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            channels: default_channels(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_poll_interval(),
            currencies: default_currencies(),
        }
    }
}
