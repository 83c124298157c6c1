use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Non-2xx response from the backend
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the backend rejected the caller's credentials
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::Auth(_) => true,
            AppError::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

/// Whether the given run mode names a production-like environment
pub fn is_production_mode(mode: &str) -> bool {
    matches!(mode.trim().to_ascii_lowercase().as_str(), "production" | "prod")
}

pub type Result<T> = std::result::Result<T, AppError>;
