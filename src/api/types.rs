use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::session::User;

/// Session lifetime assumed when the backend omits both expiry fields
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
}

/// Body returned by `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    /// Primary access token; never persisted client-side
    #[serde(default)]
    pub access_token: Option<String>,
    /// Primary refresh token; never persisted client-side
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Narrowly scoped token for the WebSocket handshake
    #[serde(default)]
    pub ws_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthResponse {
    pub fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        resolve_expiry(self.expires_at, self.expires_in, now)
    }
}

/// Body returned by `/auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub ws_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RefreshResponse {
    pub fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        resolve_expiry(self.expires_at, self.expires_in, now)
    }
}

fn resolve_expiry(
    expires_at: Option<DateTime<Utc>>,
    expires_in: Option<i64>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    expires_at.unwrap_or_else(|| {
        now + Duration::seconds(expires_in.unwrap_or(DEFAULT_SESSION_TTL_SECONDS))
    })
}

/// Reserve figures for one currency; computed server-side, display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub currency: String,
    pub total_supply: f64,
    pub total_reserves: f64,
    /// Collateralization percentage
    pub reserve_ratio: f64,
    #[serde(default)]
    pub last_attestation: Option<Attestation>,
    #[serde(default)]
    pub breakdown: Vec<ReserveAsset>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveAsset {
    pub asset_type: String,
    pub amount: f64,
    pub percentage: f64,
    #[serde(default)]
    pub custodian: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    pub id: String,
    pub attested_at: DateTime<Utc>,
    pub auditor: String,
    #[serde(default)]
    pub report_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OraclePrice {
    pub pair: String,
    pub price: f64,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdateRequest {
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Mint or burn request; `amount` is a decimal string in token units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub currency: String,
    pub amount: String,
    pub wallet_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResponse {
    pub operation_id: String,
    pub status: OperationStatus,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycSubmissionResponse {
    pub submission_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Error body shapes the backend uses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).or(self.detail)
    }
}
