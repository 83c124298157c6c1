//! REST client for the Meridian backend

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    AgentSummary, Attestation, AuthResponse, KycSubmissionResponse, LoginRequest,
    OperationRequest, OperationResponse, OperationStatus, OraclePrice, PriceUpdateRequest,
    RefreshResponse, RegisterRequest, ReserveAsset, ReserveSnapshot,
    DEFAULT_SESSION_TTL_SECONDS,
};
