use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::onboarding::KycSubmission;

use super::types::{
    AgentSummary, AuthResponse, ErrorBody, KycSubmissionResponse, LoginRequest,
    OperationRequest, OperationResponse, OraclePrice, PriceUpdateRequest, RefreshResponse,
    RegisterRequest, ReserveSnapshot,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Thin JSON client over the backend REST API.
///
/// The underlying client keeps a cookie store, so the httpOnly auth cookie set
/// by `/auth/login` is attached to every later request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Client with a cookie store, so the backend's auth cookie rides along
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("meridian-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(http, base_url))
    }

    /// Wrap a preconfigured `reqwest::Client`
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Auth

    #[tracing::instrument(name = "api.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    #[tracing::instrument(name = "api.register", skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.post("/auth/register", request).await
    }

    #[tracing::instrument(name = "api.refresh", skip(self))]
    pub async fn refresh(&self) -> Result<RefreshResponse> {
        self.send(self.http.post(self.url("/auth/refresh"))).await
    }

    #[tracing::instrument(name = "api.logout", skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.send_empty(self.http.post(self.url("/auth/logout"))).await
    }

    // Reserves and oracle

    #[tracing::instrument(name = "api.reserves", skip(self))]
    pub async fn get_reserves(&self, currency: &str) -> Result<ReserveSnapshot> {
        self.get(&format!("/reserves/{}", currency)).await
    }

    #[tracing::instrument(name = "api.oracle_price", skip(self))]
    pub async fn get_oracle_price(&self, pair: &str) -> Result<OraclePrice> {
        self.get(&format!("/oracle/{}", pair)).await
    }

    #[tracing::instrument(name = "api.oracle_update", skip(self, request))]
    pub async fn update_oracle_price(
        &self,
        currency: &str,
        request: &PriceUpdateRequest,
    ) -> Result<OraclePrice> {
        self.post(&format!("/oracle/prices/{}/update", currency), request)
            .await
    }

    // Operations

    #[tracing::instrument(name = "api.mint", skip(self, request), fields(currency = %request.currency))]
    pub async fn mint(&self, request: &OperationRequest) -> Result<OperationResponse> {
        self.post("/operations/mint", request).await
    }

    #[tracing::instrument(name = "api.burn", skip(self, request), fields(currency = %request.currency))]
    pub async fn burn(&self, request: &OperationRequest) -> Result<OperationResponse> {
        self.post("/operations/burn", request).await
    }

    // Compliance

    #[tracing::instrument(name = "api.kyc_submit", skip(self, submission))]
    pub async fn submit_kyc(&self, submission: &KycSubmission) -> Result<KycSubmissionResponse> {
        self.post("/kyc/submit", submission).await
    }

    // Agents

    /// GET /agents
    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>> {
        self.get("/agents").await
    }

    /// GET /agents/{id}
    pub async fn get_agent(&self, id: &str) -> Result<AgentSummary> {
        self.get(&format!("/agents/{}", id)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.http.get(self.url(path))).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    tracing::debug!(status = status.as_u16(), message = %message, "API request failed");
    Err(AppError::api(status.as_u16(), message))
}
