//! Reserve data sources for the dashboard
//!
//! The live source is the REST API; `mock_snapshot` is what the dashboard
//! shows when the API cannot be reached.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::api::{ApiClient, Attestation, ReserveAsset, ReserveSnapshot};
use crate::error::Result;

/// Anything that can produce a reserve snapshot for a currency
#[async_trait]
pub trait ReserveSource: Send + Sync {
    async fn fetch_reserves(&self, currency: &str) -> Result<ReserveSnapshot>;
}

#[async_trait]
impl ReserveSource for ApiClient {
    async fn fetch_reserves(&self, currency: &str) -> Result<ReserveSnapshot> {
        self.get_reserves(currency).await
    }
}

/// Static fallback figures per currency
pub fn mock_snapshot(currency: &str) -> ReserveSnapshot {
    let currency = currency.to_ascii_uppercase();
    let total_supply = match currency.as_str() {
        "USD" => 125_000_000.0,
        "EUR" => 84_500_000.0,
        "GBP" => 42_750_000.0,
        _ => 10_000_000.0,
    };
    let total_reserves = total_supply * 1.02;

    let breakdown = vec![
        ReserveAsset {
            asset_type: "cash".to_string(),
            amount: total_reserves * 0.35,
            percentage: 35.0,
            custodian: Some("Custodian Bank A".to_string()),
        },
        ReserveAsset {
            asset_type: "treasury_bills".to_string(),
            amount: total_reserves * 0.55,
            percentage: 55.0,
            custodian: Some("Custodian Bank B".to_string()),
        },
        ReserveAsset {
            asset_type: "repo".to_string(),
            amount: total_reserves * 0.10,
            percentage: 10.0,
            custodian: None,
        },
    ];

    ReserveSnapshot {
        last_attestation: Some(Attestation {
            id: format!("mock-attestation-{}", currency.to_ascii_lowercase()),
            attested_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now),
            auditor: "Mock Auditor LLP".to_string(),
            report_url: None,
        }),
        currency,
        total_supply,
        total_reserves,
        reserve_ratio: 102.0,
        breakdown,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_snapshot_is_consistent() {
        let snapshot = mock_snapshot("eur");
        assert_eq!(snapshot.currency, "EUR");
        assert!(snapshot.total_reserves > snapshot.total_supply);

        let pct: f64 = snapshot.breakdown.iter().map(|a| a.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }
}
