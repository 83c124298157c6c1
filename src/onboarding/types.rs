use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    EntityInfo,
    Documents,
    Compliance,
    WalletConnect,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::EntityInfo,
        OnboardingStep::Documents,
        OnboardingStep::Compliance,
        OnboardingStep::WalletConnect,
    ];

    /// Zero-based position in the flow
    pub fn index(&self) -> usize {
        match self {
            OnboardingStep::EntityInfo => 0,
            OnboardingStep::Documents => 1,
            OnboardingStep::Compliance => 2,
            OnboardingStep::WalletConnect => 3,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::EntityInfo => "Entity Information",
            OnboardingStep::Documents => "Documents",
            OnboardingStep::Compliance => "Beneficial Ownership & Compliance",
            OnboardingStep::WalletConnect => "Wallet Connection",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub legal_name: String,
    pub registration_number: String,
    /// ISO 3166-1 alpha-2 code
    pub jurisdiction: String,
    pub entity_type: String,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Reference to an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl DocumentRef {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub certificate_of_incorporation: Option<DocumentRef>,
    pub proof_of_address: Option<DocumentRef>,
    pub signatory_id: Option<DocumentRef>,
    #[serde(default)]
    pub additional: Vec<DocumentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeneficialOwner {
    pub name: String,
    pub nationality: String,
    pub ownership_percentage: f64,
    #[serde(default)]
    pub is_pep: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceInfo {
    pub beneficial_owners: Vec<BeneficialOwner>,
    pub source_of_funds: String,
    /// Entity confirms it is not subject to sanctions
    pub sanctions_attestation: bool,
    /// Entity confirms PEP disclosures are complete
    pub pep_attestation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    pub network: String,
}

/// Cumulative form state across all steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingForm {
    pub entity: EntityInfo,
    pub documents: DocumentSet,
    pub compliance: ComplianceInfo,
    pub wallet: WalletInfo,
}

/// Payload posted to `/kyc/submit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycSubmission {
    pub entity: EntityInfo,
    pub documents: DocumentSet,
    pub compliance: ComplianceInfo,
    pub wallet: WalletInfo,
    pub submitted_at: DateTime<Utc>,
}
