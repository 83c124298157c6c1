//! Per-step field validation

use std::collections::BTreeMap;

use super::types::{ComplianceInfo, DocumentRef, DocumentSet, EntityInfo, WalletInfo};

/// Largest accepted upload
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 3] = ["application/pdf", "image/png", "image/jpeg"];

const SUPPORTED_NETWORKS: [&str; 2] = ["sepolia", "mainnet"];

/// 100% expressed in basis points
const MAX_OWNERSHIP_BPS: i64 = 10_000;

/// Field-scoped validation errors (field path -> message)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.add(field, message);
        }
    }

    /// `Ok` when no field failed
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Entity details step
pub fn validate_entity(entity: &EntityInfo) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if entity.legal_name.trim().chars().count() < 2 {
        errors.add("entity.legal_name", "Legal name must be at least 2 characters");
    }
    if entity.registration_number.trim().is_empty() {
        errors.add("entity.registration_number", "Registration number is required");
    }
    let jurisdiction = entity.jurisdiction.trim();
    if jurisdiction.len() != 2 || !jurisdiction.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.add("entity.jurisdiction", "Jurisdiction must be a 2-letter country code");
    }
    if entity.entity_type.trim().is_empty() {
        errors.add("entity.entity_type", "Entity type is required");
    }
    if !is_valid_email(&entity.contact_email) {
        errors.add("entity.contact_email", "Enter a valid email address");
    }
    if let Some(website) = entity.website.as_deref().map(str::trim) {
        if !website.is_empty() && !(website.starts_with("https://") || website.starts_with("http://")) {
            errors.add("entity.website", "Website must start with http:// or https://");
        }
    }

    errors.into_result()
}

/// Required documents: PDF, PNG or JPEG up to 10 MB each
pub fn validate_documents(documents: &DocumentSet) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let required = [
        ("documents.certificate_of_incorporation", &documents.certificate_of_incorporation, "Certificate of incorporation is required"),
        ("documents.proof_of_address", &documents.proof_of_address, "Proof of address is required"),
        ("documents.signatory_id", &documents.signatory_id, "Authorized signatory ID is required"),
    ];
    for (field, document, missing) in required {
        match document {
            Some(doc) => check_document(field, doc, &mut errors),
            None => errors.add(field, missing),
        }
    }

    for (i, doc) in documents.additional.iter().enumerate() {
        check_document(&format!("documents.additional[{}]", i), doc, &mut errors);
    }

    errors.into_result()
}

fn check_document(field: &str, doc: &DocumentRef, errors: &mut ValidationErrors) {
    if doc.file_name.trim().is_empty() || doc.size_bytes == 0 {
        errors.add(field, "File is empty");
    } else if doc.size_bytes > MAX_DOCUMENT_BYTES {
        errors.add(field, "File exceeds the 10 MB limit");
    } else if !ALLOWED_CONTENT_TYPES.contains(&doc.content_type.as_str()) {
        errors.add(field, "Only PDF, PNG or JPEG files are accepted");
    }
}

/// Beneficial ownership and attestations; owners may total at most 100%
pub fn validate_compliance(compliance: &ComplianceInfo) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if compliance.beneficial_owners.is_empty() {
        errors.add("compliance.beneficial_owners", "At least one beneficial owner is required");
    }

    let mut total_bps: i64 = 0;
    for (i, owner) in compliance.beneficial_owners.iter().enumerate() {
        if owner.name.trim().is_empty() {
            errors.add(format!("compliance.beneficial_owners[{}].name", i), "Name is required");
        }
        if owner.nationality.trim().is_empty() {
            errors.add(
                format!("compliance.beneficial_owners[{}].nationality", i),
                "Nationality is required",
            );
        }
        let pct = owner.ownership_percentage;
        if !(pct > 0.0 && pct <= 100.0) {
            errors.add(
                format!("compliance.beneficial_owners[{}].ownership_percentage", i),
                "Ownership must be greater than 0 and at most 100",
            );
        } else {
            total_bps += (pct * 100.0).round() as i64;
        }
    }
    if total_bps > MAX_OWNERSHIP_BPS {
        errors.add("compliance.beneficial_owners", "Total ownership cannot exceed 100%");
    }

    if compliance.source_of_funds.trim().is_empty() {
        errors.add("compliance.source_of_funds", "Describe the source of funds");
    }
    if !compliance.sanctions_attestation {
        errors.add("compliance.sanctions_attestation", "Sanctions attestation must be confirmed");
    }
    if !compliance.pep_attestation {
        errors.add("compliance.pep_attestation", "PEP attestation must be confirmed");
    }

    errors.into_result()
}

/// Wallet address and network
pub fn validate_wallet(wallet: &WalletInfo) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !is_valid_address(&wallet.address) {
        errors.add("wallet.address", "Enter a valid 0x-prefixed wallet address");
    }
    if !SUPPORTED_NETWORKS.contains(&wallet.network.as_str()) {
        errors.add("wallet.network", "Unsupported network");
    }

    errors.into_result()
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::types::BeneficialOwner;

    fn owner(name: &str, pct: f64) -> BeneficialOwner {
        BeneficialOwner {
            name: name.to_string(),
            nationality: "DE".to_string(),
            ownership_percentage: pct,
            is_pep: false,
        }
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("ops@acme.co"));
        assert!(is_valid_email("first.last@sub.acme.io"));
        assert!(!is_valid_email("ops@acme"));
        assert!(!is_valid_email("@acme.co"));
        assert!(!is_valid_email("a b@acme.co"));
        assert!(!is_valid_email("a@b@acme.co"));
    }

    #[test]
    fn test_wallet_address_rules() {
        assert!(is_valid_address("0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid_address("52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("0xZZ908400098527886E0F7030069857D2E4169EE7"));
    }

    #[test]
    fn test_entity_errors_are_field_scoped() {
        let errors = validate_entity(&EntityInfo {
            legal_name: "A".to_string(),
            jurisdiction: "DEU".to_string(),
            website: Some("acme.co".to_string()),
            ..EntityInfo::default()
        })
        .unwrap_err();

        assert!(errors.get("entity.legal_name").is_some());
        assert!(errors.get("entity.registration_number").is_some());
        assert!(errors.get("entity.jurisdiction").is_some());
        assert!(errors.get("entity.contact_email").is_some());
        assert!(errors.get("entity.website").is_some());
    }

    #[test]
    fn test_documents_require_core_files() {
        let errors = validate_documents(&DocumentSet {
            certificate_of_incorporation: Some(DocumentRef::new("coi.pdf", "application/pdf", 2048)),
            proof_of_address: Some(DocumentRef::new("addr.docx", "application/msword", 2048)),
            signatory_id: None,
            additional: vec![DocumentRef::new("big.pdf", "application/pdf", MAX_DOCUMENT_BYTES + 1)],
        })
        .unwrap_err();

        assert!(errors.get("documents.certificate_of_incorporation").is_none());
        assert!(errors.get("documents.proof_of_address").is_some());
        assert!(errors.get("documents.signatory_id").is_some());
        assert!(errors.get("documents.additional[0]").is_some());
    }

    #[test]
    fn test_ownership_total_capped() {
        let compliance = ComplianceInfo {
            beneficial_owners: vec![owner("A", 60.0), owner("B", 50.0)],
            source_of_funds: "Operating revenue".to_string(),
            sanctions_attestation: true,
            pep_attestation: true,
        };
        let errors = validate_compliance(&compliance).unwrap_err();
        assert_eq!(
            errors.get("compliance.beneficial_owners"),
            Some("Total ownership cannot exceed 100%")
        );

        let ok = ComplianceInfo {
            beneficial_owners: vec![owner("A", 60.0), owner("B", 40.0)],
            ..compliance
        };
        assert!(validate_compliance(&ok).is_ok());
    }

    #[test]
    fn test_fractional_ownership_summing_to_100() {
        let compliance = ComplianceInfo {
            beneficial_owners: vec![owner("A", 53.7), owner("B", 38.6), owner("C", 7.7)],
            source_of_funds: "Operating revenue".to_string(),
            sanctions_attestation: true,
            pep_attestation: true,
        };
        assert!(validate_compliance(&compliance).is_ok());

        let over = ComplianceInfo {
            beneficial_owners: vec![owner("A", 53.7), owner("B", 38.6), owner("C", 7.71)],
            ..compliance
        };
        assert!(validate_compliance(&over).is_err());
    }

    #[test]
    fn test_attestations_required() {
        let errors = validate_compliance(&ComplianceInfo {
            beneficial_owners: vec![owner("A", 100.0)],
            source_of_funds: "Capital".to_string(),
            sanctions_attestation: false,
            pep_attestation: false,
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_unsupported_network() {
        let errors = validate_wallet(&WalletInfo {
            address: "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
            network: "polygon".to_string(),
        })
        .unwrap_err();
        assert!(errors.get("wallet.network").is_some());
        assert!(errors.get("wallet.address").is_none());
    }
}
