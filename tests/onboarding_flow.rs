//! End-to-end onboarding wizard flow

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meridian_client::api::ApiClient;
use meridian_client::onboarding::{
    BeneficialOwner, DocumentRef, OnboardingStep, OnboardingWizard, SubmitError,
};

fn fill_entity(wizard: &mut OnboardingWizard) {
    let entity = wizard.entity_mut();
    entity.legal_name = "Northwind Capital Ltd".to_string();
    entity.registration_number = "09876543".to_string();
    entity.jurisdiction = "GB".to_string();
    entity.entity_type = "limited_company".to_string();
    entity.contact_email = "compliance@northwind.example".to_string();
    entity.website = Some("https://northwind.example".to_string());
}

fn fill_documents(wizard: &mut OnboardingWizard) {
    let documents = wizard.documents_mut();
    documents.certificate_of_incorporation = Some(DocumentRef::new("coi.pdf", "application/pdf", 48_000));
    documents.proof_of_address = Some(DocumentRef::new("utility.png", "image/png", 120_000));
    documents.signatory_id = Some(DocumentRef::new("passport.jpg", "image/jpeg", 300_000));
}

fn fill_compliance(wizard: &mut OnboardingWizard) {
    let compliance = wizard.compliance_mut();
    compliance.beneficial_owners = vec![
        BeneficialOwner {
            name: "Ada Byron".to_string(),
            nationality: "GB".to_string(),
            ownership_percentage: 60.0,
            is_pep: false,
        },
        BeneficialOwner {
            name: "Charles Babbage".to_string(),
            nationality: "GB".to_string(),
            ownership_percentage: 25.0,
            is_pep: false,
        },
    ];
    compliance.source_of_funds = "Retained earnings from advisory business".to_string();
    compliance.sanctions_attestation = true;
    compliance.pep_attestation = true;
}

fn fill_wallet(wizard: &mut OnboardingWizard) {
    let wallet = wizard.wallet_mut();
    wallet.address = "0x52908400098527886E0F7030069857D2E4169EE7".to_string();
    wallet.network = "sepolia".to_string();
}

#[tokio::test]
async fn test_full_flow_submits_single_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/kyc/submit"))
        .and(body_partial_json(json!({
            "entity": {"legal_name": "Northwind Capital Ltd", "jurisdiction": "GB"},
            "documents": {"signatory_id": {"file_name": "passport.jpg"}},
            "compliance": {"sanctions_attestation": true},
            "wallet": {"network": "sepolia"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "submission_id": "kyc-001",
            "status": "under_review"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).unwrap();
    let mut wizard = OnboardingWizard::new();

    fill_entity(&mut wizard);
    assert_eq!(wizard.next().unwrap(), OnboardingStep::Documents);

    // Submitting early is refused
    assert!(matches!(
        wizard.submit(&api).await,
        Err(SubmitError::NotOnFinalStep(OnboardingStep::Documents))
    ));

    fill_documents(&mut wizard);
    assert_eq!(wizard.next().unwrap(), OnboardingStep::Compliance);

    fill_compliance(&mut wizard);
    assert_eq!(wizard.next().unwrap(), OnboardingStep::WalletConnect);

    // Going back keeps everything entered so far
    assert_eq!(wizard.back(), OnboardingStep::Compliance);
    assert_eq!(wizard.form().compliance.beneficial_owners.len(), 2);
    assert_eq!(wizard.next().unwrap(), OnboardingStep::WalletConnect);

    fill_wallet(&mut wizard);
    let response = wizard.submit(&api).await.unwrap();
    assert_eq!(response.submission_id, "kyc-001");
    assert_eq!(response.status, "under_review");
}

#[tokio::test]
async fn test_invalid_final_step_is_not_submitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/kyc/submit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).unwrap();
    let mut wizard = OnboardingWizard::new();
    fill_entity(&mut wizard);
    wizard.next().unwrap();
    fill_documents(&mut wizard);
    wizard.next().unwrap();
    fill_compliance(&mut wizard);
    wizard.next().unwrap();

    wizard.wallet_mut().address = "0xnot-an-address".to_string();
    wizard.wallet_mut().network = "sepolia".to_string();

    match wizard.submit(&api).await {
        Err(SubmitError::Validation(errors)) => {
            assert!(errors.get("wallet.address").is_some());
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected validation failure, got {:?}", other.map(|r| r.submission_id)),
    }
    assert!(wizard.errors().get("wallet.address").is_some());
}
