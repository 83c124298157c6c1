use chrono::Utc;
use thiserror::Error;

use crate::api::{ApiClient, KycSubmissionResponse};
use crate::error::AppError;

use super::types::{
    ComplianceInfo, DocumentSet, EntityInfo, KycSubmission, OnboardingForm, OnboardingStep,
    WalletInfo,
};
use super::validation::{
    validate_compliance, validate_documents, validate_entity, validate_wallet, ValidationErrors,
};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Onboarding is on step {0:?}; submit from the final step")]
    NotOnFinalStep(OnboardingStep),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Api(#[from] AppError),
}

/// Linear four-step onboarding flow
#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: OnboardingStep,
    form: OnboardingForm,
    errors: ValidationErrors,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::EntityInfo,
            form: OnboardingForm::default(),
            errors: ValidationErrors::new(),
        }
    }

    /// Step currently shown
    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// Values entered so far across all steps
    pub fn form(&self) -> &OnboardingForm {
        &self.form
    }

    /// Errors from the last failed `next()`/`submit()`, rendered inline
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_final_step(&self) -> bool {
        self.step.next().is_none()
    }

    pub fn entity_mut(&mut self) -> &mut EntityInfo {
        &mut self.form.entity
    }

    pub fn documents_mut(&mut self) -> &mut DocumentSet {
        &mut self.form.documents
    }

    pub fn compliance_mut(&mut self) -> &mut ComplianceInfo {
        &mut self.form.compliance
    }

    pub fn wallet_mut(&mut self) -> &mut WalletInfo {
        &mut self.form.wallet
    }

    /// Validate the current step and advance.
    ///
    /// On the final step this only validates; use `submit` to finish.
    pub fn next(&mut self) -> Result<OnboardingStep, ValidationErrors> {
        if let Err(errors) = self.validate_step(self.step) {
            tracing::debug!(step = ?self.step, error_count = errors.len(), "Onboarding step invalid");
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors = ValidationErrors::new();
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step; entered values are kept
    pub fn back(&mut self) -> OnboardingStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.errors = ValidationErrors::new();
        self.step
    }

    /// Validate one step without moving
    pub fn validate_step(&self, step: OnboardingStep) -> Result<(), ValidationErrors> {
        match step {
            OnboardingStep::EntityInfo => validate_entity(&self.form.entity),
            OnboardingStep::Documents => validate_documents(&self.form.documents),
            OnboardingStep::Compliance => validate_compliance(&self.form.compliance),
            OnboardingStep::WalletConnect => validate_wallet(&self.form.wallet),
        }
    }

    /// Validate every step and assemble the submission payload
    pub fn build_submission(&self) -> Result<KycSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for step in OnboardingStep::ALL {
            if let Err(step_errors) = self.validate_step(step) {
                errors.merge(step_errors);
            }
        }
        errors.into_result()?;

        Ok(KycSubmission {
            entity: self.form.entity.clone(),
            documents: self.form.documents.clone(),
            compliance: self.form.compliance.clone(),
            wallet: self.form.wallet.clone(),
            submitted_at: Utc::now(),
        })
    }

    /// Post the accumulated form to `/kyc/submit`
    #[tracing::instrument(name = "onboarding.submit", skip(self, api), fields(entity = %self.form.entity.legal_name))]
    pub async fn submit(&mut self, api: &ApiClient) -> Result<KycSubmissionResponse, SubmitError> {
        if !self.is_final_step() {
            return Err(SubmitError::NotOnFinalStep(self.step));
        }

        let submission = match self.build_submission() {
            Ok(submission) => submission,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(SubmitError::Validation(errors));
            }
        };

        let response = api.submit_kyc(&submission).await?;
        tracing::info!(submission_id = %response.submission_id, status = %response.status, "KYC submitted");
        Ok(response)
    }
}
