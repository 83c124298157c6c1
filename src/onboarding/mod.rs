//! Institutional KYC onboarding
//!
//! Four linear steps with cumulative in-memory form state. Each step
//! validates its own fields before advancing; the final submission posts the
//! whole form as one payload.

mod types;
mod validation;
mod wizard;

pub use types::{
    BeneficialOwner, ComplianceInfo, DocumentRef, DocumentSet, EntityInfo, KycSubmission,
    OnboardingForm, OnboardingStep, WalletInfo,
};
pub use validation::ValidationErrors;
pub use wizard::{OnboardingWizard, SubmitError};
