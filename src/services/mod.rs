// Business logic layer. Every service receives the shared store at
// construction and returns `ServiceError` on failure.

pub mod account;
pub mod billing;
pub mod document_verification;
pub mod email;
pub mod email_verification;
pub mod export;
pub mod jwt;
pub mod notification;
pub mod onboarding;
pub mod project;
pub mod scout;

// Re-export commonly used services
pub use account::AccountService;
pub use billing::BillingService;
pub use document_verification::DocumentVerificationService;
pub use email::{EmailError, EmailService};
pub use email_verification::EmailVerificationService;
pub use export::DataExportService;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use notification::NotificationService;
pub use onboarding::OnboardingService;
pub use project::ProjectService;
pub use scout::ScoutService;
