// Domain models shared by the storage backends, services and handlers

/// Stores an enum in a text column using its `as_str` / `FromStr` pair.
macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::pg::Pg> for $ty {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                let value = <String as diesel::deserialize::FromSql<
                    diesel::sql_types::Text,
                    diesel::pg::Pg,
                >>::from_sql(bytes)?;
                value.parse::<$ty>().map_err(Into::into)
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg> for $ty {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                <str as diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg>>::to_sql(
                    self.as_str(),
                    out,
                )
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod auth;
pub mod invoice;
pub mod notification;
pub mod onboarding;
pub mod profile;
pub mod project;
pub mod scout;
pub mod user;
pub mod verification;

// Re-export common types
pub use auth::{AccessTokenClaims, Actor};
pub use invoice::{Invoice, InvoiceStatus, InvoiceSummary, NewInvoice};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use onboarding::{
    onboarding_steps, NewOnboardingProgress, OnboardingProgress, OnboardingStep, StepInfo,
    TOTAL_ONBOARDING_STEPS,
};
pub use profile::{
    Company, CompanyVerificationStatus, Influencer, NewCompany, NewInfluencer, NewProfile,
};
pub use project::{NewProject, Project, ProjectStatus};
pub use scout::{MatchPolicy, NewScout, Scout, ScoutStatus};
pub use user::{NewUser, User, UserRole, UserStatus};
pub use verification::{
    DocumentDescriptor, DocumentOwner, DocumentStatus, EmailVerificationToken,
    NewEmailVerificationToken, NewVerificationDocument, VerificationDocument,
    VerificationRecord, VerificationStatus, VerificationType,
};
