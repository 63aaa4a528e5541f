// Storage interface shared by every service.
//
// Each aggregate gets its own async trait; `Store` bundles them so a single
// `Arc<dyn Store>` can be handed to services at construction. Operations that
// touch more than one row are single trait methods so each backend can make
// them atomic.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Company, DocumentStatus, EmailVerificationToken, Influencer, Invoice, MatchPolicy,
    NewEmailVerificationToken, NewInvoice, NewNotification, NewOnboardingProgress, NewProfile,
    NewProject, NewScout, NewUser, NewVerificationDocument, Notification, OnboardingProgress,
    OnboardingStep, Project, ProjectStatus, Scout, ScoutStatus, User, UserStatus,
    VerificationDocument, VerificationRecord,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("connection pool error: {0}")]
    Pool(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type SharedStore = Arc<dyn Store>;

/// Admin decision on a single verification document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentReview {
    Approve,
    Reject { reason: String },
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user and its role profile together.
    /// A duplicate email is a `Conflict`.
    async fn create_account(&self, user: NewUser, profile: NewProfile) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<User>;

    async fn set_user_status(&self, id: Uuid, status: UserStatus) -> StoreResult<User>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>>;

    async fn find_company_by_user(&self, user_id: Uuid) -> StoreResult<Option<Company>>;

    async fn find_influencer(&self, id: Uuid) -> StoreResult<Option<Influencer>>;

    async fn find_influencer_by_user(&self, user_id: Uuid) -> StoreResult<Option<Influencer>>;
}

#[async_trait]
pub trait VerificationStore: Send + Sync {
    async fn insert_email_token(
        &self,
        token: NewEmailVerificationToken,
    ) -> StoreResult<EmailVerificationToken>;

    async fn find_email_token_by_hash(
        &self,
        token_hash: &str,
    ) -> StoreResult<Option<EmailVerificationToken>>;

    async fn list_email_tokens(&self, user_id: Uuid) -> StoreResult<Vec<EmailVerificationToken>>;

    /// Deletes every token of the user that has not been used; returns the count
    async fn delete_unused_email_tokens(&self, user_id: Uuid) -> StoreResult<usize>;

    /// Marks the token used, stamps `email_verified_at`, moves a `PROVISIONAL`
    /// user to `VERIFICATION_PENDING` and upserts the approved EMAIL record,
    /// all in one transaction. A token that is already used is a `Conflict`.
    async fn consume_email_token(&self, token_id: Uuid, now: DateTime<Utc>) -> StoreResult<User>;

    async fn list_verification_records(&self, user_id: Uuid)
        -> StoreResult<Vec<VerificationRecord>>;

    /// Inserts a company's document batch, supersedes rejected documents of
    /// the same types, and moves the company to `PENDING` and its user to
    /// `VERIFICATION_PENDING`.
    async fn submit_company_documents(
        &self,
        company_id: Uuid,
        documents: Vec<NewVerificationDocument>,
    ) -> StoreResult<Vec<VerificationDocument>>;

    /// Inserts one document and supersedes the owner's rejected documents of
    /// the same type.
    async fn insert_document(
        &self,
        document: NewVerificationDocument,
    ) -> StoreResult<VerificationDocument>;

    async fn find_document(&self, id: Uuid) -> StoreResult<Option<VerificationDocument>>;

    async fn list_documents_for_user(&self, user_id: Uuid)
        -> StoreResult<Vec<VerificationDocument>>;

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> StoreResult<Vec<VerificationDocument>>;

    /// Company, owning user, non-superseded documents and the BUSINESS
    /// record all move to their approved state in one transaction.
    async fn approve_company(&self, company_id: Uuid, now: DateTime<Utc>) -> StoreResult<Company>;

    /// Non-superseded documents become `REJECTED` with `reason`, the company
    /// becomes `REJECTED` and its user returns to `PROVISIONAL`.
    async fn reject_company(
        &self,
        company_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Company>;

    /// Reviews one `PENDING` document; anything else is a `Conflict`.
    /// Approving an influencer's document also verifies the influencer.
    async fn review_document(
        &self,
        document_id: Uuid,
        review: DocumentReview,
        now: DateTime<Utc>,
    ) -> StoreResult<VerificationDocument>;
}

#[async_trait]
pub trait OnboardingStore: Send + Sync {
    async fn find_onboarding(&self, user_id: Uuid) -> StoreResult<Option<OnboardingProgress>>;

    /// Returns the existing row when the user already has one
    async fn create_onboarding(
        &self,
        progress: NewOnboardingProgress,
    ) -> StoreResult<OnboardingProgress>;

    /// Read-modify-write of the completed step set under a row lock
    async fn complete_onboarding_step(
        &self,
        user_id: Uuid,
        step: OnboardingStep,
        now: DateTime<Utc>,
    ) -> StoreResult<OnboardingProgress>;

    async fn skip_onboarding(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<OnboardingProgress>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, project: NewProject) -> StoreResult<Project>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn list_projects_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn list_projects_for_influencer(&self, influencer_id: Uuid)
        -> StoreResult<Vec<Project>>;

    /// Compare-and-set on the project status; a mismatch is a `Conflict`
    async fn transition_project(
        &self,
        id: Uuid,
        from: ProjectStatus,
        to: ProjectStatus,
    ) -> StoreResult<Project>;
}

#[async_trait]
pub trait ScoutStore: Send + Sync {
    /// A second scout for the same (project, influencer) pair is a `Conflict`
    async fn create_scout(&self, scout: NewScout) -> StoreResult<Scout>;

    async fn find_scout(&self, id: Uuid) -> StoreResult<Option<Scout>>;

    async fn list_scouts_for_influencer(
        &self,
        influencer_id: Uuid,
        status: Option<ScoutStatus>,
    ) -> StoreResult<Vec<Scout>>;

    async fn list_scouts_for_company(
        &self,
        company_id: Uuid,
        status: Option<ScoutStatus>,
    ) -> StoreResult<Vec<Scout>>;

    /// Accepts a `PENDING` scout and records the match on its project in one
    /// transaction. A responded scout, or a match refused by `policy`, is a
    /// `Conflict` and leaves both rows untouched.
    async fn accept_scout(
        &self,
        scout_id: Uuid,
        policy: MatchPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<(Scout, Project)>;

    async fn reject_scout(
        &self,
        scout_id: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<Scout>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// A duplicate invoice number is a `Conflict`
    async fn create_invoice(&self, invoice: NewInvoice) -> StoreResult<Invoice>;

    async fn find_invoice(&self, id: Uuid) -> StoreResult<Option<Invoice>>;

    async fn list_invoices_for_influencer(&self, influencer_id: Uuid)
        -> StoreResult<Vec<Invoice>>;

    async fn list_invoices_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Invoice>>;

    /// Any unpaid invoice may be paid; paying twice is a `Conflict`
    async fn mark_invoice_paid(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<Invoice>;

    /// Only `PENDING` invoices become overdue
    async fn mark_invoice_overdue(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<Invoice>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, notification: NewNotification)
        -> StoreResult<Notification>;

    /// Newest first
    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>>;

    /// `NotFound` unless the notification belongs to `user_id`
    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Notification>;
}

#[async_trait]
pub trait Store:
    UserStore
    + ProfileStore
    + VerificationStore
    + OnboardingStore
    + ProjectStore
    + ScoutStore
    + InvoiceStore
    + NotificationStore
    + Send
    + Sync
    + 'static
{
    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> StoreResult<()>;
}
