// Identity and business document review.
//
// Companies submit document batches that an admin approves or rejects as a
// whole; individual documents (influencer identity documents in particular)
// are reviewed one by one.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    Company, CompanyVerificationStatus, DocumentDescriptor, DocumentOwner, DocumentStatus,
    NewVerificationDocument, NotificationKind, User, UserStatus, VerificationDocument,
    VerificationRecord,
};
use crate::services::email::EmailService;
use crate::services::notification::NotificationService;
use crate::store::{DocumentReview, SharedStore, StoreError};
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::trim_required;

pub const MAX_DOCUMENTS_PER_BATCH: usize = 10;

/// Verification state of the caller across every dimension
#[derive(Debug, Serialize)]
pub struct VerificationOverview {
    pub user_id: Uuid,
    pub status: UserStatus,
    pub email_verified: bool,
    pub company_status: Option<CompanyVerificationStatus>,
    pub influencer_verified: Option<bool>,
    pub records: Vec<VerificationRecord>,
    pub documents: Vec<VerificationDocument>,
}

#[derive(Clone)]
pub struct DocumentVerificationService {
    store: SharedStore,
    email: Arc<EmailService>,
    notifications: Arc<NotificationService>,
}

fn check_descriptor(descriptor: &DocumentDescriptor) -> ServiceResult<()> {
    descriptor.check().map_err(ServiceError::Validation)
}

impl DocumentVerificationService {
    pub fn new(
        store: SharedStore,
        email: Arc<EmailService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            store,
            email,
            notifications,
        }
    }

    /// One `PENDING` document per descriptor; the company moves to review and
    /// its owner to `VERIFICATION_PENDING`.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn submit_verification_documents(
        &self,
        company_id: Uuid,
        documents: Vec<DocumentDescriptor>,
    ) -> ServiceResult<Vec<VerificationDocument>> {
        if documents.is_empty() {
            return Err(ServiceError::Validation(
                "At least one document is required".to_string(),
            ));
        }
        if documents.len() > MAX_DOCUMENTS_PER_BATCH {
            return Err(ServiceError::Validation(format!(
                "At most {} documents can be submitted at once",
                MAX_DOCUMENTS_PER_BATCH
            )));
        }
        documents.iter().try_for_each(check_descriptor)?;

        let company = self.company(company_id).await?;
        let rows: Vec<NewVerificationDocument> = documents
            .iter()
            .map(|d| {
                NewVerificationDocument::new(company.user_id, DocumentOwner::Company(company.id), d)
            })
            .collect();

        let submitted = self
            .store
            .submit_company_documents(company.id, rows)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::not_found("Company"),
                other => other.into(),
            })?;

        info!(
            "Company {} submitted {} verification documents",
            company.id,
            submitted.len()
        );
        Ok(submitted)
    }

    /// Resolves the caller's company before submitting
    pub async fn submit_for_user(
        &self,
        user_id: Uuid,
        documents: Vec<DocumentDescriptor>,
    ) -> ServiceResult<Vec<VerificationDocument>> {
        let company = self
            .store
            .find_company_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company profile"))?;
        self.submit_verification_documents(company.id, documents).await
    }

    /// Single document upload for whichever profile the user owns. Does not
    /// change the user's status.
    #[instrument(skip(self, descriptor))]
    pub async fn upload_verification_document(
        &self,
        user_id: Uuid,
        descriptor: DocumentDescriptor,
    ) -> ServiceResult<VerificationDocument> {
        check_descriptor(&descriptor)?;

        let owner = if let Some(company) = self.store.find_company_by_user(user_id).await? {
            DocumentOwner::Company(company.id)
        } else if let Some(influencer) = self.store.find_influencer_by_user(user_id).await? {
            DocumentOwner::Influencer(influencer.id)
        } else {
            return Err(ServiceError::not_found("Profile"));
        };

        let document = self
            .store
            .insert_document(NewVerificationDocument::new(user_id, owner, &descriptor))
            .await?;

        info!("User {} uploaded document {}", user_id, document.id);
        Ok(document)
    }

    pub async fn list_user_documents(&self, user_id: Uuid) -> ServiceResult<Vec<VerificationDocument>> {
        Ok(self.store.list_documents_for_user(user_id).await?)
    }

    pub async fn list_documents(&self, status: DocumentStatus) -> ServiceResult<Vec<VerificationDocument>> {
        Ok(self.store.list_documents_by_status(status).await?)
    }

    pub async fn overview(&self, user_id: Uuid) -> ServiceResult<VerificationOverview> {
        let user = self.user(user_id).await?;
        let company = self.store.find_company_by_user(user_id).await?;
        let influencer = self.store.find_influencer_by_user(user_id).await?;

        Ok(VerificationOverview {
            user_id: user.id,
            status: user.status,
            email_verified: user.is_email_verified(),
            company_status: company.map(|c| c.verification_status),
            influencer_verified: influencer.map(|i| i.is_verified),
            records: self.store.list_verification_records(user_id).await?,
            documents: self.store.list_documents_for_user(user_id).await?,
        })
    }

    /// Company, owner, documents and BUSINESS record are approved atomically
    #[instrument(skip(self))]
    pub async fn approve_company_verification(&self, company_id: Uuid) -> ServiceResult<Company> {
        let company = self
            .store
            .approve_company(company_id, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::not_found("Company"),
                other => other.into(),
            })?;

        info!("Company {} verified", company.id);

        self.notifications
            .notify(
                company.user_id,
                NotificationKind::VerificationApproved,
                "Company verified",
                &format!("{} has been verified.", company.company_name),
                json!({ "company_id": company.id }),
            )
            .await;
        self.send_result_email(&company, true, None).await;

        Ok(company)
    }

    /// Documents are rejected with `reason` and the owner returns to
    /// `PROVISIONAL`
    #[instrument(skip(self))]
    pub async fn reject_company_verification(
        &self,
        company_id: Uuid,
        reason: &str,
    ) -> ServiceResult<Company> {
        let reason = trim_required(reason, "Rejection reason").map_err(ServiceError::Validation)?;

        let company = self
            .store
            .reject_company(company_id, &reason, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::not_found("Company"),
                other => other.into(),
            })?;

        info!("Company {} verification rejected", company.id);

        self.notifications
            .notify(
                company.user_id,
                NotificationKind::VerificationRejected,
                "Company verification rejected",
                &format!("{} could not be verified: {}", company.company_name, reason),
                json!({ "company_id": company.id, "reason": reason }),
            )
            .await;
        self.send_result_email(&company, false, Some(&reason)).await;

        Ok(company)
    }

    #[instrument(skip(self))]
    pub async fn approve_verification_document(
        &self,
        document_id: Uuid,
    ) -> ServiceResult<VerificationDocument> {
        let document = self.review(document_id, DocumentReview::Approve).await?;

        self.notifications
            .notify(
                document.user_id,
                NotificationKind::DocumentApproved,
                "Document approved",
                &format!("Your {} document has been approved.", document.document_type),
                json!({ "document_id": document.id }),
            )
            .await;

        Ok(document)
    }

    #[instrument(skip(self))]
    pub async fn reject_verification_document(
        &self,
        document_id: Uuid,
        reason: &str,
    ) -> ServiceResult<VerificationDocument> {
        let reason = trim_required(reason, "Rejection reason").map_err(ServiceError::Validation)?;
        let document = self
            .review(document_id, DocumentReview::Reject { reason: reason.clone() })
            .await?;

        self.notifications
            .notify(
                document.user_id,
                NotificationKind::DocumentRejected,
                "Document rejected",
                &format!(
                    "Your {} document was rejected: {}. Please upload a new one.",
                    document.document_type, reason
                ),
                json!({ "document_id": document.id, "reason": reason }),
            )
            .await;

        Ok(document)
    }

    async fn review(
        &self,
        document_id: Uuid,
        review: DocumentReview,
    ) -> ServiceResult<VerificationDocument> {
        let document = self
            .store
            .review_document(document_id, review, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::not_found("Document"),
                StoreError::Conflict(_) => {
                    ServiceError::Conflict("Document has already been reviewed".to_string())
                },
                other => other.into(),
            })?;

        info!("Document {} is now {}", document.id, document.status);
        Ok(document)
    }

    async fn send_result_email(&self, company: &Company, approved: bool, reason: Option<&str>) {
        let owner = match self.store.find_user(company.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not load owner of company {}: {}", company.id, e);
                return;
            },
        };

        if let Err(e) = self
            .email
            .send_company_verification_result(&owner.email, &company.company_name, approved, reason)
            .await
        {
            warn!("Verification result email for company {} failed: {}", company.id, e);
        }
    }

    async fn company(&self, company_id: Uuid) -> ServiceResult<Company> {
        self.store
            .find_company(company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company"))
    }

    async fn user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }
}
