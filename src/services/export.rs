// Personal data export: every row a user owns, as one document

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    Company, Influencer, Invoice, Notification, OnboardingProgress, Project, Scout, User,
    VerificationDocument, VerificationRecord,
};
use crate::store::SharedStore;
use crate::utils::service_error::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
pub struct UserDataExport {
    pub exported_at: DateTime<Utc>,
    pub user: User,
    pub company: Option<Company>,
    pub influencer: Option<Influencer>,
    pub verification_records: Vec<VerificationRecord>,
    pub documents: Vec<VerificationDocument>,
    pub onboarding: Option<OnboardingProgress>,
    pub projects: Vec<Project>,
    pub scouts: Vec<Scout>,
    pub invoices: Vec<Invoice>,
    pub notifications: Vec<Notification>,
}

#[derive(Clone)]
pub struct DataExportService {
    store: SharedStore,
}

impl DataExportService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn export_user_data(&self, user_id: Uuid) -> ServiceResult<UserDataExport> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let company = self.store.find_company_by_user(user_id).await?;
        let influencer = self.store.find_influencer_by_user(user_id).await?;

        let (projects, scouts, invoices) = match (&company, &influencer) {
            (Some(company), _) => (
                self.store.list_projects_for_company(company.id).await?,
                self.store.list_scouts_for_company(company.id, None).await?,
                self.store.list_invoices_for_company(company.id).await?,
            ),
            (None, Some(influencer)) => (
                self.store.list_projects_for_influencer(influencer.id).await?,
                self.store.list_scouts_for_influencer(influencer.id, None).await?,
                self.store.list_invoices_for_influencer(influencer.id).await?,
            ),
            (None, None) => (Vec::new(), Vec::new(), Vec::new()),
        };

        let export = UserDataExport {
            exported_at: Utc::now(),
            verification_records: self.store.list_verification_records(user_id).await?,
            documents: self.store.list_documents_for_user(user_id).await?,
            onboarding: self.store.find_onboarding(user_id).await?,
            notifications: self.store.list_notifications(user_id, false).await?,
            user,
            company,
            influencer,
            projects,
            scouts,
            invoices,
        };

        info!("Exported data for user {}", user_id);
        Ok(export)
    }
}
