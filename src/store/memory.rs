// In-process store used by the test suite and `STORAGE_BACKEND=memory`.
//
// Every method takes the single state lock for its whole duration, so the
// multi-row operations are atomic in the same way the Postgres transactions
// are. Unique constraints are checked before anything is written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    DocumentReview, InvoiceStore, NotificationStore, OnboardingStore, ProfileStore, ProjectStore,
    ScoutStore, Store, StoreError, StoreResult, UserStore, VerificationStore,
};
use crate::models::{
    Company, CompanyVerificationStatus, DocumentStatus, EmailVerificationToken, Influencer,
    Invoice, InvoiceStatus, MatchPolicy, NewEmailVerificationToken, NewInvoice, NewNotification,
    NewOnboardingProgress, NewProfile, NewProject, NewScout, NewUser, NewVerificationDocument,
    Notification, OnboardingProgress, OnboardingStep, Project, ProjectStatus, Scout, ScoutStatus,
    User, UserStatus, VerificationDocument, VerificationRecord, VerificationStatus,
    VerificationType,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
    influencers: HashMap<Uuid, Influencer>,
    email_tokens: HashMap<Uuid, EmailVerificationToken>,
    records: Vec<VerificationRecord>,
    documents: Vec<VerificationDocument>,
    onboarding: HashMap<Uuid, OnboardingProgress>,
    projects: HashMap<Uuid, Project>,
    scouts: HashMap<Uuid, Scout>,
    invoices: HashMap<Uuid, Invoice>,
    notifications: Vec<Notification>,
}

impl MemoryState {
    fn user_mut(&mut self, id: Uuid) -> StoreResult<&mut User> {
        self.users.get_mut(&id).ok_or(StoreError::NotFound)
    }

    fn upsert_record(
        &mut self,
        user_id: Uuid,
        verification_type: VerificationType,
        now: DateTime<Utc>,
    ) {
        match self
            .records
            .iter_mut()
            .find(|r| r.user_id == user_id && r.verification_type == verification_type)
        {
            Some(record) => {
                record.status = VerificationStatus::Approved;
                record.verified_at = Some(now);
                record.updated_at = now;
            },
            None => self.records.push(VerificationRecord {
                id: Uuid::new_v4(),
                user_id,
                verification_type,
                status: VerificationStatus::Approved,
                verified_at: Some(now),
                created_at: now,
                updated_at: now,
            }),
        }
    }

    fn supersede_rejected(&mut self, user_id: Uuid, document_type: &str) {
        for doc in self.documents.iter_mut().filter(|d| {
            d.user_id == user_id
                && d.document_type == document_type
                && d.status == DocumentStatus::Rejected
        }) {
            doc.status = DocumentStatus::Resubmit;
        }
    }

    fn insert_document(
        &mut self,
        new: NewVerificationDocument,
        now: DateTime<Utc>,
    ) -> VerificationDocument {
        self.supersede_rejected(new.user_id, &new.document_type);
        let doc = VerificationDocument {
            id: new.id,
            user_id: new.user_id,
            company_id: new.company_id,
            influencer_id: new.influencer_id,
            document_type: new.document_type,
            document_url: new.document_url,
            file_name: new.file_name,
            file_size: new.file_size,
            status: new.status,
            rejection_reason: None,
            reviewed_at: None,
            created_at: now,
        };
        self.documents.push(doc.clone());
        doc
    }

    fn onboarding_mut(&mut self, user_id: Uuid) -> StoreResult<&mut OnboardingProgress> {
        self.onboarding.get_mut(&user_id).ok_or(StoreError::NotFound)
    }
}

/// Mutex-guarded in-memory implementation of [`Store`]
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_newest_first<T, F>(mut rows: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_account(&self, user: NewUser, profile: NewProfile) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            status: user.status,
            email_verified_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        match profile {
            NewProfile::Company(company) => {
                state.companies.insert(
                    company.id,
                    Company {
                        id: company.id,
                        user_id: created.id,
                        company_name: company.company_name,
                        industry: company.industry,
                        website: company.website,
                        is_verified: false,
                        verification_status: CompanyVerificationStatus::Unsubmitted,
                        verified_at: None,
                        created_at: now,
                        updated_at: now,
                    },
                );
            },
            NewProfile::Influencer(influencer) => {
                state.influencers.insert(
                    influencer.id,
                    Influencer {
                        id: influencer.id,
                        user_id: created.id,
                        display_name: influencer.display_name,
                        bio: influencer.bio,
                        primary_platform: influencer.primary_platform,
                        follower_count: 0,
                        is_verified: false,
                        created_at: now,
                        updated_at: now,
                    },
                );
            },
            NewProfile::None => {},
        }

        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        user.last_login_at = Some(at);
        user.updated_at = at;
        Ok(user.clone())
    }

    async fn set_user_status(&self, id: Uuid, status: UserStatus) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        user.status = status;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.state.lock().await.companies.get(&id).cloned())
    }

    async fn find_company_by_user(&self, user_id: Uuid) -> StoreResult<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state.companies.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn find_influencer(&self, id: Uuid) -> StoreResult<Option<Influencer>> {
        Ok(self.state.lock().await.influencers.get(&id).cloned())
    }

    async fn find_influencer_by_user(&self, user_id: Uuid) -> StoreResult<Option<Influencer>> {
        let state = self.state.lock().await;
        Ok(state
            .influencers
            .values()
            .find(|i| i.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn insert_email_token(
        &self,
        token: NewEmailVerificationToken,
    ) -> StoreResult<EmailVerificationToken> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&token.user_id) {
            return Err(StoreError::NotFound);
        }
        if state
            .email_tokens
            .values()
            .any(|t| t.token_hash == token.token_hash)
        {
            return Err(StoreError::Conflict("token hash already exists".to_string()));
        }

        let stored = EmailVerificationToken {
            id: token.id,
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            used_at: None,
            created_at: token.created_at,
        };
        state.email_tokens.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_email_token_by_hash(
        &self,
        token_hash: &str,
    ) -> StoreResult<Option<EmailVerificationToken>> {
        let state = self.state.lock().await;
        Ok(state
            .email_tokens
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn list_email_tokens(&self, user_id: Uuid) -> StoreResult<Vec<EmailVerificationToken>> {
        let state = self.state.lock().await;
        let tokens: Vec<_> = state
            .email_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(tokens, |t| t.created_at))
    }

    async fn delete_unused_email_tokens(&self, user_id: Uuid) -> StoreResult<usize> {
        let mut state = self.state.lock().await;
        let before = state.email_tokens.len();
        state
            .email_tokens
            .retain(|_, t| t.user_id != user_id || t.used_at.is_some());
        Ok(before - state.email_tokens.len())
    }

    async fn consume_email_token(&self, token_id: Uuid, now: DateTime<Utc>) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        let token = state
            .email_tokens
            .get(&token_id)
            .ok_or(StoreError::NotFound)?;
        if token.used_at.is_some() {
            return Err(StoreError::Conflict("token already used".to_string()));
        }
        let user_id = token.user_id;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }

        if let Some(token) = state.email_tokens.get_mut(&token_id) {
            token.used_at = Some(now);
        }
        let user = state.user_mut(user_id)?;
        user.email_verified_at = Some(now);
        if user.status == UserStatus::Provisional {
            user.status = UserStatus::VerificationPending;
        }
        user.updated_at = now;
        let user = user.clone();

        state.upsert_record(user_id, VerificationType::Email, now);
        Ok(user)
    }

    async fn list_verification_records(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<VerificationRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn submit_company_documents(
        &self,
        company_id: Uuid,
        documents: Vec<NewVerificationDocument>,
    ) -> StoreResult<Vec<VerificationDocument>> {
        let mut state = self.state.lock().await;
        let user_id = state
            .companies
            .get(&company_id)
            .map(|c| c.user_id)
            .ok_or(StoreError::NotFound)?;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let inserted: Vec<_> = documents
            .into_iter()
            .map(|doc| state.insert_document(doc, now))
            .collect();

        if let Some(company) = state.companies.get_mut(&company_id) {
            company.verification_status = CompanyVerificationStatus::Pending;
            company.updated_at = now;
        }
        let user = state.user_mut(user_id)?;
        user.status = UserStatus::VerificationPending;
        user.updated_at = now;

        Ok(inserted)
    }

    async fn insert_document(
        &self,
        document: NewVerificationDocument,
    ) -> StoreResult<VerificationDocument> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&document.user_id) {
            return Err(StoreError::NotFound);
        }
        Ok(state.insert_document(document, Utc::now()))
    }

    async fn find_document(&self, id: Uuid) -> StoreResult<Option<VerificationDocument>> {
        let state = self.state.lock().await;
        Ok(state.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents_for_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<VerificationDocument>> {
        let state = self.state.lock().await;
        let docs: Vec<_> = state
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(docs, |d| d.created_at))
    }

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> StoreResult<Vec<VerificationDocument>> {
        let state = self.state.lock().await;
        let mut docs: Vec<_> = state
            .documents
            .iter()
            .filter(|d| d.status == status)
            .cloned()
            .collect();
        docs.sort_by_key(|d| d.created_at);
        Ok(docs)
    }

    async fn approve_company(&self, company_id: Uuid, now: DateTime<Utc>) -> StoreResult<Company> {
        let mut state = self.state.lock().await;
        let user_id = state
            .companies
            .get(&company_id)
            .map(|c| c.user_id)
            .ok_or(StoreError::NotFound)?;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }

        for doc in state.documents.iter_mut().filter(|d| {
            d.company_id == Some(company_id) && d.status != DocumentStatus::Resubmit
        }) {
            doc.status = DocumentStatus::Approved;
            doc.rejection_reason = None;
            doc.reviewed_at = Some(now);
        }

        let user = state.user_mut(user_id)?;
        user.status = UserStatus::Verified;
        user.updated_at = now;

        state.upsert_record(user_id, VerificationType::Business, now);

        let company = state
            .companies
            .get_mut(&company_id)
            .ok_or(StoreError::NotFound)?;
        company.is_verified = true;
        company.verified_at = Some(now);
        company.verification_status = CompanyVerificationStatus::Verified;
        company.updated_at = now;
        Ok(company.clone())
    }

    async fn reject_company(
        &self,
        company_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Company> {
        let mut state = self.state.lock().await;
        let user_id = state
            .companies
            .get(&company_id)
            .map(|c| c.user_id)
            .ok_or(StoreError::NotFound)?;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }

        for doc in state.documents.iter_mut().filter(|d| {
            d.company_id == Some(company_id) && d.status != DocumentStatus::Resubmit
        }) {
            doc.status = DocumentStatus::Rejected;
            doc.rejection_reason = Some(reason.to_string());
            doc.reviewed_at = Some(now);
        }

        let user = state.user_mut(user_id)?;
        user.status = UserStatus::Provisional;
        user.updated_at = now;

        let company = state
            .companies
            .get_mut(&company_id)
            .ok_or(StoreError::NotFound)?;
        company.is_verified = false;
        company.verified_at = None;
        company.verification_status = CompanyVerificationStatus::Rejected;
        company.updated_at = now;
        Ok(company.clone())
    }

    async fn review_document(
        &self,
        document_id: Uuid,
        review: DocumentReview,
        now: DateTime<Utc>,
    ) -> StoreResult<VerificationDocument> {
        let mut state = self.state.lock().await;
        let doc = state
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        if doc.status != DocumentStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "document is {} not PENDING",
                doc.status
            )));
        }

        let approved = review == DocumentReview::Approve;
        if approved {
            if let Some(influencer_id) = doc.influencer_id {
                let influencer = state
                    .influencers
                    .get_mut(&influencer_id)
                    .ok_or(StoreError::NotFound)?;
                influencer.is_verified = true;
                influencer.updated_at = now;
            }
        }

        let stored = state
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or(StoreError::NotFound)?;
        match review {
            DocumentReview::Approve => {
                stored.status = DocumentStatus::Approved;
                stored.rejection_reason = None;
            },
            DocumentReview::Reject { reason } => {
                stored.status = DocumentStatus::Rejected;
                stored.rejection_reason = Some(reason);
            },
        }
        stored.reviewed_at = Some(now);
        Ok(stored.clone())
    }
}

#[async_trait]
impl OnboardingStore for MemoryStore {
    async fn find_onboarding(&self, user_id: Uuid) -> StoreResult<Option<OnboardingProgress>> {
        Ok(self.state.lock().await.onboarding.get(&user_id).cloned())
    }

    async fn create_onboarding(
        &self,
        progress: NewOnboardingProgress,
    ) -> StoreResult<OnboardingProgress> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.onboarding.get(&progress.user_id) {
            return Ok(existing.clone());
        }
        if !state.users.contains_key(&progress.user_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let created = OnboardingProgress {
            id: progress.id,
            user_id: progress.user_id,
            role: progress.role,
            completed_steps: progress.completed_steps,
            skipped: progress.skipped,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        state.onboarding.insert(created.user_id, created.clone());
        Ok(created)
    }

    async fn complete_onboarding_step(
        &self,
        user_id: Uuid,
        step: OnboardingStep,
        now: DateTime<Utc>,
    ) -> StoreResult<OnboardingProgress> {
        let mut state = self.state.lock().await;
        let progress = state.onboarding_mut(user_id)?;
        progress.record_step(step, now);
        Ok(progress.clone())
    }

    async fn skip_onboarding(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<OnboardingProgress> {
        let mut state = self.state.lock().await;
        let progress = state.onboarding_mut(user_id)?;
        progress.mark_skipped(now);
        Ok(progress.clone())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut state = self.state.lock().await;
        if !state.companies.contains_key(&project.company_id) {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let created = Project {
            id: project.id,
            company_id: project.company_id,
            title: project.title,
            description: project.description,
            budget: project.budget,
            status: project.status,
            matched_influencer_id: None,
            start_date: project.start_date,
            end_date: project.end_date,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.state.lock().await.projects.get(&id).cloned())
    }

    async fn list_projects_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Project>> {
        let state = self.state.lock().await;
        let projects: Vec<_> = state
            .projects
            .values()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(projects, |p| p.created_at))
    }

    async fn list_projects_for_influencer(
        &self,
        influencer_id: Uuid,
    ) -> StoreResult<Vec<Project>> {
        let state = self.state.lock().await;
        let projects: Vec<_> = state
            .projects
            .values()
            .filter(|p| p.matched_influencer_id == Some(influencer_id))
            .cloned()
            .collect();
        Ok(sorted_newest_first(projects, |p| p.created_at))
    }

    async fn transition_project(
        &self,
        id: Uuid,
        from: ProjectStatus,
        to: ProjectStatus,
    ) -> StoreResult<Project> {
        let mut state = self.state.lock().await;
        let project = state.projects.get_mut(&id).ok_or(StoreError::NotFound)?;
        if project.status != from {
            return Err(StoreError::Conflict(format!(
                "project is {} not {}",
                project.status, from
            )));
        }
        project.status = to;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }
}

#[async_trait]
impl ScoutStore for MemoryStore {
    async fn create_scout(&self, scout: NewScout) -> StoreResult<Scout> {
        let mut state = self.state.lock().await;
        if state
            .scouts
            .values()
            .any(|s| s.project_id == scout.project_id && s.influencer_id == scout.influencer_id)
        {
            return Err(StoreError::Conflict(
                "influencer already scouted for this project".to_string(),
            ));
        }
        if !state.projects.contains_key(&scout.project_id)
            || !state.influencers.contains_key(&scout.influencer_id)
        {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        let created = Scout {
            id: scout.id,
            project_id: scout.project_id,
            influencer_id: scout.influencer_id,
            company_id: scout.company_id,
            status: scout.status,
            message: scout.message,
            rejection_reason: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        };
        state.scouts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_scout(&self, id: Uuid) -> StoreResult<Option<Scout>> {
        Ok(self.state.lock().await.scouts.get(&id).cloned())
    }

    async fn list_scouts_for_influencer(
        &self,
        influencer_id: Uuid,
        status: Option<ScoutStatus>,
    ) -> StoreResult<Vec<Scout>> {
        let state = self.state.lock().await;
        let scouts: Vec<_> = state
            .scouts
            .values()
            .filter(|s| s.influencer_id == influencer_id)
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect();
        Ok(sorted_newest_first(scouts, |s| s.created_at))
    }

    async fn list_scouts_for_company(
        &self,
        company_id: Uuid,
        status: Option<ScoutStatus>,
    ) -> StoreResult<Vec<Scout>> {
        let state = self.state.lock().await;
        let scouts: Vec<_> = state
            .scouts
            .values()
            .filter(|s| s.company_id == company_id)
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect();
        Ok(sorted_newest_first(scouts, |s| s.created_at))
    }

    async fn accept_scout(
        &self,
        scout_id: Uuid,
        policy: MatchPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<(Scout, Project)> {
        let mut state = self.state.lock().await;
        let scout = state.scouts.get(&scout_id).cloned().ok_or(StoreError::NotFound)?;
        if scout.status != ScoutStatus::Pending {
            return Err(StoreError::Conflict("scout already responded".to_string()));
        }
        let project = state
            .projects
            .get(&scout.project_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        if !policy.allows_match(project.matched_influencer_id, scout.influencer_id) {
            return Err(StoreError::Conflict(
                "project already matched to another influencer".to_string(),
            ));
        }

        let project = {
            let stored = state
                .projects
                .get_mut(&scout.project_id)
                .ok_or(StoreError::NotFound)?;
            stored.matched_influencer_id = Some(scout.influencer_id);
            if stored.status == ProjectStatus::Pending {
                stored.status = ProjectStatus::Matched;
            }
            stored.updated_at = now;
            stored.clone()
        };

        let stored = state.scouts.get_mut(&scout_id).ok_or(StoreError::NotFound)?;
        stored.status = ScoutStatus::Accepted;
        stored.responded_at = Some(now);
        stored.updated_at = now;

        Ok((stored.clone(), project))
    }

    async fn reject_scout(
        &self,
        scout_id: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<Scout> {
        let mut state = self.state.lock().await;
        let scout = state.scouts.get_mut(&scout_id).ok_or(StoreError::NotFound)?;
        if scout.status != ScoutStatus::Pending {
            return Err(StoreError::Conflict("scout already responded".to_string()));
        }
        scout.status = ScoutStatus::Rejected;
        scout.rejection_reason = reason;
        scout.responded_at = Some(now);
        scout.updated_at = now;
        Ok(scout.clone())
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn create_invoice(&self, invoice: NewInvoice) -> StoreResult<Invoice> {
        let mut state = self.state.lock().await;
        if state
            .invoices
            .values()
            .any(|i| i.invoice_number == invoice.invoice_number)
        {
            return Err(StoreError::Conflict(format!(
                "invoice number {} already exists",
                invoice.invoice_number
            )));
        }

        let created = Invoice {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            project_id: invoice.project_id,
            company_id: invoice.company_id,
            influencer_id: invoice.influencer_id,
            amount: invoice.amount,
            tax: invoice.tax,
            total_amount: invoice.total_amount,
            status: invoice.status,
            due_date: invoice.due_date,
            paid_at: None,
            created_at: invoice.created_at,
            updated_at: invoice.created_at,
        };
        state.invoices.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_invoice(&self, id: Uuid) -> StoreResult<Option<Invoice>> {
        Ok(self.state.lock().await.invoices.get(&id).cloned())
    }

    async fn list_invoices_for_influencer(
        &self,
        influencer_id: Uuid,
    ) -> StoreResult<Vec<Invoice>> {
        let state = self.state.lock().await;
        let invoices: Vec<_> = state
            .invoices
            .values()
            .filter(|i| i.influencer_id == influencer_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(invoices, |i| i.created_at))
    }

    async fn list_invoices_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Invoice>> {
        let state = self.state.lock().await;
        let invoices: Vec<_> = state
            .invoices
            .values()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(invoices, |i| i.created_at))
    }

    async fn mark_invoice_paid(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<Invoice> {
        let mut state = self.state.lock().await;
        let invoice = state.invoices.get_mut(&id).ok_or(StoreError::NotFound)?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(StoreError::Conflict("invoice already paid".to_string()));
        }
        invoice.status = InvoiceStatus::Paid;
        invoice.paid_at = Some(now);
        invoice.updated_at = now;
        Ok(invoice.clone())
    }

    async fn mark_invoice_overdue(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<Invoice> {
        let mut state = self.state.lock().await;
        let invoice = state.invoices.get_mut(&id).ok_or(StoreError::NotFound)?;
        if invoice.status != InvoiceStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "invoice is {} not PENDING",
                invoice.status
            )));
        }
        invoice.status = InvoiceStatus::Overdue;
        invoice.updated_at = now;
        Ok(invoice.clone())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&notification.user_id) {
            return Err(StoreError::NotFound);
        }

        let created = Notification {
            id: notification.id,
            user_id: notification.user_id,
            notification_type: notification.notification_type,
            title: notification.title,
            message: notification.message,
            data: notification.data,
            is_read: false,
            created_at: Utc::now(),
        };
        state.notifications.push(created.clone());
        Ok(created)
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        let state = self.state.lock().await;
        // Insertion order breaks ties between equal timestamps
        let notifications: Vec<_> = state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        Ok(notifications)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Notification> {
        let mut state = self.state.lock().await;
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        notification.is_read = true;
        Ok(notification.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
