// PostgreSQL store on diesel-async + bb8.
//
// Multi-row operations run inside one transaction and lock the rows they
// read with `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::{
    DocumentReview, InvoiceStore, NotificationStore, OnboardingStore, ProfileStore, ProjectStore,
    ScoutStore, Store, StoreError, StoreResult, UserStore, VerificationStore,
};
use crate::db::DieselPool;
use crate::models::{
    Company, CompanyVerificationStatus, DocumentStatus, EmailVerificationToken, Influencer,
    Invoice, InvoiceStatus, MatchPolicy, NewEmailVerificationToken, NewInvoice, NewNotification,
    NewOnboardingProgress, NewProfile, NewProject, NewScout, NewUser, NewVerificationDocument,
    Notification, OnboardingProgress, OnboardingStep, Project, ProjectStatus, Scout, ScoutStatus,
    User, UserStatus, VerificationDocument, VerificationRecord, VerificationStatus,
    VerificationType,
};
use crate::schema::{
    companies, email_verification_tokens, influencers, invoices, notifications,
    onboarding_progress, projects, scouts, users, verification_documents, verification_records,
};

type PooledConnection<'a> = bb8::PooledConnection<'a, AsyncDieselConnectionManager<AsyncPgConnection>>;

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_string())
            },
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for StoreError {
    fn from(err: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        StoreError::Pool(err.to_string())
    }
}

/// Inserts or refreshes the approved record for (user, type)
async fn upsert_approved_record(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    verification_type: VerificationType,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    diesel::insert_into(verification_records::table)
        .values((
            verification_records::id.eq(Uuid::new_v4()),
            verification_records::user_id.eq(user_id),
            verification_records::verification_type.eq(verification_type),
            verification_records::status.eq(VerificationStatus::Approved),
            verification_records::verified_at.eq(Some(now)),
            verification_records::created_at.eq(now),
            verification_records::updated_at.eq(now),
        ))
        .on_conflict((
            verification_records::user_id,
            verification_records::verification_type,
        ))
        .do_update()
        .set((
            verification_records::status.eq(VerificationStatus::Approved),
            verification_records::verified_at.eq(Some(now)),
            verification_records::updated_at.eq(now),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn set_status(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    status: UserStatus,
    now: DateTime<Utc>,
) -> StoreResult<User> {
    diesel::update(users::table.find(user_id))
        .set((users::status.eq(status), users::updated_at.eq(now)))
        .returning(User::as_returning())
        .get_result(conn)
        .await
        .map_err(Into::into)
}

async fn find_invoice_with(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> StoreResult<Option<Invoice>> {
    invoices::table
        .find(id)
        .select(Invoice::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(Into::into)
}

/// Marks the owner's rejected documents of `document_type` as superseded
async fn supersede_rejected(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    document_type: &str,
) -> StoreResult<()> {
    diesel::update(
        verification_documents::table
            .filter(verification_documents::user_id.eq(user_id))
            .filter(verification_documents::document_type.eq(document_type))
            .filter(verification_documents::status.eq(DocumentStatus::Rejected)),
    )
    .set(verification_documents::status.eq(DocumentStatus::Resubmit))
    .execute(conn)
    .await?;
    Ok(())
}

async fn lock_company(conn: &mut AsyncPgConnection, company_id: Uuid) -> StoreResult<Company> {
    companies::table
        .find(company_id)
        .select(Company::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or(StoreError::NotFound)
}

async fn lock_onboarding(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> StoreResult<OnboardingProgress> {
    onboarding_progress::table
        .filter(onboarding_progress::user_id.eq(user_id))
        .select(OnboardingProgress::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or(StoreError::NotFound)
}

async fn save_onboarding(
    conn: &mut AsyncPgConnection,
    progress: &OnboardingProgress,
) -> StoreResult<OnboardingProgress> {
    diesel::update(onboarding_progress::table.find(progress.id))
        .set((
            onboarding_progress::completed_steps.eq(&progress.completed_steps),
            onboarding_progress::skipped.eq(progress.skipped),
            onboarding_progress::completed_at.eq(progress.completed_at),
            onboarding_progress::updated_at.eq(progress.updated_at),
        ))
        .returning(OnboardingProgress::as_returning())
        .get_result(conn)
        .await
        .map_err(Into::into)
}

/// Diesel-backed implementation of [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: DieselPool,
}

impl PgStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DieselPool {
        &self.pool
    }

    async fn conn(&self) -> StoreResult<PooledConnection<'_>> {
        self.pool.get().await.map_err(Into::into)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_account(&self, user: NewUser, profile: NewProfile) -> StoreResult<User> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let created = diesel::insert_into(users::table)
                    .values(&user)
                    .returning(User::as_returning())
                    .get_result(conn)
                    .await?;

                match profile {
                    NewProfile::Company(company) => {
                        diesel::insert_into(companies::table)
                            .values(&company)
                            .execute(conn)
                            .await?;
                    },
                    NewProfile::Influencer(influencer) => {
                        diesel::insert_into(influencers::table)
                            .values(&influencer)
                            .execute(conn)
                            .await?;
                    },
                    NewProfile::None => {},
                }

                Ok(created)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<User> {
        let mut conn = self.conn().await?;
        diesel::update(users::table.find(id))
            .set((users::last_login_at.eq(Some(at)), users::updated_at.eq(at)))
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn set_user_status(&self, id: Uuid, status: UserStatus) -> StoreResult<User> {
        let mut pooled = self.conn().await?;
        set_status(&mut pooled, id, status, Utc::now()).await
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        let mut conn = self.conn().await?;
        companies::table
            .find(id)
            .select(Company::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn find_company_by_user(&self, user_id: Uuid) -> StoreResult<Option<Company>> {
        let mut conn = self.conn().await?;
        companies::table
            .filter(companies::user_id.eq(user_id))
            .select(Company::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn find_influencer(&self, id: Uuid) -> StoreResult<Option<Influencer>> {
        let mut conn = self.conn().await?;
        influencers::table
            .find(id)
            .select(Influencer::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn find_influencer_by_user(&self, user_id: Uuid) -> StoreResult<Option<Influencer>> {
        let mut conn = self.conn().await?;
        influencers::table
            .filter(influencers::user_id.eq(user_id))
            .select(Influencer::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }
}

#[async_trait]
impl VerificationStore for PgStore {
    async fn insert_email_token(
        &self,
        token: NewEmailVerificationToken,
    ) -> StoreResult<EmailVerificationToken> {
        let mut conn = self.conn().await?;
        diesel::insert_into(email_verification_tokens::table)
            .values(&token)
            .returning(EmailVerificationToken::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn find_email_token_by_hash(
        &self,
        token_hash: &str,
    ) -> StoreResult<Option<EmailVerificationToken>> {
        let mut conn = self.conn().await?;
        email_verification_tokens::table
            .filter(email_verification_tokens::token_hash.eq(token_hash))
            .select(EmailVerificationToken::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn list_email_tokens(&self, user_id: Uuid) -> StoreResult<Vec<EmailVerificationToken>> {
        let mut conn = self.conn().await?;
        email_verification_tokens::table
            .filter(email_verification_tokens::user_id.eq(user_id))
            .order(email_verification_tokens::created_at.desc())
            .select(EmailVerificationToken::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn delete_unused_email_tokens(&self, user_id: Uuid) -> StoreResult<usize> {
        let mut conn = self.conn().await?;
        diesel::delete(
            email_verification_tokens::table
                .filter(email_verification_tokens::user_id.eq(user_id))
                .filter(email_verification_tokens::used_at.is_null()),
        )
        .execute(&mut conn)
        .await
        .map_err(Into::into)
    }

    async fn consume_email_token(&self, token_id: Uuid, now: DateTime<Utc>) -> StoreResult<User> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                // The `used_at IS NULL` guard makes consumption single-shot
                let consumed = diesel::update(
                    email_verification_tokens::table
                        .find(token_id)
                        .filter(email_verification_tokens::used_at.is_null()),
                )
                .set(email_verification_tokens::used_at.eq(Some(now)))
                .returning(EmailVerificationToken::as_returning())
                .get_result(conn)
                .await
                .optional()?;

                let token = match consumed {
                    Some(token) => token,
                    None => {
                        let exists: i64 = email_verification_tokens::table
                            .find(token_id)
                            .count()
                            .get_result(conn)
                            .await?;
                        return Err(if exists > 0 {
                            StoreError::Conflict("token already used".to_string())
                        } else {
                            StoreError::NotFound
                        });
                    },
                };

                diesel::update(users::table.find(token.user_id))
                    .set((
                        users::email_verified_at.eq(Some(now)),
                        users::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;

                diesel::update(
                    users::table
                        .find(token.user_id)
                        .filter(users::status.eq(UserStatus::Provisional)),
                )
                .set(users::status.eq(UserStatus::VerificationPending))
                .execute(conn)
                .await?;

                upsert_approved_record(conn, token.user_id, VerificationType::Email, now).await?;

                users::table
                    .find(token.user_id)
                    .select(User::as_select())
                    .first(conn)
                    .await
                    .map_err(Into::into)
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_verification_records(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<VerificationRecord>> {
        let mut conn = self.conn().await?;
        verification_records::table
            .filter(verification_records::user_id.eq(user_id))
            .order(verification_records::created_at.asc())
            .select(VerificationRecord::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn submit_company_documents(
        &self,
        company_id: Uuid,
        documents: Vec<NewVerificationDocument>,
    ) -> StoreResult<Vec<VerificationDocument>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let company = lock_company(conn, company_id).await?;
                let now = Utc::now();

                for doc in &documents {
                    supersede_rejected(conn, doc.user_id, &doc.document_type).await?;
                }

                let inserted = diesel::insert_into(verification_documents::table)
                    .values(&documents)
                    .returning(VerificationDocument::as_returning())
                    .get_results(conn)
                    .await?;

                diesel::update(companies::table.find(company.id))
                    .set((
                        companies::verification_status.eq(CompanyVerificationStatus::Pending),
                        companies::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;

                set_status(conn, company.user_id, UserStatus::VerificationPending, now).await?;

                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
    }

    async fn insert_document(
        &self,
        document: NewVerificationDocument,
    ) -> StoreResult<VerificationDocument> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                supersede_rejected(conn, document.user_id, &document.document_type).await?;
                diesel::insert_into(verification_documents::table)
                    .values(&document)
                    .returning(VerificationDocument::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(Into::into)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_document(&self, id: Uuid) -> StoreResult<Option<VerificationDocument>> {
        let mut conn = self.conn().await?;
        verification_documents::table
            .find(id)
            .select(VerificationDocument::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn list_documents_for_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<VerificationDocument>> {
        let mut conn = self.conn().await?;
        verification_documents::table
            .filter(verification_documents::user_id.eq(user_id))
            .order(verification_documents::created_at.desc())
            .select(VerificationDocument::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> StoreResult<Vec<VerificationDocument>> {
        let mut conn = self.conn().await?;
        verification_documents::table
            .filter(verification_documents::status.eq(status))
            .order(verification_documents::created_at.asc())
            .select(VerificationDocument::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn approve_company(&self, company_id: Uuid, now: DateTime<Utc>) -> StoreResult<Company> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let company = lock_company(conn, company_id).await?;

                diesel::update(
                    verification_documents::table
                        .filter(verification_documents::company_id.eq(company.id))
                        .filter(verification_documents::status.ne(DocumentStatus::Resubmit)),
                )
                .set((
                    verification_documents::status.eq(DocumentStatus::Approved),
                    verification_documents::rejection_reason.eq(None::<String>),
                    verification_documents::reviewed_at.eq(Some(now)),
                ))
                .execute(conn)
                .await?;

                set_status(conn, company.user_id, UserStatus::Verified, now).await?;
                upsert_approved_record(conn, company.user_id, VerificationType::Business, now)
                    .await?;

                diesel::update(companies::table.find(company.id))
                    .set((
                        companies::is_verified.eq(true),
                        companies::verified_at.eq(Some(now)),
                        companies::verification_status.eq(CompanyVerificationStatus::Verified),
                        companies::updated_at.eq(now),
                    ))
                    .returning(Company::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(Into::into)
            }
            .scope_boxed()
        })
        .await
    }

    async fn reject_company(
        &self,
        company_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Company> {
        let reason = reason.to_string();
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let company = lock_company(conn, company_id).await?;

                diesel::update(
                    verification_documents::table
                        .filter(verification_documents::company_id.eq(company.id))
                        .filter(verification_documents::status.ne(DocumentStatus::Resubmit)),
                )
                .set((
                    verification_documents::status.eq(DocumentStatus::Rejected),
                    verification_documents::rejection_reason.eq(Some(reason)),
                    verification_documents::reviewed_at.eq(Some(now)),
                ))
                .execute(conn)
                .await?;

                set_status(conn, company.user_id, UserStatus::Provisional, now).await?;

                diesel::update(companies::table.find(company.id))
                    .set((
                        companies::is_verified.eq(false),
                        companies::verified_at.eq(None::<DateTime<Utc>>),
                        companies::verification_status.eq(CompanyVerificationStatus::Rejected),
                        companies::updated_at.eq(now),
                    ))
                    .returning(Company::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(Into::into)
            }
            .scope_boxed()
        })
        .await
    }

    async fn review_document(
        &self,
        document_id: Uuid,
        review: DocumentReview,
        now: DateTime<Utc>,
    ) -> StoreResult<VerificationDocument> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let doc = verification_documents::table
                    .find(document_id)
                    .select(VerificationDocument::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(StoreError::NotFound)?;

                if doc.status != DocumentStatus::Pending {
                    return Err(StoreError::Conflict(format!(
                        "document is {} not PENDING",
                        doc.status
                    )));
                }

                let (status, reason) = match review {
                    DocumentReview::Approve => (DocumentStatus::Approved, None),
                    DocumentReview::Reject { reason } => (DocumentStatus::Rejected, Some(reason)),
                };

                if status == DocumentStatus::Approved {
                    if let Some(influencer_id) = doc.influencer_id {
                        diesel::update(influencers::table.find(influencer_id))
                            .set((
                                influencers::is_verified.eq(true),
                                influencers::updated_at.eq(now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                }

                diesel::update(verification_documents::table.find(doc.id))
                    .set((
                        verification_documents::status.eq(status),
                        verification_documents::rejection_reason.eq(reason),
                        verification_documents::reviewed_at.eq(Some(now)),
                    ))
                    .returning(VerificationDocument::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(Into::into)
            }
            .scope_boxed()
        })
        .await
    }
}

#[async_trait]
impl OnboardingStore for PgStore {
    async fn find_onboarding(&self, user_id: Uuid) -> StoreResult<Option<OnboardingProgress>> {
        let mut conn = self.conn().await?;
        onboarding_progress::table
            .filter(onboarding_progress::user_id.eq(user_id))
            .select(OnboardingProgress::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn create_onboarding(
        &self,
        progress: NewOnboardingProgress,
    ) -> StoreResult<OnboardingProgress> {
        let mut conn = self.conn().await?;
        diesel::insert_into(onboarding_progress::table)
            .values(&progress)
            .on_conflict(onboarding_progress::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await?;

        onboarding_progress::table
            .filter(onboarding_progress::user_id.eq(progress.user_id))
            .select(OnboardingProgress::as_select())
            .first(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn complete_onboarding_step(
        &self,
        user_id: Uuid,
        step: OnboardingStep,
        now: DateTime<Utc>,
    ) -> StoreResult<OnboardingProgress> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let mut progress = lock_onboarding(conn, user_id).await?;
                if !progress.record_step(step, now) {
                    return Ok(progress);
                }
                save_onboarding(conn, &progress).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn skip_onboarding(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<OnboardingProgress> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let mut progress = lock_onboarding(conn, user_id).await?;
                progress.mark_skipped(now);
                save_onboarding(conn, &progress).await
            }
            .scope_boxed()
        })
        .await
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut conn = self.conn().await?;
        diesel::insert_into(projects::table)
            .values(&project)
            .returning(Project::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let mut conn = self.conn().await?;
        projects::table
            .find(id)
            .select(Project::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn list_projects_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Project>> {
        let mut conn = self.conn().await?;
        projects::table
            .filter(projects::company_id.eq(company_id))
            .order(projects::created_at.desc())
            .select(Project::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn list_projects_for_influencer(
        &self,
        influencer_id: Uuid,
    ) -> StoreResult<Vec<Project>> {
        let mut conn = self.conn().await?;
        projects::table
            .filter(projects::matched_influencer_id.eq(influencer_id))
            .order(projects::created_at.desc())
            .select(Project::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn transition_project(
        &self,
        id: Uuid,
        from: ProjectStatus,
        to: ProjectStatus,
    ) -> StoreResult<Project> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(
            projects::table
                .find(id)
                .filter(projects::status.eq(from)),
        )
        .set((projects::status.eq(to), projects::updated_at.eq(Utc::now())))
        .returning(Project::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;

        match updated {
            Some(project) => Ok(project),
            None => {
                let current = projects::table
                    .find(id)
                    .select(projects::status)
                    .first::<ProjectStatus>(&mut conn)
                    .await
                    .optional()?;
                match current {
                    Some(status) => Err(StoreError::Conflict(format!(
                        "project is {} not {}",
                        status, from
                    ))),
                    None => Err(StoreError::NotFound),
                }
            },
        }
    }
}

#[async_trait]
impl ScoutStore for PgStore {
    async fn create_scout(&self, scout: NewScout) -> StoreResult<Scout> {
        let mut conn = self.conn().await?;
        diesel::insert_into(scouts::table)
            .values(&scout)
            .returning(Scout::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| match StoreError::from(e) {
                StoreError::Conflict(_) => StoreError::Conflict(
                    "influencer already scouted for this project".to_string(),
                ),
                other => other,
            })
    }

    async fn find_scout(&self, id: Uuid) -> StoreResult<Option<Scout>> {
        let mut conn = self.conn().await?;
        scouts::table
            .find(id)
            .select(Scout::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    async fn list_scouts_for_influencer(
        &self,
        influencer_id: Uuid,
        status: Option<ScoutStatus>,
    ) -> StoreResult<Vec<Scout>> {
        let mut conn = self.conn().await?;
        let mut query = scouts::table
            .filter(scouts::influencer_id.eq(influencer_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(scouts::status.eq(status));
        }
        query
            .order(scouts::created_at.desc())
            .select(Scout::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn list_scouts_for_company(
        &self,
        company_id: Uuid,
        status: Option<ScoutStatus>,
    ) -> StoreResult<Vec<Scout>> {
        let mut conn = self.conn().await?;
        let mut query = scouts::table
            .filter(scouts::company_id.eq(company_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(scouts::status.eq(status));
        }
        query
            .order(scouts::created_at.desc())
            .select(Scout::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn accept_scout(
        &self,
        scout_id: Uuid,
        policy: MatchPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<(Scout, Project)> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let scout = scouts::table
                    .find(scout_id)
                    .select(Scout::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(StoreError::NotFound)?;
                if scout.status != ScoutStatus::Pending {
                    return Err(StoreError::Conflict("scout already responded".to_string()));
                }

                let project = projects::table
                    .find(scout.project_id)
                    .select(Project::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(StoreError::NotFound)?;
                if !policy.allows_match(project.matched_influencer_id, scout.influencer_id) {
                    return Err(StoreError::Conflict(
                        "project already matched to another influencer".to_string(),
                    ));
                }

                let next_status = if project.status == ProjectStatus::Pending {
                    ProjectStatus::Matched
                } else {
                    project.status
                };
                let project = diesel::update(projects::table.find(project.id))
                    .set((
                        projects::matched_influencer_id.eq(Some(scout.influencer_id)),
                        projects::status.eq(next_status),
                        projects::updated_at.eq(now),
                    ))
                    .returning(Project::as_returning())
                    .get_result(conn)
                    .await?;

                let scout = diesel::update(scouts::table.find(scout.id))
                    .set((
                        scouts::status.eq(ScoutStatus::Accepted),
                        scouts::responded_at.eq(Some(now)),
                        scouts::updated_at.eq(now),
                    ))
                    .returning(Scout::as_returning())
                    .get_result(conn)
                    .await?;

                Ok((scout, project))
            }
            .scope_boxed()
        })
        .await
    }

    async fn reject_scout(
        &self,
        scout_id: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<Scout> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(
            scouts::table
                .find(scout_id)
                .filter(scouts::status.eq(ScoutStatus::Pending)),
        )
        .set((
            scouts::status.eq(ScoutStatus::Rejected),
            scouts::rejection_reason.eq(reason),
            scouts::responded_at.eq(Some(now)),
            scouts::updated_at.eq(now),
        ))
        .returning(Scout::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;

        match updated {
            Some(scout) => Ok(scout),
            None => {
                let exists: i64 = scouts::table
                    .find(scout_id)
                    .count()
                    .get_result(&mut conn)
                    .await?;
                if exists > 0 {
                    Err(StoreError::Conflict("scout already responded".to_string()))
                } else {
                    Err(StoreError::NotFound)
                }
            },
        }
    }
}

#[async_trait]
impl InvoiceStore for PgStore {
    async fn create_invoice(&self, invoice: NewInvoice) -> StoreResult<Invoice> {
        let mut conn = self.conn().await?;
        diesel::insert_into(invoices::table)
            .values(&invoice)
            .returning(Invoice::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn find_invoice(&self, id: Uuid) -> StoreResult<Option<Invoice>> {
        let mut conn = self.conn().await?;
        find_invoice_with(&mut conn, id).await
    }

    async fn list_invoices_for_influencer(
        &self,
        influencer_id: Uuid,
    ) -> StoreResult<Vec<Invoice>> {
        let mut conn = self.conn().await?;
        invoices::table
            .filter(invoices::influencer_id.eq(influencer_id))
            .order(invoices::created_at.desc())
            .select(Invoice::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn list_invoices_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Invoice>> {
        let mut conn = self.conn().await?;
        invoices::table
            .filter(invoices::company_id.eq(company_id))
            .order(invoices::created_at.desc())
            .select(Invoice::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn mark_invoice_paid(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<Invoice> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(
            invoices::table
                .find(id)
                .filter(invoices::status.ne(InvoiceStatus::Paid)),
        )
        .set((
            invoices::status.eq(InvoiceStatus::Paid),
            invoices::paid_at.eq(Some(now)),
            invoices::updated_at.eq(now),
        ))
        .returning(Invoice::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;

        match updated {
            Some(invoice) => Ok(invoice),
            None => match find_invoice_with(&mut conn, id).await? {
                Some(_) => Err(StoreError::Conflict("invoice already paid".to_string())),
                None => Err(StoreError::NotFound),
            },
        }
    }

    async fn mark_invoice_overdue(&self, id: Uuid, now: DateTime<Utc>) -> StoreResult<Invoice> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(
            invoices::table
                .find(id)
                .filter(invoices::status.eq(InvoiceStatus::Pending)),
        )
        .set((
            invoices::status.eq(InvoiceStatus::Overdue),
            invoices::updated_at.eq(now),
        ))
        .returning(Invoice::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;

        match updated {
            Some(invoice) => Ok(invoice),
            None => match find_invoice_with(&mut conn, id).await? {
                Some(invoice) => Err(StoreError::Conflict(format!(
                    "invoice is {} not PENDING",
                    invoice.status
                ))),
                None => Err(StoreError::NotFound),
            },
        }
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        let mut conn = self.conn().await?;
        diesel::insert_into(notifications::table)
            .values(&notification)
            .returning(Notification::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        let mut conn = self.conn().await?;
        let mut query = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::is_read.eq(false));
        }
        query
            .order(notifications::created_at.desc())
            .select(Notification::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Notification> {
        let mut conn = self.conn().await?;
        diesel::update(
            notifications::table
                .find(id)
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::is_read.eq(true))
        .returning(Notification::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(Into::into)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}
