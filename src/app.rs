// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    services::{
        AccountService, BillingService, DataExportService, DocumentVerificationService,
        EmailService, EmailVerificationService, JwtConfig, JwtService, NotificationService,
        OnboardingService, ProjectService, ScoutService,
    },
    store::SharedStore,
    utils::password::PasswordConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub jwt: Arc<JwtService>,
    pub email: Arc<EmailService>,
    pub notifications: Arc<NotificationService>,
    pub email_verification: Arc<EmailVerificationService>,
    pub onboarding: Arc<OnboardingService>,
    pub accounts: Arc<AccountService>,
    pub documents: Arc<DocumentVerificationService>,
    pub projects: Arc<ProjectService>,
    pub scouts: Arc<ScoutService>,
    pub billing: Arc<BillingService>,
    pub export: Arc<DataExportService>,
}

impl AppState {
    pub fn new(store: SharedStore, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        Self::with_password_config(store, config, PasswordConfig::default())
    }

    /// Wires every service over the same store
    pub fn with_password_config(
        store: SharedStore,
        config: Arc<AppConfig>,
        password_config: PasswordConfig,
    ) -> anyhow::Result<Self> {
        let jwt = Arc::new(JwtService::new(JwtConfig::from(&config.jwt)));
        let email = Arc::new(EmailService::new(config.email.clone())?);
        let notifications = Arc::new(NotificationService::new(store.clone()));
        let email_verification = Arc::new(EmailVerificationService::new(
            store.clone(),
            email.clone(),
            notifications.clone(),
            config.email.verification_ttl_hours,
        ));
        let onboarding = Arc::new(OnboardingService::new(store.clone()));
        let accounts = Arc::new(
            AccountService::new(
                store.clone(),
                jwt.clone(),
                email_verification.clone(),
                onboarding.clone(),
            )
            .with_password_config(password_config),
        );
        let documents = Arc::new(DocumentVerificationService::new(
            store.clone(),
            email.clone(),
            notifications.clone(),
        ));
        let projects = Arc::new(ProjectService::new(store.clone()));
        let scouts = Arc::new(ScoutService::new(
            store.clone(),
            notifications.clone(),
            config.marketplace.scout_match_policy,
        ));
        let billing = Arc::new(BillingService::new(
            store.clone(),
            notifications.clone(),
            config.marketplace.clone(),
        ));
        let export = Arc::new(DataExportService::new(store.clone()));

        Ok(Self {
            config,
            store,
            jwt,
            email,
            notifications,
            email_verification,
            onboarding,
            accounts,
            documents,
            projects,
            scouts,
            billing,
            export,
        })
    }
}
