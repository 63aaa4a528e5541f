// Registration, login and account administration

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    user::normalize_email, Company, Influencer, NewCompany, NewInfluencer, NewProfile, NewUser,
    User, UserRole, UserStatus, VerificationRecord,
};
use crate::services::email_verification::EmailVerificationService;
use crate::services::jwt::JwtService;
use crate::services::onboarding::OnboardingService;
use crate::store::{SharedStore, StoreError};
use crate::utils::password::{
    hash_password_with_config, validate_password_strength, verify_password, PasswordConfig,
};
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::trim_required;

pub const NEXT_STEP_VERIFY_EMAIL: &str = "VERIFY_EMAIL";

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub role: UserRole,

    #[validate(length(max = 255, message = "Company name must be less than 255 characters"))]
    pub company_name: Option<String>,

    #[validate(length(max = 255, message = "Display name must be less than 255 characters"))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredAccount {
    pub user: User,
    #[serde(rename = "nextStep")]
    pub next_step: &'static str,
    pub verification_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AccountOverview {
    pub user: User,
    pub company: Option<Company>,
    pub influencer: Option<Influencer>,
    pub verification_records: Vec<VerificationRecord>,
}

#[derive(Clone)]
pub struct AccountService {
    store: SharedStore,
    jwt: Arc<JwtService>,
    email_verification: Arc<EmailVerificationService>,
    onboarding: Arc<OnboardingService>,
    password_config: Arc<PasswordConfig>,
}

impl AccountService {
    pub fn new(
        store: SharedStore,
        jwt: Arc<JwtService>,
        email_verification: Arc<EmailVerificationService>,
        onboarding: Arc<OnboardingService>,
    ) -> Self {
        Self {
            store,
            jwt,
            email_verification,
            onboarding,
            password_config: Arc::new(PasswordConfig::default()),
        }
    }

    pub fn with_password_config(mut self, config: PasswordConfig) -> Self {
        self.password_config = Arc::new(config);
        self
    }

    /// Creates a `PROVISIONAL` user with its role profile, starts onboarding
    /// and sends the verification email. Email delivery problems are
    /// reported through `verification_sent`, never as a failure.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<RegisteredAccount> {
        request.validate()?;

        let profile_name = match request.role {
            UserRole::Company => Some(
                trim_required(request.company_name.as_deref().unwrap_or(""), "Company name")
                    .map_err(ServiceError::Validation)?,
            ),
            UserRole::Influencer => Some(
                trim_required(request.display_name.as_deref().unwrap_or(""), "Display name")
                    .map_err(ServiceError::Validation)?,
            ),
            UserRole::Admin => {
                return Err(ServiceError::BadRequest(
                    "Admin accounts cannot be self-registered".to_string(),
                ))
            },
        };

        let password = request.password.clone();
        let password_config = self.password_config.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password_with_config(&password, &password_config))
                .await
                .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))??;

        let new_user = NewUser::new(&request.email, password_hash, request.role);
        let profile = match (request.role, profile_name) {
            (UserRole::Company, Some(name)) => NewProfile::Company(NewCompany::new(new_user.id, name)),
            (UserRole::Influencer, Some(name)) => {
                NewProfile::Influencer(NewInfluencer::new(new_user.id, name))
            },
            _ => NewProfile::None,
        };

        let user = self
            .store
            .create_account(new_user, profile)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    ServiceError::Conflict("An account with this email already exists".to_string())
                },
                other => other.into(),
            })?;

        info!("Registered {} account {}", user.role, user.id);

        if let Err(e) = self.onboarding.initialize(user.id, user.role).await {
            warn!("Failed to initialize onboarding for user {}: {}", user.id, e);
        }

        let verification_sent = match self
            .email_verification
            .send_verification(user.id, &user.email)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("Verification email for user {} was not sent: {}", user.id, e);
                false
            },
        };

        Ok(RegisteredAccount {
            user,
            next_step: NEXT_STEP_VERIFY_EMAIL,
            verification_sent,
        })
    }

    /// Unknown email and wrong password share one message
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let email = normalize_email(&request.email);

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                info!("Login attempt for unknown email");
                return Err(ServiceError::Unauthorized);
            },
        };

        if !verify_password(&request.password, &user.password_hash)? {
            info!("Failed login for user {}", user.id);
            return Err(ServiceError::Unauthorized);
        }

        if user.status == UserStatus::Suspended {
            return Err(ServiceError::Forbidden("Account is suspended".to_string()));
        }

        let user = self.store.record_login(user.id, Utc::now()).await?;
        let access_token = self.jwt.generate_access_token(&user)?;

        info!("User {} logged in", user.id);

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry(),
            user,
        })
    }

    pub async fn overview(&self, user_id: Uuid) -> ServiceResult<AccountOverview> {
        let user = self.find_user(user_id).await?;
        let company = self.store.find_company_by_user(user_id).await?;
        let influencer = self.store.find_influencer_by_user(user_id).await?;
        let verification_records = self.store.list_verification_records(user_id).await?;

        Ok(AccountOverview {
            user,
            company,
            influencer,
            verification_records,
        })
    }

    #[instrument(skip(self))]
    pub async fn suspend_user(&self, user_id: Uuid) -> ServiceResult<User> {
        let user = self.find_user(user_id).await?;
        if user.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin accounts cannot be suspended".to_string(),
            ));
        }

        let user = self
            .store
            .set_user_status(user.id, UserStatus::Suspended)
            .await?;
        info!("Suspended user {}", user.id);
        Ok(user)
    }

    pub async fn find_user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str) -> RegisterRequest {
        RegisterRequest {
            email: "creator@example.com".to_string(),
            password: password.to_string(),
            role: UserRole::Influencer,
            company_name: None,
            display_name: Some("Creator".to_string()),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(request("Str0ng!Pass").validate().is_ok());
        assert!(request("weak").validate().is_err());

        let mut bad_email = request("Str0ng!Pass");
        bad_email.email = "not-an-email".to_string();
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
