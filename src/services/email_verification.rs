// Email ownership verification with single-use, time-limited tokens.
//
// The raw token only ever exists in the email link; the store keeps its
// SHA-256 digest and lookups go through the digest.

use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{user::normalize_email, NewEmailVerificationToken, NotificationKind, UserStatus};
use crate::services::email::EmailService;
use crate::services::notification::NotificationService;
use crate::store::{SharedStore, StoreError};
use crate::utils::service_error::{ServiceError, ServiceResult};

/// A freshly issued token. `token` is the raw value that goes into the link.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifiedEmail {
    pub user_id: Uuid,
    pub email: String,
    pub status: UserStatus,
}

/// 32 random bytes, base64url encoded, plus the digest to persist
pub fn generate_verification_token() -> (String, String) {
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token_bytes);

    let token = BASE64_URL_SAFE_NO_PAD.encode(token_bytes);
    let token_hash = hash_token(&token);
    (token, token_hash)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct EmailVerificationService {
    store: SharedStore,
    email: Arc<EmailService>,
    notifications: Arc<NotificationService>,
    token_ttl: Duration,
}

impl EmailVerificationService {
    pub fn new(
        store: SharedStore,
        email: Arc<EmailService>,
        notifications: Arc<NotificationService>,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            store,
            email,
            notifications,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    /// Persists a new token and emails the link. The token is stored before
    /// delivery is attempted, so a delivery failure still leaves it usable
    /// through a resend.
    #[instrument(skip(self))]
    pub async fn send_verification(&self, user_id: Uuid, email: &str) -> ServiceResult<IssuedToken> {
        let issued = self.issue_token(user_id).await?;

        let user_name = email.split('@').next().unwrap_or(email);
        self.email
            .send_verification_email(email, user_name, &issued.token)
            .await?;

        info!("Verification email issued for user {}", user_id);
        Ok(issued)
    }

    async fn issue_token(&self, user_id: Uuid) -> ServiceResult<IssuedToken> {
        let (token, token_hash) = generate_verification_token();
        let now = Utc::now();

        let stored = self
            .store
            .insert_email_token(NewEmailVerificationToken {
                id: Uuid::new_v4(),
                user_id,
                token_hash,
                expires_at: now + self.token_ttl,
                created_at: now,
            })
            .await?;

        Ok(IssuedToken {
            token_id: stored.id,
            token,
            created_at: stored.created_at,
            expires_at: stored.expires_at,
        })
    }

    /// Consumes a token: NotFound if unknown, Expired past its deadline,
    /// AlreadyUsed on the second attempt.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> ServiceResult<VerifiedEmail> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::BadRequest(
                "Verification token is required".to_string(),
            ));
        }

        let stored = self
            .store
            .find_email_token_by_hash(&hash_token(token))
            .await?
            .ok_or_else(|| ServiceError::not_found("Verification token"))?;

        let now = Utc::now();
        if stored.is_expired_at(now) {
            return Err(ServiceError::Expired);
        }
        if stored.is_used() {
            return Err(ServiceError::AlreadyUsed);
        }

        let user = self
            .store
            .consume_email_token(stored.id, now)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent verification of the same token
                StoreError::Conflict(_) => ServiceError::AlreadyUsed,
                StoreError::NotFound => ServiceError::not_found("User"),
                other => other.into(),
            })?;

        info!("Email verified for user {}", user.id);

        self.notifications
            .notify(
                user.id,
                NotificationKind::EmailVerified,
                "Email verified",
                "Your email address has been verified.",
                json!({ "email": user.email }),
            )
            .await;

        Ok(VerifiedEmail {
            user_id: user.id,
            email: user.email,
            status: user.status,
        })
    }

    /// Drops every unused token of the user and sends a fresh one, so at
    /// most one usable token exists afterwards.
    #[instrument(skip(self))]
    pub async fn resend(&self, user_id: Uuid) -> ServiceResult<IssuedToken> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        if user.is_email_verified() {
            return Err(ServiceError::Conflict("Email is already verified".to_string()));
        }

        let removed = self.store.delete_unused_email_tokens(user.id).await?;
        if removed > 0 {
            info!("Removed {} stale verification tokens for user {}", removed, user.id);
        }

        self.send_verification(user.id, &user.email).await
    }

    /// Public resend by email address. Never reveals whether the address
    /// exists or is already verified.
    #[instrument(skip(self))]
    pub async fn resend_for_email(&self, email: &str) {
        let email = normalize_email(email);

        let user = match self.store.find_user_by_email(&email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!("Verification resend requested for unknown email");
                return;
            },
            Err(e) => {
                warn!("Failed to look up user for verification resend: {}", e);
                return;
            },
        };

        match self.resend(user.id).await {
            Ok(_) => {},
            Err(ServiceError::Conflict(_)) => {
                info!("Verification resend requested for verified user {}", user.id)
            },
            Err(e) => warn!("Verification resend for user {} failed: {}", user.id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_url_safe_and_hashed() {
        let (token, token_hash) = generate_verification_token();

        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(token_hash, hash_token(&token));
        assert_eq!(token_hash.len(), 64);
        assert_ne!(token, token_hash);
    }

    #[test]
    fn test_tokens_are_unique() {
        let (first, _) = generate_verification_token();
        let (second, _) = generate_verification_token();
        assert_ne!(first, second);
    }
}
