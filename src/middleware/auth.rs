// Caller identity established by `auth_middleware`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AccessTokenClaims, Actor, UserRole};
use crate::services::jwt::JwtError;

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token_id: String,
    pub email: String,
    pub role: UserRole,
    pub exp: u64,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl TryFrom<AccessTokenClaims> for AuthenticatedUser {
    type Error = JwtError;

    fn try_from(claims: AccessTokenClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| JwtError::InvalidToken("subject is not a user id".to_string()))?;

        Ok(Self {
            user_id,
            token_id: claims.jti,
            email: claims.email,
            role: claims.role,
            exp: claims.exp,
        })
    }
}

/// An `AuthenticatedUser` whose role is ADMIN
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);
