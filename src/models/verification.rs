// Verification models: email tokens, per-type verification records and
// uploaded identity / business documents

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::schema::{email_verification_tokens, verification_documents, verification_records};

/// Largest accepted document, in bytes (20 MiB)
pub const MAX_DOCUMENT_SIZE: i64 = 20 * 1024 * 1024;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    diesel::deserialize::FromSqlRow,
    diesel::expression::AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationType {
    Email,
    Business,
}

impl VerificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationType::Email => "EMAIL",
            VerificationType::Business => "BUSINESS",
        }
    }
}

impl FromStr for VerificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(VerificationType::Email),
            "BUSINESS" => Ok(VerificationType::Business),
            _ => Err(format!("Invalid verification type: {}", s)),
        }
    }
}

text_enum_sql!(VerificationType);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    diesel::deserialize::FromSqlRow,
    diesel::expression::AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Approved,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Approved => "APPROVED",
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(VerificationStatus::Pending),
            "APPROVED" => Ok(VerificationStatus::Approved),
            _ => Err(format!("Invalid verification status: {}", s)),
        }
    }
}

text_enum_sql!(VerificationStatus);

/// Review state of an uploaded document.
///
/// `PENDING -> APPROVED | REJECTED`; a `REJECTED` document becomes
/// `RESUBMIT` once its owner uploads a replacement of the same type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    diesel::deserialize::FromSqlRow,
    diesel::expression::AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
    Resubmit,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "PENDING",
            DocumentStatus::Approved => "APPROVED",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::Resubmit => "RESUBMIT",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(DocumentStatus::Pending),
            "APPROVED" => Ok(DocumentStatus::Approved),
            "REJECTED" => Ok(DocumentStatus::Rejected),
            "RESUBMIT" => Ok(DocumentStatus::Resubmit),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

text_enum_sql!(DocumentStatus);

/// Email verification token. Only the SHA-256 digest of the token is stored.
#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = email_verification_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailVerificationToken {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmailVerificationToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_verification_tokens)]
pub struct NewEmailVerificationToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One row per (user, verification type), upserted on approval
#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = verification_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VerificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub verification_type: VerificationType,
    pub status: VerificationStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = verification_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VerificationDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub influencer_id: Option<Uuid>,
    pub document_type: String,
    pub document_url: String,
    pub file_name: String,
    pub file_size: i64,
    pub status: DocumentStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = verification_documents)]
pub struct NewVerificationDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub influencer_id: Option<Uuid>,
    pub document_type: String,
    pub document_url: String,
    pub file_name: String,
    pub file_size: i64,
    pub status: DocumentStatus,
}

/// Profile a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOwner {
    Company(Uuid),
    Influencer(Uuid),
}

impl NewVerificationDocument {
    pub fn new(user_id: Uuid, owner: DocumentOwner, descriptor: &DocumentDescriptor) -> Self {
        let (company_id, influencer_id) = match owner {
            DocumentOwner::Company(id) => (Some(id), None),
            DocumentOwner::Influencer(id) => (None, Some(id)),
        };

        Self {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            influencer_id,
            document_type: descriptor.document_type.trim().to_string(),
            document_url: descriptor.document_url.trim().to_string(),
            file_name: descriptor.file_name.trim().to_string(),
            file_size: descriptor.file_size,
            status: DocumentStatus::Pending,
        }
    }
}

/// Uploaded file descriptor submitted for review
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentDescriptor {
    #[validate(length(min = 1, max = 100, message = "Document type is required"))]
    pub document_type: String,

    #[validate(url(message = "Document URL must be a valid URL"))]
    pub document_url: String,

    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,

    #[validate(range(min = 1, max = 20971520, message = "File size must be between 1 byte and 20 MiB"))]
    pub file_size: i64,
}

impl DocumentDescriptor {
    /// Field validation plus an http(s) scheme check on the document URL
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;

        let parsed = url::Url::parse(self.document_url.trim())
            .map_err(|_| "Document URL must be a valid URL".to_string())?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err("Document URL must use http or https".to_string());
        }
        if self.file_size > MAX_DOCUMENT_SIZE {
            return Err("File size must be between 1 byte and 20 MiB".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn descriptor(url: &str, size: i64) -> DocumentDescriptor {
        DocumentDescriptor {
            document_type: "BUSINESS_REGISTRATION".to_string(),
            document_url: url.to_string(),
            file_name: "registration.pdf".to_string(),
            file_size: size,
        }
    }

    #[test]
    fn test_descriptor_accepts_https_document() {
        assert!(descriptor("https://files.example.com/reg.pdf", 2048).check().is_ok());
    }

    #[test]
    fn test_descriptor_rejects_bad_urls_and_sizes() {
        assert!(descriptor("not a url", 2048).check().is_err());
        assert!(descriptor("ftp://files.example.com/reg.pdf", 2048).check().is_err());
        assert!(descriptor("https://files.example.com/reg.pdf", 0).check().is_err());
        assert!(descriptor("https://files.example.com/reg.pdf", MAX_DOCUMENT_SIZE + 1)
            .check()
            .is_err());
    }

    #[test]
    fn test_token_expiry_is_strictly_after_deadline() {
        let now = Utc::now();
        let token = EmailVerificationToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: String::new(),
            expires_at: now,
            used_at: None,
            created_at: now - Duration::hours(24),
        };

        assert!(!token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::seconds(1)));
    }

    #[test]
    fn test_new_document_starts_pending_with_owner() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let doc = NewVerificationDocument::new(
            user_id,
            DocumentOwner::Company(company_id),
            &descriptor("https://files.example.com/reg.pdf", 10),
        );

        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(doc.company_id, Some(company_id));
        assert_eq!(doc.influencer_id, None);
    }
}
