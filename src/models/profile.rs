// Role profiles attached to a user: companies (clients) and influencers

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::{companies, influencers};

/// Business verification state of a company
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
pub enum CompanyVerificationStatus {
    Unsubmitted,
    Pending,
    Verified,
    Rejected,
}

impl CompanyVerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyVerificationStatus::Unsubmitted => "UNSUBMITTED",
            CompanyVerificationStatus::Pending => "PENDING",
            CompanyVerificationStatus::Verified => "VERIFIED",
            CompanyVerificationStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for CompanyVerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNSUBMITTED" => Ok(CompanyVerificationStatus::Unsubmitted),
            "PENDING" => Ok(CompanyVerificationStatus::Pending),
            "VERIFIED" => Ok(CompanyVerificationStatus::Verified),
            "REJECTED" => Ok(CompanyVerificationStatus::Rejected),
            _ => Err(format!("Invalid company verification status: {}", s)),
        }
    }
}

text_enum_sql!(CompanyVerificationStatus);

#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub is_verified: bool,
    pub verification_status: CompanyVerificationStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
}

impl NewCompany {
    pub fn new(user_id: Uuid, company_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            company_name,
            industry: None,
            website: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = influencers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Influencer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub primary_platform: Option<String>,
    pub follower_count: i64,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = influencers)]
pub struct NewInfluencer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub primary_platform: Option<String>,
}

impl NewInfluencer {
    pub fn new(user_id: Uuid, display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            display_name,
            bio: None,
            primary_platform: None,
        }
    }
}

/// Role profile created together with a new account
#[derive(Debug, Clone)]
pub enum NewProfile {
    Company(NewCompany),
    Influencer(NewInfluencer),
    None,
}
