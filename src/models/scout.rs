use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::scouts;

/// `PENDING -> ACCEPTED | REJECTED`; both responses are terminal
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
pub enum ScoutStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ScoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoutStatus::Pending => "PENDING",
            ScoutStatus::Accepted => "ACCEPTED",
            ScoutStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ScoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ScoutStatus::Pending),
            "ACCEPTED" => Ok(ScoutStatus::Accepted),
            "REJECTED" => Ok(ScoutStatus::Rejected),
            _ => Err(format!("Invalid scout status: {}", s)),
        }
    }
}

text_enum_sql!(ScoutStatus);

/// What accepting a scout does to a project that already has a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every acceptance overwrites `matched_influencer_id`
    #[default]
    LastAcceptWins,
    /// Acceptance fails once the project is matched to someone else
    LockOnFirstMatch,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPolicy::LastAcceptWins => "last_accept_wins",
            MatchPolicy::LockOnFirstMatch => "lock_on_first_match",
        }
    }

    /// Whether `influencer_id` may take a project currently matched to `current`
    pub fn allows_match(&self, current: Option<Uuid>, influencer_id: Uuid) -> bool {
        match (self, current) {
            (MatchPolicy::LastAcceptWins, _) => true,
            (MatchPolicy::LockOnFirstMatch, None) => true,
            (MatchPolicy::LockOnFirstMatch, Some(existing)) => existing == influencer_id,
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_accept_wins" => Ok(MatchPolicy::LastAcceptWins),
            "lock_on_first_match" => Ok(MatchPolicy::LockOnFirstMatch),
            _ => Err(format!("Invalid scout match policy: {}", s)),
        }
    }
}

/// A company's invitation to an influencer for one project.
/// Unique per (project_id, influencer_id).
#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = scouts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Scout {
    pub id: Uuid,
    pub project_id: Uuid,
    pub influencer_id: Uuid,
    pub company_id: Uuid,
    pub status: ScoutStatus,
    pub message: Option<String>,
    pub rejection_reason: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scouts)]
pub struct NewScout {
    pub id: Uuid,
    pub project_id: Uuid,
    pub influencer_id: Uuid,
    pub company_id: Uuid,
    pub status: ScoutStatus,
    pub message: Option<String>,
}
