// Onboarding checklist: the fixed step list, per-role catalog and the
// per-user progress row

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::user::UserRole;
use crate::schema::onboarding_progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStep {
    ProfileSetup,
    EmailVerification,
    DocumentSubmission,
    PlatformTour,
    FirstAction,
    NotificationSettings,
    PaymentSetup,
}

impl OnboardingStep {
    /// Every step, in checklist order. The single source of truth for the
    /// step count.
    pub const ALL: [OnboardingStep; 7] = [
        OnboardingStep::ProfileSetup,
        OnboardingStep::EmailVerification,
        OnboardingStep::DocumentSubmission,
        OnboardingStep::PlatformTour,
        OnboardingStep::FirstAction,
        OnboardingStep::NotificationSettings,
        OnboardingStep::PaymentSetup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::ProfileSetup => "PROFILE_SETUP",
            OnboardingStep::EmailVerification => "EMAIL_VERIFICATION",
            OnboardingStep::DocumentSubmission => "DOCUMENT_SUBMISSION",
            OnboardingStep::PlatformTour => "PLATFORM_TOUR",
            OnboardingStep::FirstAction => "FIRST_ACTION",
            OnboardingStep::NotificationSettings => "NOTIFICATION_SETTINGS",
            OnboardingStep::PaymentSetup => "PAYMENT_SETUP",
        }
    }

    /// Checklist position; exhaustive so a new variant fails to compile here
    pub fn position(&self) -> usize {
        match self {
            OnboardingStep::ProfileSetup => 0,
            OnboardingStep::EmailVerification => 1,
            OnboardingStep::DocumentSubmission => 2,
            OnboardingStep::PlatformTour => 3,
            OnboardingStep::FirstAction => 4,
            OnboardingStep::NotificationSettings => 5,
            OnboardingStep::PaymentSetup => 6,
        }
    }
}

impl FromStr for OnboardingStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OnboardingStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid onboarding step: {}", s))
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const TOTAL_ONBOARDING_STEPS: usize = OnboardingStep::ALL.len();

/// Descriptive metadata for one checklist entry
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub step: OnboardingStep,
    pub title: &'static str,
    pub description: &'static str,
    pub estimated_minutes: u32,
}

const fn info(
    step: OnboardingStep,
    title: &'static str,
    description: &'static str,
    estimated_minutes: u32,
) -> StepInfo {
    StepInfo {
        step,
        title,
        description,
        estimated_minutes,
    }
}

const COMPANY_STEPS: [StepInfo; TOTAL_ONBOARDING_STEPS] = [
    info(
        OnboardingStep::ProfileSetup,
        "Set up your company profile",
        "Add your company name, industry and website so influencers know who you are.",
        5,
    ),
    info(
        OnboardingStep::EmailVerification,
        "Verify your email",
        "Confirm the address we sent your verification link to.",
        1,
    ),
    info(
        OnboardingStep::DocumentSubmission,
        "Submit business documents",
        "Upload your business registration so our team can verify your company.",
        10,
    ),
    info(
        OnboardingStep::PlatformTour,
        "Take the platform tour",
        "Learn where projects, scouts and invoices live.",
        3,
    ),
    info(
        OnboardingStep::FirstAction,
        "Create your first project",
        "Describe a campaign, its budget and schedule.",
        10,
    ),
    info(
        OnboardingStep::NotificationSettings,
        "Choose notification preferences",
        "Decide how you hear about scout responses and invoices.",
        2,
    ),
    info(
        OnboardingStep::PaymentSetup,
        "Set up billing",
        "Add billing details so you can settle influencer invoices.",
        5,
    ),
];

const INFLUENCER_STEPS: [StepInfo; TOTAL_ONBOARDING_STEPS] = [
    info(
        OnboardingStep::ProfileSetup,
        "Set up your creator profile",
        "Add a display name, bio and your main platform.",
        5,
    ),
    info(
        OnboardingStep::EmailVerification,
        "Verify your email",
        "Confirm the address we sent your verification link to.",
        1,
    ),
    info(
        OnboardingStep::DocumentSubmission,
        "Verify your identity",
        "Upload an identity document so companies can trust your profile.",
        5,
    ),
    info(
        OnboardingStep::PlatformTour,
        "Take the platform tour",
        "Learn how scout invitations and invoices work.",
        3,
    ),
    info(
        OnboardingStep::FirstAction,
        "Connect a social account",
        "Link TikTok, YouTube or Twitter so companies can see your reach.",
        5,
    ),
    info(
        OnboardingStep::NotificationSettings,
        "Choose notification preferences",
        "Decide how you hear about new scout invitations.",
        2,
    ),
    info(
        OnboardingStep::PaymentSetup,
        "Set up payouts",
        "Add payout details so invoices can be paid to you.",
        5,
    ),
];

const ADMIN_STEPS: [StepInfo; TOTAL_ONBOARDING_STEPS] = [
    info(
        OnboardingStep::ProfileSetup,
        "Set up your profile",
        "Add your name and contact details.",
        2,
    ),
    info(
        OnboardingStep::EmailVerification,
        "Verify your email",
        "Confirm the address we sent your verification link to.",
        1,
    ),
    info(
        OnboardingStep::DocumentSubmission,
        "Review the verification queue",
        "Learn how document approval and rejection work.",
        5,
    ),
    info(
        OnboardingStep::PlatformTour,
        "Take the platform tour",
        "Learn where moderation tools live.",
        3,
    ),
    info(
        OnboardingStep::FirstAction,
        "Review your first submission",
        "Approve or reject a pending verification.",
        5,
    ),
    info(
        OnboardingStep::NotificationSettings,
        "Choose notification preferences",
        "Decide how you hear about new submissions.",
        2,
    ),
    info(
        OnboardingStep::PaymentSetup,
        "Review billing tools",
        "Learn how invoices are marked paid or overdue.",
        3,
    ),
];

/// Ordered step catalog for a role
pub fn onboarding_steps(role: UserRole) -> &'static [StepInfo] {
    match role {
        UserRole::Company => &COMPANY_STEPS,
        UserRole::Influencer => &INFLUENCER_STEPS,
        UserRole::Admin => &ADMIN_STEPS,
    }
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = onboarding_progress)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OnboardingProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub completed_steps: Vec<String>,
    pub skipped: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OnboardingProgress {
    /// Completed steps that still parse, in completion order
    pub fn steps(&self) -> Vec<OnboardingStep> {
        self.completed_steps
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    pub fn has_step(&self, step: OnboardingStep) -> bool {
        self.completed_steps.iter().any(|s| s == step.as_str())
    }

    pub fn percentage(&self) -> u32 {
        let done = self.steps().len().min(TOTAL_ONBOARDING_STEPS);
        (done * 100 / TOTAL_ONBOARDING_STEPS) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Adds `step` unless already present. Sets `completed_at` once every
    /// step is done. Returns whether anything changed.
    pub fn record_step(&mut self, step: OnboardingStep, now: DateTime<Utc>) -> bool {
        if self.has_step(step) {
            return false;
        }

        self.completed_steps.push(step.as_str().to_string());
        if self.completed_at.is_none() && self.steps().len() >= TOTAL_ONBOARDING_STEPS {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        true
    }

    /// Marks the checklist finished regardless of partial progress
    pub fn mark_skipped(&mut self, now: DateTime<Utc>) {
        self.skipped = true;
        self.completed_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = onboarding_progress)]
pub struct NewOnboardingProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub completed_steps: Vec<String>,
    pub skipped: bool,
}

impl NewOnboardingProgress {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            completed_steps: Vec::new(),
            skipped: false,
        }
    }
}
