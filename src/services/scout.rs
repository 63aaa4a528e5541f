// Scout invitations: a company invites an influencer to one of its projects,
// the influencer accepts or rejects exactly once.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    Actor, Company, Influencer, MatchPolicy, NewScout, NotificationKind, Project, Scout,
    ScoutStatus, UserRole,
};
use crate::services::notification::NotificationService;
use crate::store::{SharedStore, StoreError};
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::trim_optional;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SendScoutRequest {
    pub project_id: Uuid,
    pub influencer_id: Uuid,
    #[validate(length(max = 2000, message = "Message must be less than 2000 characters"))]
    pub message: Option<String>,
}

/// Outcome of an acceptance: the scout and the project it matched
#[derive(Debug, Serialize)]
pub struct ScoutAcceptance {
    pub scout: Scout,
    pub project: Project,
}

#[derive(Clone)]
pub struct ScoutService {
    store: SharedStore,
    notifications: Arc<NotificationService>,
    match_policy: MatchPolicy,
}

impl ScoutService {
    pub fn new(
        store: SharedStore,
        notifications: Arc<NotificationService>,
        match_policy: MatchPolicy,
    ) -> Self {
        Self {
            store,
            notifications,
            match_policy,
        }
    }

    pub fn match_policy(&self) -> MatchPolicy {
        self.match_policy
    }

    /// The caller must own the project; one scout per (project, influencer)
    #[instrument(skip(self, request), fields(user_id = %actor.user_id))]
    pub async fn send_scout_invitation(
        &self,
        actor: Actor,
        request: SendScoutRequest,
    ) -> ServiceResult<Scout> {
        request.validate()?;

        let company = self
            .company_of(actor, "Only companies can send scout invitations")
            .await?;
        let project = self
            .store
            .find_project(request.project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;
        if project.company_id != company.id {
            return Err(ServiceError::Forbidden(
                "You can only scout for your own projects".to_string(),
            ));
        }

        let influencer = self
            .store
            .find_influencer(request.influencer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Influencer"))?;

        let scout = self
            .store
            .create_scout(NewScout {
                id: Uuid::new_v4(),
                project_id: project.id,
                influencer_id: influencer.id,
                company_id: company.id,
                status: ScoutStatus::Pending,
                message: trim_optional(request.message.as_deref()),
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::Conflict(
                    "This influencer has already been scouted for this project".to_string(),
                ),
                other => other.into(),
            })?;

        info!(
            "Company {} scouted influencer {} for project {}",
            company.id, influencer.id, project.id
        );

        self.notifications
            .notify(
                influencer.user_id,
                NotificationKind::ScoutReceived,
                "New scout invitation",
                &format!("{} invited you to \"{}\"", company.company_name, project.title),
                json!({ "scout_id": scout.id, "project_id": project.id }),
            )
            .await;

        Ok(scout)
    }

    /// Records the match on the project according to the configured
    /// match policy
    #[instrument(skip(self), fields(user_id = %actor.user_id))]
    pub async fn accept_scout(&self, actor: Actor, scout_id: Uuid) -> ServiceResult<ScoutAcceptance> {
        let (scout, _) = self.pending_scout_for(actor, scout_id).await?;

        let (scout, project) = self
            .store
            .accept_scout(scout.id, self.match_policy, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::Conflict(msg) => ServiceError::Conflict(msg),
                StoreError::NotFound => ServiceError::not_found("Scout"),
                other => other.into(),
            })?;

        info!(
            "Influencer {} accepted scout {}; project {} matched",
            scout.influencer_id, scout.id, project.id
        );

        self.notify_company(
            &scout,
            NotificationKind::ScoutAccepted,
            "Scout accepted",
            format!("Your invitation for \"{}\" was accepted", project.title),
        )
        .await;

        Ok(ScoutAcceptance { scout, project })
    }

    #[instrument(skip(self, reason), fields(user_id = %actor.user_id))]
    pub async fn reject_scout(
        &self,
        actor: Actor,
        scout_id: Uuid,
        reason: Option<String>,
    ) -> ServiceResult<Scout> {
        let (scout, _) = self.pending_scout_for(actor, scout_id).await?;

        let scout = self
            .store
            .reject_scout(scout.id, trim_optional(reason.as_deref()), Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => already_responded(),
                StoreError::NotFound => ServiceError::not_found("Scout"),
                other => other.into(),
            })?;

        info!("Influencer {} rejected scout {}", scout.influencer_id, scout.id);

        let message = match &scout.rejection_reason {
            Some(reason) => format!("Your invitation was declined: {}", reason),
            None => "Your invitation was declined".to_string(),
        };
        self.notify_company(&scout, NotificationKind::ScoutRejected, "Scout rejected", message)
            .await;

        Ok(scout)
    }

    /// Invitations received by the calling influencer
    pub async fn received_scouts(
        &self,
        actor: Actor,
        status: Option<ScoutStatus>,
    ) -> ServiceResult<Vec<Scout>> {
        let influencer = self.influencer_of(actor).await?;
        Ok(self
            .store
            .list_scouts_for_influencer(influencer.id, status)
            .await?)
    }

    /// Invitations sent by the calling company
    pub async fn sent_scouts(
        &self,
        actor: Actor,
        status: Option<ScoutStatus>,
    ) -> ServiceResult<Vec<Scout>> {
        let company = self
            .company_of(actor, "Only companies can list sent scout invitations")
            .await?;
        Ok(self.store.list_scouts_for_company(company.id, status).await?)
    }

    /// Loads the scout and checks that the caller is the invited influencer
    /// and that it has not been answered yet
    async fn pending_scout_for(&self, actor: Actor, scout_id: Uuid) -> ServiceResult<(Scout, Influencer)> {
        let scout = self
            .store
            .find_scout(scout_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Scout"))?;

        let influencer = self.influencer_of(actor).await?;
        if scout.influencer_id != influencer.id {
            return Err(ServiceError::Forbidden(
                "This scout invitation is not addressed to you".to_string(),
            ));
        }
        if scout.status != ScoutStatus::Pending {
            return Err(already_responded());
        }

        Ok((scout, influencer))
    }

    async fn notify_company(&self, scout: &Scout, kind: NotificationKind, title: &str, message: String) {
        if let Ok(Some(company)) = self.store.find_company(scout.company_id).await {
            self.notifications
                .notify(
                    company.user_id,
                    kind,
                    title,
                    &message,
                    json!({ "scout_id": scout.id, "project_id": scout.project_id }),
                )
                .await;
        }
    }

    /// `denied` is the Forbidden message for callers that are not companies
    async fn company_of(&self, actor: Actor, denied: &str) -> ServiceResult<Company> {
        if actor.role != UserRole::Company {
            return Err(ServiceError::Forbidden(denied.to_string()));
        }
        self.store
            .find_company_by_user(actor.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company profile"))
    }

    async fn influencer_of(&self, actor: Actor) -> ServiceResult<Influencer> {
        if actor.role != UserRole::Influencer {
            return Err(ServiceError::Forbidden(
                "Only influencers can respond to scout invitations".to_string(),
            ));
        }
        self.store
            .find_influencer_by_user(actor.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Influencer profile"))
    }
}

fn already_responded() -> ServiceError {
    ServiceError::Conflict("Scout invitation has already been responded to".to_string())
}
