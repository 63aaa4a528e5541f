// Company projects (campaigns) and their lifecycle

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Actor, Company, NewProject, Project, ProjectStatus, UserRole};
use crate::store::{SharedStore, StoreError};
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::trim_required;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be less than 5000 characters"))]
    #[serde(default)]
    pub description: String,

    #[validate(range(min = 1, message = "Budget must be greater than zero"))]
    pub budget: i64,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ProjectService {
    store: SharedStore,
}

impl ProjectService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, request), fields(user_id = %actor.user_id))]
    pub async fn create_project(
        &self,
        actor: Actor,
        request: CreateProjectRequest,
    ) -> ServiceResult<Project> {
        request.validate()?;
        let title = trim_required(&request.title, "Title").map_err(ServiceError::Validation)?;
        if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
            if end < start {
                return Err(ServiceError::Validation(
                    "End date cannot be before start date".to_string(),
                ));
            }
        }

        let company = self.company_of(actor).await?;
        let project = self
            .store
            .create_project(NewProject {
                id: Uuid::new_v4(),
                company_id: company.id,
                title,
                description: request.description.trim().to_string(),
                budget: request.budget,
                status: ProjectStatus::Pending,
                start_date: request.start_date,
                end_date: request.end_date,
            })
            .await?;

        info!("Company {} created project {}", company.id, project.id);
        Ok(project)
    }

    /// Companies see their own projects, influencers the ones they are
    /// matched to
    pub async fn list_projects(&self, actor: Actor) -> ServiceResult<Vec<Project>> {
        match actor.role {
            UserRole::Company => {
                let company = self.company_of(actor).await?;
                Ok(self.store.list_projects_for_company(company.id).await?)
            },
            UserRole::Influencer => {
                let influencer = self
                    .store
                    .find_influencer_by_user(actor.user_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Influencer profile"))?;
                Ok(self.store.list_projects_for_influencer(influencer.id).await?)
            },
            UserRole::Admin => Err(ServiceError::BadRequest(
                "Admins have no projects of their own".to_string(),
            )),
        }
    }

    pub async fn get_project(&self, actor: Actor, project_id: Uuid) -> ServiceResult<Project> {
        let project = self.find(project_id).await?;
        if actor.is_admin() || self.is_party(actor, &project).await? {
            Ok(project)
        } else {
            Err(ServiceError::Forbidden(
                "You do not have access to this project".to_string(),
            ))
        }
    }

    /// Owner-driven progress: MATCHED -> IN_PROGRESS -> COMPLETED
    #[instrument(skip(self), fields(user_id = %actor.user_id))]
    pub async fn update_status(
        &self,
        actor: Actor,
        project_id: Uuid,
        next: ProjectStatus,
    ) -> ServiceResult<Project> {
        let project = self.find(project_id).await?;
        let company = self.company_of(actor).await?;
        if project.company_id != company.id {
            return Err(ServiceError::Forbidden(
                "Only the owning company can update this project".to_string(),
            ));
        }

        if !project.status.can_transition_to(next) {
            return Err(ServiceError::BadRequest(format!(
                "Cannot move project from {} to {}",
                project.status, next
            )));
        }

        let updated = self
            .store
            .transition_project(project.id, project.status, next)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    ServiceError::Conflict("Project status changed concurrently".to_string())
                },
                other => other.into(),
            })?;

        info!("Project {} moved to {}", updated.id, updated.status);
        Ok(updated)
    }

    async fn is_party(&self, actor: Actor, project: &Project) -> ServiceResult<bool> {
        match actor.role {
            UserRole::Company => Ok(self
                .store
                .find_company_by_user(actor.user_id)
                .await?
                .is_some_and(|c| c.id == project.company_id)),
            UserRole::Influencer => Ok(self
                .store
                .find_influencer_by_user(actor.user_id)
                .await?
                .is_some_and(|i| project.matched_influencer_id == Some(i.id))),
            UserRole::Admin => Ok(true),
        }
    }

    async fn find(&self, project_id: Uuid) -> ServiceResult<Project> {
        self.store
            .find_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))
    }

    async fn company_of(&self, actor: Actor) -> ServiceResult<Company> {
        if actor.role != UserRole::Company {
            return Err(ServiceError::Forbidden(
                "Only companies can manage projects".to_string(),
            ));
        }
        self.store
            .find_company_by_user(actor.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company profile"))
    }
}
