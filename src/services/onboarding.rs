// Per-user onboarding checklist

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    onboarding_steps, NewOnboardingProgress, OnboardingProgress, OnboardingStep, StepInfo,
    UserRole, TOTAL_ONBOARDING_STEPS,
};
use crate::store::SharedStore;
use crate::utils::service_error::ServiceResult;

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingView {
    pub user_id: Uuid,
    pub role: UserRole,
    pub completed_steps: Vec<OnboardingStep>,
    pub total_steps: usize,
    pub percentage: u32,
    pub skipped: bool,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub next_step: Option<OnboardingStep>,
}

impl From<OnboardingProgress> for OnboardingView {
    fn from(progress: OnboardingProgress) -> Self {
        let completed_steps = progress.steps();
        let next_step = if progress.is_complete() {
            None
        } else {
            OnboardingStep::ALL
                .iter()
                .copied()
                .find(|step| !completed_steps.contains(step))
        };

        Self {
            user_id: progress.user_id,
            role: progress.role,
            total_steps: TOTAL_ONBOARDING_STEPS,
            percentage: progress.percentage(),
            skipped: progress.skipped,
            is_complete: progress.is_complete(),
            completed_at: progress.completed_at,
            completed_steps,
            next_step,
        }
    }
}

#[derive(Clone)]
pub struct OnboardingService {
    store: SharedStore,
}

impl OnboardingService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Returns the existing progress, creating an empty one on first use
    #[instrument(skip(self))]
    pub async fn initialize(&self, user_id: Uuid, role: UserRole) -> ServiceResult<OnboardingProgress> {
        if let Some(progress) = self.store.find_onboarding(user_id).await? {
            return Ok(progress);
        }

        let progress = self
            .store
            .create_onboarding(NewOnboardingProgress::new(user_id, role))
            .await?;
        info!("Initialized onboarding for user {}", user_id);
        Ok(progress)
    }

    pub async fn progress(&self, user_id: Uuid, role: UserRole) -> ServiceResult<OnboardingView> {
        Ok(self.initialize(user_id, role).await?.into())
    }

    /// Idempotent: completing a step twice leaves the set unchanged
    #[instrument(skip(self))]
    pub async fn complete_step(
        &self,
        user_id: Uuid,
        role: UserRole,
        step: OnboardingStep,
    ) -> ServiceResult<OnboardingView> {
        self.initialize(user_id, role).await?;

        let progress = self
            .store
            .complete_onboarding_step(user_id, step, Utc::now())
            .await?;

        if progress.is_complete() {
            info!("User {} finished onboarding", user_id);
        }
        Ok(progress.into())
    }

    #[instrument(skip(self))]
    pub async fn skip(&self, user_id: Uuid, role: UserRole) -> ServiceResult<OnboardingView> {
        self.initialize(user_id, role).await?;

        let progress = self.store.skip_onboarding(user_id, Utc::now()).await?;
        info!("User {} skipped onboarding", user_id);
        Ok(progress.into())
    }

    pub fn steps(&self, role: UserRole) -> &'static [StepInfo] {
        onboarding_steps(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProfile, NewUser};
    use crate::store::{MemoryStore, UserStore};
    use std::sync::Arc;

    /// A service over a store holding one user with `role`
    async fn service_with_user(role: UserRole) -> (OnboardingService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_account(
                NewUser::new("onboarding@example.com", "hash".to_string(), role),
                NewProfile::None,
            )
            .await
            .unwrap();
        (OnboardingService::new(store), user.id)
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (service, user_id) = service_with_user(UserRole::Influencer).await;

        let first = service.initialize(user_id, UserRole::Influencer).await.unwrap();
        let second = service.initialize(user_id, UserRole::Influencer).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_completing_every_step_finishes_onboarding() {
        let (service, user_id) = service_with_user(UserRole::Company).await;

        let mut last_len = 0;
        for step in OnboardingStep::ALL {
            let view = service
                .complete_step(user_id, UserRole::Company, step)
                .await
                .unwrap();
            assert!(view.completed_steps.len() > last_len);
            last_len = view.completed_steps.len();

            let repeat = service
                .complete_step(user_id, UserRole::Company, step)
                .await
                .unwrap();
            assert_eq!(repeat.completed_steps.len(), last_len);
        }

        let view = service.progress(user_id, UserRole::Company).await.unwrap();
        assert!(view.is_complete);
        assert_eq!(view.percentage, 100);
        assert_eq!(view.next_step, None);
    }

    #[tokio::test]
    async fn test_skip_completes_with_partial_progress() {
        let (service, user_id) = service_with_user(UserRole::Influencer).await;

        service
            .complete_step(user_id, UserRole::Influencer, OnboardingStep::ProfileSetup)
            .await
            .unwrap();
        let view = service.skip(user_id, UserRole::Influencer).await.unwrap();

        assert!(view.skipped);
        assert!(view.is_complete);
        assert_eq!(view.completed_steps, vec![OnboardingStep::ProfileSetup]);
        assert_eq!(view.percentage, 14);
    }
}
