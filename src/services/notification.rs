// In-app notifications. Writes triggered by other workflows are
// fire-and-forget: a failure is logged and never fails the caller.

use serde_json::Value as JsonValue;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::models::{NewNotification, Notification, NotificationKind};
use crate::store::SharedStore;
use crate::utils::service_error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct NotificationService {
    store: SharedStore,
}

impl NotificationService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, title, message, data))]
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
        data: JsonValue,
    ) {
        let notification = NewNotification::new(user_id, kind, title, message, data);
        if let Err(e) = self.store.create_notification(notification).await {
            warn!("Failed to write {} notification for user {}: {}", kind, user_id, e);
        }
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool) -> ServiceResult<Vec<Notification>> {
        Ok(self.store.list_notifications(user_id, unread_only).await?)
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> ServiceResult<Notification> {
        self.store
            .mark_notification_read(notification_id, user_id)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::NotFound(_) => ServiceError::not_found("Notification"),
                other => other,
            })
    }
}
