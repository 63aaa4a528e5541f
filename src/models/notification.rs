use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::notifications;

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
pub enum NotificationKind {
    EmailVerified,
    VerificationApproved,
    VerificationRejected,
    DocumentApproved,
    DocumentRejected,
    ScoutReceived,
    ScoutAccepted,
    ScoutRejected,
    InvoiceCreated,
    InvoicePaid,
    InvoiceOverdue,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::EmailVerified => "EMAIL_VERIFIED",
            NotificationKind::VerificationApproved => "VERIFICATION_APPROVED",
            NotificationKind::VerificationRejected => "VERIFICATION_REJECTED",
            NotificationKind::DocumentApproved => "DOCUMENT_APPROVED",
            NotificationKind::DocumentRejected => "DOCUMENT_REJECTED",
            NotificationKind::ScoutReceived => "SCOUT_RECEIVED",
            NotificationKind::ScoutAccepted => "SCOUT_ACCEPTED",
            NotificationKind::ScoutRejected => "SCOUT_REJECTED",
            NotificationKind::InvoiceCreated => "INVOICE_CREATED",
            NotificationKind::InvoicePaid => "INVOICE_PAID",
            NotificationKind::InvoiceOverdue => "INVOICE_OVERDUE",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL_VERIFIED" => Ok(NotificationKind::EmailVerified),
            "VERIFICATION_APPROVED" => Ok(NotificationKind::VerificationApproved),
            "VERIFICATION_REJECTED" => Ok(NotificationKind::VerificationRejected),
            "DOCUMENT_APPROVED" => Ok(NotificationKind::DocumentApproved),
            "DOCUMENT_REJECTED" => Ok(NotificationKind::DocumentRejected),
            "SCOUT_RECEIVED" => Ok(NotificationKind::ScoutReceived),
            "SCOUT_ACCEPTED" => Ok(NotificationKind::ScoutAccepted),
            "SCOUT_REJECTED" => Ok(NotificationKind::ScoutRejected),
            "INVOICE_CREATED" => Ok(NotificationKind::InvoiceCreated),
            "INVOICE_PAID" => Ok(NotificationKind::InvoicePaid),
            "INVOICE_OVERDUE" => Ok(NotificationKind::InvoiceOverdue),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

text_enum_sql!(NotificationKind);

#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: JsonValue,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: JsonValue,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        data: JsonValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            notification_type: kind,
            title: title.into(),
            message: message.into(),
            data,
        }
    }
}
