// Invoices for matched projects

use chrono::{DateTime, Duration, Utc};
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app_config::MarketplaceConfig;
use crate::models::{
    Actor, Invoice, InvoiceStatus, InvoiceSummary, NewInvoice, NotificationKind, UserRole,
};
use crate::services::notification::NotificationService;
use crate::store::{SharedStore, StoreError};
use crate::utils::service_error::{ServiceError, ServiceResult};

/// `INV-YYYYMMDD-RRRR`, the suffix a zero-padded random number
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix: u32 = thread_rng().gen_range(0..10_000);
    format!("INV-{}-{:04}", now.format("%Y%m%d"), suffix)
}

/// Tax on an amount in minor units, rounded down. `None` when the
/// product does not fit in an `i64`.
pub fn compute_tax(amount: i64, rate_percent: i64) -> Option<i64> {
    amount.checked_mul(rate_percent).map(|scaled| scaled / 100)
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateInvoiceRequest {
    pub project_id: Uuid,

    #[validate(range(min = 1, message = "Amount must be greater than zero"))]
    pub amount: i64,
}

#[derive(Clone)]
pub struct BillingService {
    store: SharedStore,
    notifications: Arc<NotificationService>,
    rules: MarketplaceConfig,
}

impl BillingService {
    pub fn new(
        store: SharedStore,
        notifications: Arc<NotificationService>,
        rules: MarketplaceConfig,
    ) -> Self {
        Self {
            store,
            notifications,
            rules,
        }
    }

    /// Bills the project's company on behalf of its matched influencer
    #[instrument(skip(self, request), fields(user_id = %actor.user_id))]
    pub async fn create_invoice(
        &self,
        actor: Actor,
        request: CreateInvoiceRequest,
    ) -> ServiceResult<Invoice> {
        request.validate()?;

        let project = self
            .store
            .find_project(request.project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;
        let influencer_id = project.matched_influencer_id.ok_or_else(|| {
            ServiceError::BadRequest("Project has no matched influencer to bill for".to_string())
        })?;

        if !actor.is_admin() {
            let caller = match actor.role {
                UserRole::Influencer => self.store.find_influencer_by_user(actor.user_id).await?,
                _ => None,
            };
            if !caller.is_some_and(|i| i.id == influencer_id) {
                return Err(ServiceError::Forbidden(
                    "Only the matched influencer can invoice this project".to_string(),
                ));
            }
        }

        self.issue_invoice(project.id, project.company_id, influencer_id, request.amount)
            .await
    }

    /// Creates a `PENDING` invoice with computed tax and due date. Number
    /// collisions are retried with a fresh number.
    #[instrument(skip(self))]
    pub async fn issue_invoice(
        &self,
        project_id: Uuid,
        company_id: Uuid,
        influencer_id: Uuid,
        amount: i64,
    ) -> ServiceResult<Invoice> {
        if amount <= 0 {
            return Err(ServiceError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let (tax, total_amount) = compute_tax(amount, self.rules.invoice_tax_rate_percent)
            .and_then(|tax| amount.checked_add(tax).map(|total| (tax, total)))
            .ok_or_else(|| ServiceError::Validation("Amount is too large".to_string()))?;
        let mut attempts = 0;

        let invoice = loop {
            attempts += 1;
            let now = Utc::now();
            let candidate = NewInvoice {
                id: Uuid::new_v4(),
                invoice_number: generate_invoice_number(now),
                project_id,
                company_id,
                influencer_id,
                amount,
                tax,
                total_amount,
                status: InvoiceStatus::Pending,
                due_date: now + Duration::days(self.rules.invoice_due_days),
                created_at: now,
            };
            let number = candidate.invoice_number.clone();

            match self.store.create_invoice(candidate).await {
                Ok(invoice) => break invoice,
                Err(StoreError::Conflict(_)) if attempts < self.rules.invoice_number_max_attempts => {
                    warn!("Invoice number {} already taken, retrying", number);
                },
                Err(StoreError::Conflict(_)) => {
                    return Err(ServiceError::Conflict(
                        "Could not allocate a unique invoice number".to_string(),
                    ))
                },
                Err(e) => return Err(e.into()),
            }
        };

        info!(
            "Issued invoice {} for project {} ({} + {} tax)",
            invoice.invoice_number, project_id, invoice.amount, invoice.tax
        );

        if let Ok(Some(company)) = self.store.find_company(company_id).await {
            self.notifications
                .notify(
                    company.user_id,
                    NotificationKind::InvoiceCreated,
                    "New invoice",
                    &format!(
                        "Invoice {} for {} is due on {}",
                        invoice.invoice_number,
                        invoice.total_amount,
                        invoice.due_date.format("%Y-%m-%d")
                    ),
                    json!({ "invoice_id": invoice.id, "project_id": project_id }),
                )
                .await;
        }

        Ok(invoice)
    }

    /// Owning company or admin only
    #[instrument(skip(self), fields(user_id = %actor.user_id))]
    pub async fn mark_as_paid(&self, actor: Actor, invoice_id: Uuid) -> ServiceResult<Invoice> {
        let invoice = self.find(invoice_id).await?;
        if !actor.is_admin() {
            let owns = match actor.role {
                UserRole::Company => self
                    .store
                    .find_company_by_user(actor.user_id)
                    .await?
                    .is_some_and(|c| c.id == invoice.company_id),
                _ => false,
            };
            if !owns {
                return Err(ServiceError::Forbidden(
                    "Only the billed company can pay this invoice".to_string(),
                ));
            }
        }

        let invoice = self
            .store
            .mark_invoice_paid(invoice.id, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    ServiceError::Conflict("Invoice has already been paid".to_string())
                },
                other => other.into(),
            })?;

        info!("Invoice {} paid", invoice.invoice_number);

        self.notify_influencer(
            &invoice,
            NotificationKind::InvoicePaid,
            "Invoice paid",
            format!("Invoice {} has been paid", invoice.invoice_number),
        )
        .await;

        Ok(invoice)
    }

    #[instrument(skip(self))]
    pub async fn mark_as_overdue(&self, invoice_id: Uuid) -> ServiceResult<Invoice> {
        let invoice = self
            .store
            .mark_invoice_overdue(invoice_id, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::not_found("Invoice"),
                StoreError::Conflict(_) => ServiceError::Conflict(
                    "Only pending invoices can become overdue".to_string(),
                ),
                other => other.into(),
            })?;

        info!("Invoice {} is overdue", invoice.invoice_number);

        self.notify_influencer(
            &invoice,
            NotificationKind::InvoiceOverdue,
            "Invoice overdue",
            format!("Invoice {} is past its due date", invoice.invoice_number),
        )
        .await;

        Ok(invoice)
    }

    /// Influencers see issued invoices, companies received ones
    pub async fn list_invoices(&self, actor: Actor) -> ServiceResult<Vec<Invoice>> {
        match actor.role {
            UserRole::Influencer => {
                let influencer = self
                    .store
                    .find_influencer_by_user(actor.user_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Influencer profile"))?;
                Ok(self.store.list_invoices_for_influencer(influencer.id).await?)
            },
            UserRole::Company => {
                let company = self
                    .store
                    .find_company_by_user(actor.user_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Company profile"))?;
                Ok(self.store.list_invoices_for_company(company.id).await?)
            },
            UserRole::Admin => Err(ServiceError::BadRequest(
                "Admins have no invoices of their own".to_string(),
            )),
        }
    }

    pub async fn get_invoice(&self, actor: Actor, invoice_id: Uuid) -> ServiceResult<Invoice> {
        let invoice = self.find(invoice_id).await?;
        if actor.is_admin() {
            return Ok(invoice);
        }

        let is_party = match actor.role {
            UserRole::Company => self
                .store
                .find_company_by_user(actor.user_id)
                .await?
                .is_some_and(|c| c.id == invoice.company_id),
            UserRole::Influencer => self
                .store
                .find_influencer_by_user(actor.user_id)
                .await?
                .is_some_and(|i| i.id == invoice.influencer_id),
            UserRole::Admin => true,
        };

        if is_party {
            Ok(invoice)
        } else {
            Err(ServiceError::Forbidden(
                "You do not have access to this invoice".to_string(),
            ))
        }
    }

    /// Earnings of the calling influencer, partitioned by status
    pub async fn summary(&self, actor: Actor) -> ServiceResult<InvoiceSummary> {
        if actor.role != UserRole::Influencer {
            return Err(ServiceError::Forbidden(
                "Only influencers have an earnings summary".to_string(),
            ));
        }
        let influencer = self
            .store
            .find_influencer_by_user(actor.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Influencer profile"))?;
        let invoices = self.store.list_invoices_for_influencer(influencer.id).await?;
        Ok(InvoiceSummary::from_invoices(&invoices))
    }

    async fn notify_influencer(
        &self,
        invoice: &Invoice,
        kind: NotificationKind,
        title: &str,
        message: String,
    ) {
        if let Ok(Some(influencer)) = self.store.find_influencer(invoice.influencer_id).await {
            self.notifications
                .notify(
                    influencer.user_id,
                    kind,
                    title,
                    &message,
                    json!({ "invoice_id": invoice.id, "project_id": invoice.project_id }),
                )
                .await;
        }
    }

    async fn find(&self, invoice_id: Uuid) -> ServiceResult<Invoice> {
        self.store
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_is_floored() {
        assert_eq!(compute_tax(10_000, 10), Some(1_000));
        assert_eq!(compute_tax(999, 10), Some(99));
        assert_eq!(compute_tax(5, 10), Some(0));
        assert_eq!(compute_tax(10_000, 0), Some(0));
    }

    #[test]
    fn test_tax_overflow_is_reported() {
        assert_eq!(compute_tax(i64::MAX / 5, 10), None);
        assert_eq!(compute_tax(i64::MAX / 10, 10), Some(i64::MAX / 10 / 10));
    }

    #[test]
    fn test_invoice_number_format() {
        let now = DateTime::parse_from_rfc3339("2026-03-07T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let number = generate_invoice_number(now);

        assert_eq!(number.len(), "INV-20260307-0000".len());
        assert!(number.starts_with("INV-20260307-"));
        assert!(number[13..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_create_invoice_request_rejects_non_positive_amount() {
        let request = CreateInvoiceRequest {
            project_id: Uuid::new_v4(),
            amount: 0,
        };
        assert!(request.validate().is_err());
    }
}
