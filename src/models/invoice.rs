use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::invoices;

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
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(InvoiceStatus::Pending),
            "PAID" => Ok(InvoiceStatus::Paid),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

text_enum_sql!(InvoiceStatus);

/// Amounts are integer minor units of the marketplace currency
#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub project_id: Uuid,
    pub company_id: Uuid,
    pub influencer_id: Uuid,
    pub amount: i64,
    pub tax: i64,
    pub total_amount: i64,
    pub status: InvoiceStatus,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub project_id: Uuid,
    pub company_id: Uuid,
    pub influencer_id: Uuid,
    pub amount: i64,
    pub tax: i64,
    pub total_amount: i64,
    pub status: InvoiceStatus,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Influencer earnings, summed over `total_amount`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceSummary {
    pub total_earnings: i64,
    pub pending: i64,
    pub paid: i64,
    pub overdue: i64,
    pub invoice_count: usize,
}

impl InvoiceSummary {
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        invoices
            .into_iter()
            .fold(InvoiceSummary::default(), |mut summary, invoice| {
                let amount = invoice.total_amount;
                summary.total_earnings = summary.total_earnings.saturating_add(amount);
                summary.invoice_count += 1;
                let bucket = match invoice.status {
                    InvoiceStatus::Pending => &mut summary.pending,
                    InvoiceStatus::Paid => &mut summary.paid,
                    InvoiceStatus::Overdue => &mut summary.overdue,
                };
                *bucket = bucket.saturating_add(amount);
                summary
            })
    }
}
