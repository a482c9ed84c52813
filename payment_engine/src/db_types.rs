use chrono::{DateTime, Utc};
use pgw_common::PaymentStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//--------------------------------------     Transaction       ---------------------------------------------------------
/// The local record of an invoice issued by the payment processor.
///
/// `invoice_id` is the processor-assigned key and identifies at most one transaction.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub invoice_id: String,
    pub order_id: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub price_amount: f64,
    pub price_currency: String,
    /// The amount actually received. Only set once the processor reports a payment.
    pub amount_paid: Option<f64>,
    pub payment_currency: Option<String>,
    pub buyer_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stamped the first time the transaction moves into a paid status, and never changed after that.
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub invoice_id: String,
    pub order_id: String,
    pub status: PaymentStatus,
    pub price_amount: f64,
    pub price_currency: String,
    pub buyer_email: Option<String>,
}

impl NewTransaction {
    pub fn new<S: Into<String>>(invoice_id: S, order_id: S, price_amount: f64, price_currency: S) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            order_id: order_id.into(),
            status: PaymentStatus::Created,
            price_amount,
            price_currency: price_currency.into(),
            buyer_email: None,
        }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_buyer_email(mut self, email: Option<String>) -> Self {
        self.buyer_email = email;
        self
    }
}

//--------------------------------------  TransactionQueryFilter  -----------------------------------------------------
/// Criteria for listing transactions. Absent fields do not filter anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQueryFilter {
    pub status: Option<PaymentStatus>,
    /// Inclusive lower bound on `created_at`
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub date_to: Option<DateTime<Utc>>,
}

impl TransactionQueryFilter {
    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, date_from: DateTime<Utc>) -> Self {
        self.date_from = Some(date_from);
        self
    }

    pub fn until(mut self, date_to: DateTime<Utc>) -> Self {
        self.date_to = Some(date_to);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.date_from.is_none() && self.date_to.is_none()
    }
}

//--------------------------------------     Pagination        ---------------------------------------------------------
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page of a transaction listing. `total` counts every matching transaction, not just those on this page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Page numbers start at 1. Anything lower is treated as the first page, and a zero page size means the default.
pub fn normalize_paging(page: u32, per_page: u32) -> (u32, u32) {
    let page = page.max(1);
    let per_page = if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page };
    (page, per_page)
}

//--------------------------------------     UserPayment       ---------------------------------------------------------
/// A catalog invoice assigned to a user.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserPayment {
    pub id: i64,
    pub user_id: String,
    pub invoice_id: String,
    pub amount: f64,
    pub currency: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserPayment {
    pub user_id: String,
    pub invoice_id: String,
    pub amount: f64,
    pub currency: String,
}
