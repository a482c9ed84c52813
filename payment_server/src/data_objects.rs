use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use payment_engine::db_types::{TransactionQueryFilter, UserPayment, DEFAULT_PAGE_SIZE};
use pgw_common::PaymentStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub time: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok".into(), time: Utc::now() }
    }
}

/// The acknowledgement sent back to BTCPay Server for every delivery that passes authentication and parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookReceipt {
    pub status: String,
}

impl WebhookReceipt {
    pub fn received() -> Self {
        Self { status: "received".into() }
    }
}

//--------------------------------------   Transaction listing   -------------------------------------------------------
/// Query parameters for `/api/v1/transactions`. Everything is optional and taken as a string, so that a malformed
/// value falls back to the default instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionListParams {
    pub status: Option<String>,
    /// `YYYY-MM-DD`. Matches transactions created on or after the start of this day.
    pub date_from: Option<String>,
    /// `YYYY-MM-DD`. Matches transactions created on or before the end of this day.
    pub date_to: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl TransactionListParams {
    pub fn filter(&self) -> TransactionQueryFilter {
        let mut filter = TransactionQueryFilter::default();
        if let Some(status) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.with_status(PaymentStatus::from(status));
        }
        if let Some(start_of_day) =
            self.date_from.as_deref().and_then(parse_date).and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            filter = filter.since(Utc.from_utc_datetime(&start_of_day));
        }
        if let Some(end_of_day) =
            self.date_to.as_deref().and_then(parse_date).and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
        {
            filter = filter.until(Utc.from_utc_datetime(&end_of_day));
        }
        filter
    }

    /// The requested page and page size. Missing, unparseable or zero values fall back to page 1 and
    /// [`DEFAULT_PAGE_SIZE`].
    pub fn paging(&self) -> (u32, u32) {
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let per_page = parse_positive(self.per_page.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE);
        (page, per_page)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_positive(s: Option<&str>) -> Option<u32> {
    s.and_then(|s| s.trim().parse::<u32>().ok()).filter(|v| *v > 0)
}

//--------------------------------------   Catalog payment flow   ------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignInvoiceRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub invoice_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentQuery {
    pub user_id: Option<String>,
    pub invoice_id: Option<String>,
}

impl PaymentQuery {
    pub fn user_id(&self) -> Option<&str> {
        non_blank(self.user_id.as_deref())
    }

    pub fn invoice_id(&self) -> Option<&str> {
        non_blank(self.invoice_id.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// The response envelope of the catalog payment flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse<T = ()> {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl PaymentResponse<()> {
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { status: false, message: Some(message.into()), payment_url: None, data: None }
    }

    pub fn with_payment_url<S: Into<String>>(url: S) -> Self {
        Self { status: true, message: None, payment_url: Some(url.into()), data: None }
    }
}

impl<T> PaymentResponse<T> {
    pub fn with_data(data: T) -> Self {
        Self { status: true, message: None, payment_url: None, data: Some(data) }
    }
}

/// A user's payment, as listed by `/api/user-payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPaymentSummary {
    pub invoice_id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserPayment> for UserPaymentSummary {
    fn from(p: UserPayment) -> Self {
        Self {
            invoice_id: p.invoice_id,
            status: p.status,
            amount: p.amount,
            currency: p.currency,
            created_at: p.created_at,
        }
    }
}
