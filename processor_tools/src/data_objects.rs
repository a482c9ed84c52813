use chrono::{DateTime, Utc};
use pgw_common::PaymentStatus;
use serde::{Deserialize, Serialize};

/// A request to issue a new invoice with the payment processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub price_amount: f64,
    pub price_currency: String,
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl NewInvoice {
    pub fn new<S: Into<String>>(price_amount: f64, price_currency: S, order_id: S) -> Self {
        Self {
            price_amount,
            price_currency: price_currency.into(),
            order_id: order_id.into(),
            ..Default::default()
        }
    }

    pub fn with_buyer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.buyer_email = Some(email.into());
        self
    }

    pub fn with_redirect_url<S: Into<String>>(mut self, url: S) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_webhook_url<S: Into<String>>(mut self, url: S) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// The buyer email, if one was supplied and is not blank.
    pub fn buyer_email(&self) -> Option<&str> {
        non_blank(&self.buyer_email)
    }

    pub fn redirect_url(&self) -> Option<&str> {
        non_blank(&self.redirect_url)
    }

    pub fn webhook_url(&self) -> Option<&str> {
        non_blank(&self.webhook_url)
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The processor's answer to a successful invoice creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCreated {
    pub invoice_id: String,
    pub checkout_url: String,
    pub status: PaymentStatus,
    pub expiration_time: Option<DateTime<Utc>>,
}

/// The latest payment state of an invoice, as reported by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceStatus {
    pub invoice_id: String,
    pub status: PaymentStatus,
    /// Zero if the processor has no payment records for the invoice.
    pub amount_paid: f64,
    pub currency: String,
    pub paid_date: Option<DateTime<Utc>>,
}

impl InvoiceStatus {
    /// A status report for an invoice that has no payments recorded against it.
    pub fn unpaid<S: Into<String>>(invoice_id: S, status: PaymentStatus) -> Self {
        Self { invoice_id: invoice_id.into(), status, amount_paid: 0.0, currency: String::new(), paid_date: None }
    }
}
