//! Wire types for the NowPayments API.
use chrono::{DateTime, Utc};
use pgw_common::serde_helpers;
use serde::{Deserialize, Serialize};

use crate::helpers::optional_timestamp;

#[derive(Debug, Clone, Serialize)]
pub struct NowPaymentsInvoiceRequest {
    pub price_amount: f64,
    pub price_currency: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NowPaymentsInvoice {
    #[serde(deserialize_with = "serde_helpers::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub invoice_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NowPaymentsPaymentList {
    #[serde(default)]
    pub data: Vec<NowPaymentsPayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NowPaymentsPayment {
    #[serde(default)]
    pub payment_status: String,
    #[serde(default, deserialize_with = "serde_helpers::amount")]
    pub actually_paid: f64,
    #[serde(default)]
    pub pay_currency: String,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An instant payment notification (IPN) pushed by NowPayments to the `/webhook` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPaymentsIpn {
    #[serde(deserialize_with = "serde_helpers::string_or_number")]
    pub invoice_id: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default, deserialize_with = "serde_helpers::amount")]
    pub actual_amount: f64,
    #[serde(default)]
    pub actual_currency: String,
}
