//! Wire types for the BTCPay Server Greenfield API.
use chrono::{DateTime, Utc};
use pgw_common::serde_helpers;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::optional_timestamp;

#[derive(Debug, Clone, Serialize)]
pub struct BtcPayInvoiceRequest {
    pub amount: f64,
    pub currency: String,
    pub metadata: BtcPayInvoiceMetadata,
    pub checkout: BtcPayCheckoutOptions,
    pub receipt: BtcPayReceiptOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<BtcPayBuyer>,
    #[serde(rename = "notificationURL", skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BtcPayInvoiceMetadata {
    pub order_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BtcPayCheckoutOptions {
    #[serde(rename = "redirectURL", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BtcPayReceiptOptions {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BtcPayBuyer {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BtcPayInvoice {
    pub id: String,
    #[serde(default)]
    pub checkout_link: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::amount")]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BtcPayInvoiceDetails {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payments: Vec<BtcPayPayment>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub paid_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BtcPayPayment {
    #[serde(default, deserialize_with = "serde_helpers::amount")]
    pub value: f64,
    #[serde(default)]
    pub currency: String,
}

/// A webhook delivery from BTCPay Server. The event `type` (e.g. `InvoiceSettled`) drives reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BtcPayWebhookEvent {
    #[serde(default)]
    pub delivery_id: String,
    #[serde(default)]
    pub webhook_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_delivery_id: Option<String>,
    #[serde(default)]
    pub is_redelivery: bool,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}
