use std::{env, fmt::Display, str::FromStr};

use log::*;
use pgw_common::Secret;

pub const DEFAULT_NOWPAYMENTS_URL: &str = "https://api.nowpayments.io/v1";
pub const DEFAULT_NOWPAYMENTS_CHECKOUT_URL: &str = "https://nowpayments.io/payment/?iid=";

/// Which payment processor integration the gateway talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessorKind {
    #[default]
    BtcPay,
    NowPayments,
}

impl Display for ProcessorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BtcPay => f.write_str("btcpay"),
            Self::NowPayments => f.write_str("nowpayments"),
        }
    }
}

impl FromStr for ProcessorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "btcpay" | "btcpayserver" => Ok(Self::BtcPay),
            "nowpayments" => Ok(Self::NowPayments),
            other => Err(format!("Unknown payment processor: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BtcPayConfig {
    /// The root url of the BTCPay Server instance, e.g. "https://btcpay.example.com"
    pub base_url: String,
    pub api_key: Secret<String>,
    pub store_id: String,
    /// The secret used to sign webhook deliveries. Configured per webhook in the BTCPay store settings.
    pub webhook_secret: Secret<String>,
}

impl BtcPayConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = env::var("PGW_BTCPAY_URL").unwrap_or_else(|_| {
            warn!("🪛️ PGW_BTCPAY_URL not set, using (probably useless) default");
            "http://localhost:23000".to_string()
        });
        let api_key = Secret::new(env::var("PGW_BTCPAY_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ PGW_BTCPAY_API_KEY not set. Calls to BTCPay Server will be rejected.");
            String::default()
        }));
        let store_id = env::var("PGW_BTCPAY_STORE_ID").unwrap_or_else(|_| {
            warn!("🪛️ PGW_BTCPAY_STORE_ID not set. Calls to BTCPay Server will be rejected.");
            String::default()
        });
        let webhook_secret = Secret::new(env::var("PGW_BTCPAY_WEBHOOK_SECRET").unwrap_or_default());
        Self { base_url: trim_url(base_url), api_key, store_id, webhook_secret }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NowPaymentsConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
    /// The IPN secret used to sign `x-nowpayments-sig` headers.
    pub ipn_secret: Secret<String>,
    /// Prefix of the hosted payment page. The invoice id is appended to it.
    pub checkout_url: String,
}

impl NowPaymentsConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = env::var("PGW_NOWPAYMENTS_URL").unwrap_or_else(|_| {
            debug!("🪛️ PGW_NOWPAYMENTS_URL not set, using {DEFAULT_NOWPAYMENTS_URL}");
            DEFAULT_NOWPAYMENTS_URL.to_string()
        });
        let api_key = Secret::new(env::var("PGW_NOWPAYMENTS_API_KEY").unwrap_or_default());
        let ipn_secret = Secret::new(env::var("PGW_NOWPAYMENTS_IPN_SECRET").unwrap_or_default());
        let checkout_url =
            env::var("PGW_NOWPAYMENTS_CHECKOUT_URL").unwrap_or_else(|_| DEFAULT_NOWPAYMENTS_CHECKOUT_URL.to_string());
        Self { base_url: trim_url(base_url), api_key, ipn_secret, checkout_url }
    }
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
