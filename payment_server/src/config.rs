use std::env;

use log::*;
use payment_engine::{db_url, InvoiceCatalog};
use pgw_common::{parse_env_flag, Secret};
use processor_tools::{BtcPayConfig, NowPaymentsConfig, ProcessorKind};

const DEFAULT_PGW_HOST: &str = "127.0.0.1";
const DEFAULT_PGW_PORT: u16 = 8360;
const DEFAULT_TRANSACTION_RETENTION_DAYS: u32 = 90;

pub const BTCPAY_SIGNATURE_HEADER: &str = "BTCPay-Sig";
pub const NOWPAYMENTS_SIGNATURE_HEADER: &str = "x-nowpayments-sig";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The payment processor that invoices are issued with.
    pub processor: ProcessorKind,
    pub btcpay: BtcPayConfig,
    pub nowpayments: NowPaymentsConfig,
    /// If true, webhooks for a processor that has no signing secret configured are accepted WITHOUT a signature
    /// check. **DANGER**
    pub allow_unsigned_webhooks: bool,
    /// The invoices that users can be assigned in the catalog payment flow.
    pub invoice_catalog: InvoiceCatalog,
    /// How long transaction records are meant to be kept. Nothing prunes them yet.
    pub transaction_retention_days: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PGW_HOST.to_string(),
            port: DEFAULT_PGW_PORT,
            database_url: String::default(),
            processor: ProcessorKind::default(),
            btcpay: BtcPayConfig::default(),
            nowpayments: NowPaymentsConfig::default(),
            allow_unsigned_webhooks: false,
            invoice_catalog: InvoiceCatalog::default(),
            transaction_retention_days: DEFAULT_TRANSACTION_RETENTION_DAYS,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PGW_HOST").ok().unwrap_or_else(|| DEFAULT_PGW_HOST.into());
        let port = env::var("PGW_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PGW_PORT. {e} Using the default, {DEFAULT_PGW_PORT}, instead."
                    );
                    DEFAULT_PGW_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PGW_PORT);
        let database_url = db_url();
        let processor = env::var("PGW_PROCESSOR")
            .map(|s| {
                s.parse::<ProcessorKind>().unwrap_or_else(|e| {
                    error!("🪛️ {e}. Using the default, {}, instead.", ProcessorKind::default());
                    ProcessorKind::default()
                })
            })
            .unwrap_or_default();
        info!("🪛️ Invoices will be issued with {processor}");
        let btcpay = BtcPayConfig::new_from_env_or_default();
        let nowpayments = NowPaymentsConfig::new_from_env_or_default();
        let allow_unsigned_webhooks = parse_env_flag("PGW_ALLOW_UNSIGNED_WEBHOOKS", false);
        let invoice_catalog = load_invoice_catalog();
        let transaction_retention_days = env::var("PGW_TRANSACTION_RETENTION_DAYS")
            .map(|s| {
                s.parse::<u32>().unwrap_or_else(|e| {
                    warn!(
                        "🪛️ {s} is not a valid value for PGW_TRANSACTION_RETENTION_DAYS. {e} Using the default, \
                         {DEFAULT_TRANSACTION_RETENTION_DAYS}, instead."
                    );
                    DEFAULT_TRANSACTION_RETENTION_DAYS
                })
            })
            .unwrap_or(DEFAULT_TRANSACTION_RETENTION_DAYS);
        Self {
            host,
            port,
            database_url,
            processor,
            btcpay,
            nowpayments,
            allow_unsigned_webhooks,
            invoice_catalog,
            transaction_retention_days,
        }
    }

    /// The secret that BTCPay Server webhook deliveries are signed with.
    pub fn btcpay_webhook_secret(&self) -> Secret<String> {
        self.btcpay.webhook_secret.clone()
    }

    /// The secret that NowPayments IPN deliveries are signed with.
    pub fn nowpayments_ipn_secret(&self) -> Secret<String> {
        self.nowpayments.ipn_secret.clone()
    }

    /// Lists the webhook providers that have no signing secret configured.
    pub fn unsigned_webhook_providers(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.btcpay.webhook_secret.is_empty() {
            result.push("BTCPay Server");
        }
        if self.nowpayments.ipn_secret.is_empty() {
            result.push("NowPayments");
        }
        result
    }
}

/// Builds the invoice catalog from `PGW_INVOICE_CATALOG_FILE` and `PGW_INVOICE_CATALOG`. Entries from the inline
/// list override those from the file. Invalid sources are logged and skipped.
fn load_invoice_catalog() -> InvoiceCatalog {
    let mut catalog = InvoiceCatalog::default();
    if let Ok(path) = env::var("PGW_INVOICE_CATALOG_FILE") {
        match InvoiceCatalog::from_file(&path) {
            Ok(c) => catalog.merge(c),
            Err(e) => error!("🪛️ Could not load the invoice catalog from {path}. {e}"),
        }
    }
    if let Ok(spec) = env::var("PGW_INVOICE_CATALOG") {
        match InvoiceCatalog::from_spec(&spec) {
            Ok(c) => catalog.merge(c),
            Err(e) => error!("🪛️ PGW_INVOICE_CATALOG is invalid. {e}"),
        }
    }
    if catalog.is_empty() {
        warn!("🪛️ The invoice catalog is empty. Users cannot be assigned any invoices.");
    } else {
        info!("🪛️ Loaded {} invoices into the catalog", catalog.len());
    }
    catalog
}
