//! Operational counters for the payment gateway, exported in the Prometheus text format on `/metrics`.
//!
//! A single [`GatewayMetrics`] instance is shared by every worker. The counters are plain atomics, so recording a
//! metric never blocks a request.
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use actix_web::{web, HttpRequest};

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug)]
pub struct GatewayMetrics {
    start_time: Instant,
    pub http_requests: AtomicU64,
    pub http_server_errors: AtomicU64,
    pub handler_panics: AtomicU64,
    pub invoices_created: AtomicU64,
    pub invoice_failures: AtomicU64,
    pub btcpay_webhooks: AtomicU64,
    pub nowpayments_webhooks: AtomicU64,
    pub webhook_signature_failures: AtomicU64,
    pub payments_assigned: AtomicU64,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            http_requests: AtomicU64::new(0),
            http_server_errors: AtomicU64::new(0),
            handler_panics: AtomicU64::new(0),
            invoices_created: AtomicU64::new(0),
            invoice_failures: AtomicU64::new(0),
            btcpay_webhooks: AtomicU64::new(0),
            nowpayments_webhooks: AtomicU64::new(0),
            webhook_signature_failures: AtomicU64::new(0),
            payments_assigned: AtomicU64::new(0),
        }
    }
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn counters(&self) -> [(&'static str, &'static str, &AtomicU64); 9] {
        [
            ("pgw_http_requests_total", "HTTP requests received", &self.http_requests),
            ("pgw_http_server_errors_total", "HTTP responses with a 5xx status", &self.http_server_errors),
            ("pgw_handler_panics_total", "Request handlers that panicked", &self.handler_panics),
            ("pgw_invoices_created_total", "Invoices issued by the payment processor", &self.invoices_created),
            ("pgw_invoice_failures_total", "Invoice requests that failed", &self.invoice_failures),
            ("pgw_btcpay_webhooks_total", "BTCPay Server webhook deliveries accepted", &self.btcpay_webhooks),
            ("pgw_nowpayments_webhooks_total", "NowPayments IPN deliveries accepted", &self.nowpayments_webhooks),
            (
                "pgw_webhook_signature_failures_total",
                "Webhook deliveries rejected for a missing or invalid signature",
                &self.webhook_signature_failures,
            ),
            ("pgw_payments_assigned_total", "Catalog invoices assigned to users", &self.payments_assigned),
        ]
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();
        output.push_str("# HELP pgw_uptime_seconds Time since service start\n");
        output.push_str("# TYPE pgw_uptime_seconds gauge\n");
        output.push_str(&format!("pgw_uptime_seconds {}\n", self.uptime_seconds()));
        for (name, help, counter) in self.counters() {
            output.push_str(&format!("# HELP {name} {help}\n"));
            output.push_str(&format!("# TYPE {name} counter\n"));
            output.push_str(&format!("{name} {}\n", counter.load(Ordering::Relaxed)));
        }
        output
    }
}

/// Records a metric against the instance registered with the app, if there is one.
pub fn record<F>(req: &HttpRequest, f: F)
where F: FnOnce(&GatewayMetrics) {
    if let Some(metrics) = req.app_data::<web::Data<GatewayMetrics>>() {
        f(metrics.get_ref());
    }
}
