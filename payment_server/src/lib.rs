//! # Payment gateway server
//! This module hosts the HTTP server for the payment gateway. It is responsible for:
//! Accepting invoice requests from merchants and relaying them to the configured payment processor.
//! Receiving signed webhook notifications from the processor and reconciling them with the local transaction records.
//! Serving the transaction listing and the catalog payment flow.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/metrics`: Request and webhook counters in the Prometheus text format.
//! * `/api/v1/invoices`: Create invoices, and `/api/v1/invoices/{id}` to query their status.
//! * `/api/v1/webhooks/btcpay`: The webhook route for BTCPay Server notifications.
//! * `/webhook`: The IPN route for NowPayments notifications.
//! * `/api/v1/transactions`: Paged listing of the local transaction records.
//! * `/api/assign-invoice`, `/api/check-payment`, `/api/user-payments`: The catalog payment flow.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
