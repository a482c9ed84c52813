//! Clients for the third-party payment processors the gateway relays invoices to.
//!
//! Every processor implements [`PaymentProcessor`]. [`ProcessorClient`] wraps the implementation selected in
//! configuration so that the rest of the gateway is agnostic to which processor is in use.
mod btcpay_api;
mod config;
mod error;
mod helpers;
mod nowpayments_api;
mod processor_client;
mod rest;
mod traits;

pub mod btcpay_objects;
pub mod data_objects;
pub mod nowpayments_objects;

pub use btcpay_api::BtcPayApi;
pub use btcpay_objects::BtcPayWebhookEvent;
pub use config::{BtcPayConfig, NowPaymentsConfig, ProcessorKind, DEFAULT_NOWPAYMENTS_CHECKOUT_URL, DEFAULT_NOWPAYMENTS_URL};
pub use data_objects::{InvoiceCreated, InvoiceStatus, NewInvoice};
pub use error::ProcessorError;
pub use nowpayments_api::NowPaymentsApi;
pub use nowpayments_objects::NowPaymentsIpn;
pub use processor_client::ProcessorClient;
pub use rest::PROCESSOR_TIMEOUT;
pub use traits::PaymentProcessor;
