//! # Payment gateway API
//!
//! The public-facing behaviour of the gateway. Each API object is generic over a storage backend
//! ([`crate::traits::PaymentGatewayDatabase`] or one of its component traits) and, where it talks to a processor, over
//! [`processor_tools::PaymentProcessor`].
//!
//! * [`InvoiceFlowApi`] creates invoices upstream and records them locally.
//! * [`TransactionsApi`] serves the transaction listing.
//! * [`ReconciliationApi`] applies webhook notifications to stored records.
//! * [`StatusPoller`] refreshes non-terminal statuses from the processor on read.
//! * [`UserPaymentsApi`] assigns catalog invoices to users and reports on them.
pub mod errors;
pub mod invoice_catalog;
pub mod invoice_flow_api;
pub mod reconciliation_api;
pub mod status_poller;
pub mod transactions_api;
pub mod user_payments_api;

pub use errors::{InvoiceFlowError, ReconciliationError, UserPaymentsError};
pub use invoice_catalog::{CatalogEntry, CatalogError, InvoiceCatalog};
pub use invoice_flow_api::InvoiceFlowApi;
pub use reconciliation_api::{BtcPayAction, ReconciliationApi, ReconciliationOutcome};
pub use status_poller::StatusPoller;
pub use transactions_api::TransactionsApi;
pub use user_payments_api::{PaymentCheck, UserPaymentsApi};
