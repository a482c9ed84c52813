//! # Storage backends
//!
//! This module defines the interface contracts that payment gateway database *backends* must satisfy.
//!
//! * [`TransactionStore`] persists the local record of every invoice issued through the gateway, keyed by the
//!   processor's invoice id.
//! * [`UserPaymentStore`] persists the assignment of catalog invoices to users.
//! * [`PaymentGatewayDatabase`] is the umbrella trait for backends that do both. The API objects and the server are
//!   generic over it, so a backend is chosen once, at startup.
mod errors;
mod payment_gateway_database;
mod transaction_store;
mod user_payment_store;

pub use errors::StoreError;
pub use payment_gateway_database::PaymentGatewayDatabase;
pub use transaction_store::TransactionStore;
pub use user_payment_store::UserPaymentStore;
