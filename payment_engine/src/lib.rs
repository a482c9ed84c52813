//! Payment Engine
//!
//! The payment engine is the provider-agnostic core of the payment gateway. It relays invoice requests to a payment
//! processor, keeps a local record of every invoice, and reconciles those records with the notifications the processor
//! pushes back.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`mod@traits`] and the backends in `db`). Currently, SQLite is the only supported backend. You should
//!    never need to access the database directly. Instead, use the public API provided by the payment engine. The
//!    exception is the data types used in the database. These are defined in the `db_types` module and are public.
//! 2. The payment engine public API ([`mod@gateway_api`]). Specific backends need to implement the traits in
//!    [`mod@traits`] in order to act as a backend for the payment server.
mod db;

pub mod db_types;
pub mod gateway_api;
pub mod helpers;
pub mod traits;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, DB_OPERATION_TIMEOUT};
pub use gateway_api::{
    InvoiceCatalog,
    InvoiceFlowApi,
    InvoiceFlowError,
    ReconciliationApi,
    ReconciliationError,
    StatusPoller,
    TransactionsApi,
    UserPaymentsApi,
    UserPaymentsError,
};
pub use traits::{PaymentGatewayDatabase, StoreError, TransactionStore, UserPaymentStore};
