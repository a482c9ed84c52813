use pgw_common::PaymentStatus;

use crate::{
    db_types::{NewTransaction, Transaction, TransactionQueryFilter},
    traits::StoreError,
};

/// Persistence for [`Transaction`] records, keyed by the processor's invoice id.
///
/// Every mutation refreshes `updated_at`.
#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    /// Stores a new transaction. Fails with [`StoreError::DuplicateKey`] if the invoice id is already known.
    async fn create_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError>;

    /// Sets the status of the transaction for `invoice_id`.
    ///
    /// Moving into a paid status stamps `paid_at`, unless it is already set, so reapplying the same status is
    /// harmless. Fails with [`StoreError::NotFound`] if there is no such transaction.
    async fn update_status(&self, invoice_id: &str, status: &PaymentStatus) -> Result<Transaction, StoreError>;

    /// Records the amount and currency actually received for the invoice.
    async fn update_payment_info(
        &self,
        invoice_id: &str,
        amount_paid: f64,
        currency: &str,
    ) -> Result<Transaction, StoreError>;

    async fn fetch_transaction(&self, invoice_id: &str) -> Result<Transaction, StoreError>;

    /// Lists the transactions matching `filter`, newest first. `page` starts at 1.
    ///
    /// Returns the requested page and the total number of matching transactions.
    async fn list_transactions(
        &self,
        filter: TransactionQueryFilter,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Transaction>, i64), StoreError>;
}
