use std::fmt::Debug;

use crate::{
    db_types::{normalize_paging, Transaction, TransactionPage, TransactionQueryFilter},
    traits::{StoreError, TransactionStore},
};

/// Read access to the local transaction records.
pub struct TransactionsApi<B> {
    db: B,
}

impl<B> Debug for TransactionsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionsApi")
    }
}

impl<B> TransactionsApi<B>
where B: TransactionStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn fetch_transaction(&self, invoice_id: &str) -> Result<Transaction, StoreError> {
        self.db.fetch_transaction(invoice_id).await
    }

    /// Fetches a page of transactions matching the filter, newest first. See [`normalize_paging`] for how out-of-range
    /// page parameters are handled.
    pub async fn list_transactions(
        &self,
        filter: TransactionQueryFilter,
        page: u32,
        per_page: u32,
    ) -> Result<TransactionPage, StoreError> {
        let (page, per_page) = normalize_paging(page, per_page);
        let (transactions, total) = self.db.list_transactions(filter, page, per_page).await?;
        Ok(TransactionPage { transactions, total, page, per_page })
    }
}
