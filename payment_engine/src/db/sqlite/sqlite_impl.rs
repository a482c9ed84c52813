//! `SqliteDatabase` is a concrete implementation of a payment gateway backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every write runs in its own transaction and is committed before the call returns, so it is visible to every other
//! connection in the pool.
use std::{fmt::Debug, future::Future, path::Path};

use log::*;
use pgw_common::PaymentStatus;
use sqlx::SqlitePool;
use tokio::time::timeout;

use super::{db_url, new_pool, transactions, user_payments, DB_OPERATION_TIMEOUT, MIGRATOR};
use crate::{
    db_types::{NewTransaction, NewUserPayment, Transaction, TransactionQueryFilter, UserPayment},
    traits::{StoreError, TransactionStore, UserPaymentStore},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `PGW_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        ensure_parent_dir(url);
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        MIGRATOR.run(&self.pool).await.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Runs a store operation, giving up with [`StoreError::Timeout`] once [`DB_OPERATION_TIMEOUT`] has elapsed.
async fn with_deadline<T, F>(operation: &str, invoice_id: &str, fut: F) -> Result<T, StoreError>
where F: Future<Output = Result<T, StoreError>> {
    let result = match timeout(DB_OPERATION_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(format!("{operation} did not complete in time"))),
    };
    if let Err(e) = &result {
        match e {
            StoreError::NotFound(_) => debug!("🗃️ {operation} [{invoice_id}]: {e}"),
            _ => error!("🗃️ {operation} [{invoice_id}] failed. {e}"),
        }
    }
    result
}

fn ensure_parent_dir(url: &str) {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return;
    }
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("🗃️ Could not create database directory {}: {e}", parent.display());
        }
    }
}

impl TransactionStore for SqliteDatabase {
    async fn create_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let invoice_id = transaction.invoice_id.clone();
        with_deadline("create_transaction", &invoice_id, async {
            let mut tx = self.pool.begin().await?;
            let inserted = transactions::insert_transaction(transaction, &mut tx).await?;
            tx.commit().await?;
            Ok(inserted)
        })
        .await
    }

    async fn update_status(&self, invoice_id: &str, status: &PaymentStatus) -> Result<Transaction, StoreError> {
        with_deadline("update_status", invoice_id, async {
            let mut tx = self.pool.begin().await?;
            let updated = transactions::update_status(invoice_id, status, &mut tx).await?;
            tx.commit().await?;
            updated.ok_or_else(|| StoreError::NotFound(format!("transaction for invoice {invoice_id}")))
        })
        .await
    }

    async fn update_payment_info(
        &self,
        invoice_id: &str,
        amount_paid: f64,
        currency: &str,
    ) -> Result<Transaction, StoreError> {
        with_deadline("update_payment_info", invoice_id, async {
            let mut tx = self.pool.begin().await?;
            let updated = transactions::update_payment_info(invoice_id, amount_paid, currency, &mut tx).await?;
            tx.commit().await?;
            updated.ok_or_else(|| StoreError::NotFound(format!("transaction for invoice {invoice_id}")))
        })
        .await
    }

    async fn fetch_transaction(&self, invoice_id: &str) -> Result<Transaction, StoreError> {
        with_deadline("fetch_transaction", invoice_id, async {
            let mut conn = self.pool.acquire().await?;
            transactions::fetch_transaction(invoice_id, &mut conn)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("transaction for invoice {invoice_id}")))
        })
        .await
    }

    async fn list_transactions(
        &self,
        filter: TransactionQueryFilter,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Transaction>, i64), StoreError> {
        with_deadline("list_transactions", "*", async {
            let mut conn = self.pool.acquire().await?;
            transactions::search_transactions(&filter, page, per_page, &mut conn).await
        })
        .await
    }
}

impl UserPaymentStore for SqliteDatabase {
    async fn insert_user_payment(&self, payment: NewUserPayment) -> Result<UserPayment, StoreError> {
        let invoice_id = payment.invoice_id.clone();
        with_deadline("insert_user_payment", &invoice_id, async {
            let mut tx = self.pool.begin().await?;
            let stored = user_payments::idempotent_insert(payment, &mut tx).await?;
            tx.commit().await?;
            Ok(stored)
        })
        .await
    }

    async fn fetch_user_payment(&self, user_id: &str, invoice_id: &str) -> Result<Option<UserPayment>, StoreError> {
        with_deadline("fetch_user_payment", invoice_id, async {
            let mut conn = self.pool.acquire().await?;
            user_payments::fetch_user_payment(user_id, invoice_id, &mut conn).await
        })
        .await
    }

    async fn fetch_payments_for_user(&self, user_id: &str) -> Result<Vec<UserPayment>, StoreError> {
        with_deadline("fetch_payments_for_user", "*", async {
            let mut conn = self.pool.acquire().await?;
            user_payments::fetch_payments_for_user(user_id, &mut conn).await
        })
        .await
    }

    async fn update_user_payment_status(
        &self,
        user_id: &str,
        invoice_id: &str,
        status: &PaymentStatus,
    ) -> Result<(), StoreError> {
        with_deadline("update_user_payment_status", invoice_id, async {
            let mut tx = self.pool.begin().await?;
            let updated = user_payments::update_status(user_id, invoice_id, status, &mut tx).await?;
            tx.commit().await?;
            if updated == 0 {
                return Err(StoreError::NotFound(format!("payment {invoice_id} for user {user_id}")));
            }
            Ok(())
        })
        .await
    }

    async fn update_status_for_invoice(&self, invoice_id: &str, status: &PaymentStatus) -> Result<u64, StoreError> {
        with_deadline("update_status_for_invoice", invoice_id, async {
            let mut tx = self.pool.begin().await?;
            let updated = user_payments::update_status_for_invoice(invoice_id, status, &mut tx).await?;
            tx.commit().await?;
            Ok(updated)
        })
        .await
    }
}
