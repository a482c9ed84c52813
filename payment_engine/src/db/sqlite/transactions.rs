use chrono::Utc;
use log::{debug, trace};
use pgw_common::PaymentStatus;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewTransaction, Transaction, TransactionQueryFilter},
    traits::StoreError,
};

/// Inserts a new transaction. `created_at` and `updated_at` are both set to the current time.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, StoreError> {
    let now = Utc::now();
    let invoice_id = transaction.invoice_id.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                invoice_id,
                order_id,
                status,
                price_amount,
                price_currency,
                buyer_email,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *;
        "#,
    )
    .bind(transaction.invoice_id)
    .bind(transaction.order_id)
    .bind(transaction.status.to_string())
    .bind(transaction.price_amount)
    .bind(transaction.price_currency)
    .bind(transaction.buyer_email)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(tx) => {
            debug!("📝️ Transaction for invoice [{invoice_id}] inserted");
            Ok(tx)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::DuplicateKey(invoice_id)),
        Err(e) => Err(e.into()),
    }
}

/// Sets a new status on the transaction. If the new status is a paid status, `paid_at` is set, unless it already
/// has a value.
pub async fn update_status(
    invoice_id: &str,
    status: &PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, StoreError> {
    let now = Utc::now();
    let tx = sqlx::query_as(
        r#"
            UPDATE transactions SET
                status = $1,
                updated_at = $2,
                paid_at = CASE WHEN $3 THEN COALESCE(paid_at, $2) ELSE paid_at END
            WHERE invoice_id = $4
            RETURNING *;
        "#,
    )
    .bind(status.to_string())
    .bind(now)
    .bind(status.is_paid())
    .bind(invoice_id)
    .fetch_optional(conn)
    .await?;
    trace!("📝️ Status update for invoice [{invoice_id}] to {status}. Found: {}", tx.is_some());
    Ok(tx)
}

pub async fn update_payment_info(
    invoice_id: &str,
    amount_paid: f64,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, StoreError> {
    let tx = sqlx::query_as(
        r#"
            UPDATE transactions SET amount_paid = $1, payment_currency = $2, updated_at = $3
            WHERE invoice_id = $4
            RETURNING *;
        "#,
    )
    .bind(amount_paid)
    .bind(currency)
    .bind(Utc::now())
    .bind(invoice_id)
    .fetch_optional(conn)
    .await?;
    Ok(tx)
}

pub async fn fetch_transaction(invoice_id: &str, conn: &mut SqliteConnection) -> Result<Option<Transaction>, StoreError> {
    let tx = sqlx::query_as("SELECT * FROM transactions WHERE invoice_id = $1")
        .bind(invoice_id)
        .fetch_optional(conn)
        .await?;
    Ok(tx)
}

/// Fetches one page of transactions matching the filter, newest first, and the total number of matches.
///
/// Transactions created in the same instant are ordered by descending `id`, so paging is stable.
pub async fn search_transactions(
    filter: &TransactionQueryFilter,
    page: u32,
    per_page: u32,
    conn: &mut SqliteConnection,
) -> Result<(Vec<Transaction>, i64), StoreError> {
    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM transactions ");
    push_where_clause(filter, &mut count_query);
    let total = count_query.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

    let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
    let mut query = QueryBuilder::new("SELECT * FROM transactions ");
    push_where_clause(filter, &mut query);
    query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    query.push_bind(i64::from(per_page));
    query.push(" OFFSET ");
    query.push_bind(offset);
    trace!("📝️ Executing query: {}", query.sql());
    let transactions = query.build_query_as::<Transaction>().fetch_all(conn).await?;
    trace!("📝️ Fetched {} of {total} transactions", transactions.len());
    Ok((transactions, total))
}

fn push_where_clause(filter: &TransactionQueryFilter, builder: &mut QueryBuilder<'_, Sqlite>) {
    if filter.is_empty() {
        return;
    }
    builder.push("WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(status) = &filter.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(since) = filter.date_from {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = filter.date_to {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
}
