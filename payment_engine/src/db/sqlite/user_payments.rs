use chrono::Utc;
use log::debug;
use pgw_common::PaymentStatus;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUserPayment, UserPayment},
    traits::StoreError,
};

/// Assigns the invoice to the user, unless the assignment already exists. Either way, the stored record is returned.
pub async fn idempotent_insert(
    payment: NewUserPayment,
    conn: &mut SqliteConnection,
) -> Result<UserPayment, StoreError> {
    let result = sqlx::query(
        r#"
            INSERT INTO user_payments (user_id, invoice_id, amount, currency, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, invoice_id) DO NOTHING;
        "#,
    )
    .bind(&payment.user_id)
    .bind(&payment.invoice_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(PaymentStatus::Pending.to_string())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        debug!("📝️ Invoice [{}] assigned to user {}", payment.invoice_id, payment.user_id);
    }
    fetch_user_payment(&payment.user_id, &payment.invoice_id, conn)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("{}/{}", payment.user_id, payment.invoice_id)))
}

pub async fn fetch_user_payment(
    user_id: &str,
    invoice_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserPayment>, StoreError> {
    let payment = sqlx::query_as("SELECT * FROM user_payments WHERE user_id = $1 AND invoice_id = $2")
        .bind(user_id)
        .bind(invoice_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn fetch_payments_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<UserPayment>, StoreError> {
    let payments = sqlx::query_as("SELECT * FROM user_payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(payments)
}

pub async fn update_status(
    user_id: &str,
    invoice_id: &str,
    status: &PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let result = sqlx::query("UPDATE user_payments SET status = $1 WHERE user_id = $2 AND invoice_id = $3")
        .bind(status.to_string())
        .bind(user_id)
        .bind(invoice_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_status_for_invoice(
    invoice_id: &str,
    status: &PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let result = sqlx::query("UPDATE user_payments SET status = $1 WHERE invoice_id = $2")
        .bind(status.to_string())
        .bind(invoice_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
