//! # SQLite backend
//!
//! The low-level queries live in [`transactions`] and [`user_payments`] as plain functions that accept a
//! `&mut SqliteConnection`. Callers can obtain a connection from the pool, or open an atomic transaction and pass
//! `&mut *tx` through without any other changes.
//!
//! [`SqliteDatabase`] wraps the pool, bounds every operation with [`DB_OPERATION_TIMEOUT`] and implements the
//! backend traits.
mod sqlite_impl;

pub mod transactions;
pub mod user_payments;

use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
pub use sqlite_impl::SqliteDatabase;

use crate::traits::StoreError;

const SQLITE_DB_URL: &str = "sqlite://data/payment_gateway.db";

/// Upper bound on how long any single store operation may take, including waiting for a pooled connection.
pub const DB_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

pub static MIGRATOR: Migrator = sqlx::migrate!("./src/db/sqlite/migrations");

pub fn db_url() -> String {
    let result = env::var("PGW_DATABASE_URL").unwrap_or_else(|_| {
        info!("PGW_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file if it does not exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(DB_OPERATION_TIMEOUT)
        .connect_with(options)
        .await?;
    Ok(pool)
}
