use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("The requested record does not exist: {0}")]
    NotFound(String),
    #[error("A record with this key already exists: {0}")]
    DuplicateKey(String),
    #[error("The database operation timed out: {0}")]
    Timeout(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound(e.to_string()),
            sqlx::Error::PoolTimedOut => Self::Timeout(e.to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Self::DuplicateKey(db.message().to_string()),
            _ => Self::DatabaseError(e.to_string()),
        }
    }
}
