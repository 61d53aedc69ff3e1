//! Access core error types

use thiserror::Error;

/// Access-specific errors
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AccessError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AccessError::NotFound(err.to_string()),
            _ => AccessError::Database(err.to_string()),
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
