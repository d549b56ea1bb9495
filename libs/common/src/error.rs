//! Custom error types for the common library
//!
//! This module defines the storage and session error types shared by the
//! Silant services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while turning a session cookie into a principal
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session store could not be reached
    #[error("Session store error: {0}")]
    Store(#[from] redis::RedisError),

    /// The account lookup failed
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Type alias for Result with SessionError
pub type SessionResult<T> = Result<T, SessionError>;
