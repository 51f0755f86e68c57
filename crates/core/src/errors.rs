//! Core error types for the dashboard backend.
//!
//! Storage-specific errors (Diesel, SQLite, r2d2) are converted to
//! [`DatabaseError`] by the storage layer so this crate stays database-agnostic.

use thiserror::Error;

pub use cryptodash_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Indicator calculation failed: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Signal generation failed: {0}")]
    Signal(#[from] SignalError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Invalid period for {name}: {detail}")]
    InvalidPeriod { name: &'static str, detail: String },

    #[error("Insufficient data: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },
}

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Advisor failed: {0}")]
    Advisor(String),

    #[error("Advisor is not configured")]
    AdvisorUnavailable,
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] chrono::ParseError),
}
