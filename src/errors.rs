//! Error types shared by the calculators, the history store and the settings loader.
//!
//! Undefined performance ratios are not errors: they surface as `None` from the portfolio
//! functions. Malformed external state is not an error either, decoding falls back per field.

use thiserror::Error;

/// Type alias for Result using the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Payment count cannot be zero.")]
    InvalidPaymentCount,

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
