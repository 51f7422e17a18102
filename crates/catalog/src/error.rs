//! Error types for the catalog crate.
//!
//! Every store adapter reports failures through [`StoreError`]. The query
//! layer wraps these into fetch failures; the count path swallows them.

use thiserror::Error;

/// Errors that can occur while querying, loading, or ingesting channels
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The query uses something the store's constraint language cannot express
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// The store could not be reached or refused the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A field carried a value outside its domain
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// I/O error while reading or writing a dataset file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
