//! Error types for the query crate.

use catalog::StoreError;
use thiserror::Error;

/// Errors surfaced by page fetches.
///
/// Count queries never produce one of these; they degrade to zero instead.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The page query failed in the store (network or query construction)
    #[error("Failed to fetch page: {0}")]
    StoreFetch(#[from] StoreError),

    /// The store returned more records than the over-fetched limit allows
    #[error("Store returned {returned} records for a limit of {limit}")]
    LimitExceeded { returned: usize, limit: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, QueryError>;
