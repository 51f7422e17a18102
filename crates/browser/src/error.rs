//! Errors surfaced by the page controller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    /// The page query failed. The previously published page is kept.
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] query::QueryError),
}

pub type Result<T> = std::result::Result<T, BrowseError>;
