//! Residual filter implementations.
//!
//! Each one covers a predicate the store cannot evaluate together with the
//! rest of the query.

pub mod category;
pub mod search;
pub mod subscriber_range;

// Re-export for convenience
pub use category::CategoryFilter;
pub use search::SearchFilter;
pub use subscriber_range::SubscriberRangeFilter;
