//! Core trait for the residual filtering pass.
//!
//! Residual filters evaluate predicates the store could not, against a page
//! that has already been fetched.

use catalog::Channel;

/// A post-fetch predicate over a page of channels.
///
/// ## Design Note
/// - `Send + Sync` so a built pipeline can be shared across tasks
/// - Filters take ownership of the page and return what survives, in order
/// - Filters are total: an unset predicate keeps everything, nothing fails
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a page of channels.
    ///
    /// Implementations must preserve the relative order of the input.
    fn apply(&self, channels: Vec<Channel>) -> Vec<Channel>;
}
