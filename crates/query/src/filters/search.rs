//! Free-text search filter.
//!
//! The store has no text search, so this always runs after the fetch.

use crate::traits::Filter;
use catalog::Channel;

/// Keeps channels whose title OR any category tag contains the search text.
///
/// ## Algorithm
/// 1. Lower-case the search text once, at construction
/// 2. For each channel, lower-case the title and check for a substring match
/// 3. Otherwise check every category tag the same way
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    /// Create a new SearchFilter.
    ///
    /// # Arguments
    /// * `search` - Raw search text as typed; matching is case-insensitive
    pub fn new(search: &str) -> Self {
        Self {
            needle: search.to_lowercase(),
        }
    }

    fn matches(&self, channel: &Channel) -> bool {
        channel.title.to_lowercase().contains(&self.needle)
            || channel
                .categories
                .iter()
                .any(|tag| tag.to_lowercase().contains(&self.needle))
    }
}

impl Filter for SearchFilter {
    fn name(&self) -> &str {
        "SearchFilter"
    }

    fn apply(&self, channels: Vec<Channel>) -> Vec<Channel> {
        if self.needle.is_empty() {
            return channels;
        }
        channels
            .into_iter()
            .filter(|channel| self.matches(channel))
            .collect()
    }
}
