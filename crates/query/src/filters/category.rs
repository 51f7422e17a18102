//! Category tag filter.
//!
//! Array membership cannot be combined with the other store constraints
//! reliably, so tag filtering happens on the fetched page.

use crate::traits::Filter;
use catalog::Channel;
use std::collections::HashSet;

/// Keeps channels that carry at least one of the requested tags (OR).
pub struct CategoryFilter {
    tags: HashSet<String>,
}

impl CategoryFilter {
    /// Create a new CategoryFilter.
    ///
    /// # Arguments
    /// * `tags` - Requested tags; matching is exact
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for CategoryFilter {
    fn name(&self) -> &str {
        "CategoryFilter"
    }

    fn apply(&self, channels: Vec<Channel>) -> Vec<Channel> {
        if self.tags.is_empty() {
            return channels;
        }
        channels
            .into_iter()
            .filter(|channel| channel.categories.iter().any(|tag| self.tags.contains(tag)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: u64, categories: &[&str]) -> Channel {
        Channel {
            id: id.into(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_filter_is_or_across_tags() {
        let channels = vec![
            channel(1, &["a", "b"]),
            channel(2, &["c"]),
            channel(3, &["d"]),
            channel(4, &[]),
        ];

        let filter = CategoryFilter::new(["b", "c"]);
        let filtered = filter.apply(channels);

        let ids: Vec<_> = filtered.iter().map(|c| c.id.as_number().unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_category_match_is_exact() {
        let channels = vec![channel(1, &["Gaming Tips"])];
        assert!(CategoryFilter::new(["Gaming"]).apply(channels).is_empty());
    }
}
