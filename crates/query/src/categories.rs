//! Category catalog for the filter UI.

use catalog::{ChannelStore, PageQuery, SortDirection, SortField};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Number of channels sampled when collecting tags
pub const CATEGORY_SAMPLE_SIZE: usize = 500;

/// Distinct category tags across a sample of the collection, sorted.
///
/// Returns an empty list if the store cannot be read.
pub async fn fetch_categories(store: &dyn ChannelStore, collection: &str) -> Vec<String> {
    let query = PageQuery::new(collection, SortField::Subscribers, SortDirection::Desc)
        .with_limit(CATEGORY_SAMPLE_SIZE);

    match store.query_page(&query).await {
        Ok(channels) => {
            let tags: BTreeSet<String> = channels
                .into_iter()
                .flat_map(|c| c.categories)
                .filter(|tag| !tag.trim().is_empty())
                .collect();
            debug!("Collected {} distinct categories", tags.len());
            tags.into_iter().collect()
        }
        Err(e) => {
            warn!("Failed to load categories: {}", e);
            Vec::new()
        }
    }
}
