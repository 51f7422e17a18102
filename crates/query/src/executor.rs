//! # Query Executor
//!
//! Runs exactly one page query against the store.
//!
//! ## Algorithm
//! 1. Ask for `PAGE_SIZE + 1` records in SortSpec order (over-fetch by one)
//! 2. With a cursor, read strictly after it (forward) or the trailing
//!    records strictly before it (backward)
//! 3. If the extra record came back, more pages exist in the direction of
//!    travel; drop the extra record before anyone else sees the page
//! 4. A backward page that found records came from a page after it, so it
//!    always has a next page; an empty one has nothing to offer either way
//!
//! Page existence is decided here, on the raw page. The residual pass that
//! runs afterwards can only shrink what is displayed, never what exists.

use crate::cursor::{Cursor, Direction};
use crate::error::{QueryError, Result};
use crate::planner::PlanResult;
use crate::spec::SortSpec;
use crate::PAGE_SIZE;
use catalog::{Channel, ChannelStore, PageQuery};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// A page exactly as the store returned it, over-fetch removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    /// At most `PAGE_SIZE` channels, in SortSpec order
    pub channels: Vec<Channel>,
    pub has_next: bool,
    /// True whenever the fetch started from a cursor
    pub has_prev: bool,
}

impl RawPage {
    pub fn first(&self) -> Option<&Channel> {
        self.channels.first()
    }

    pub fn last(&self) -> Option<&Channel> {
        self.channels.last()
    }
}

/// Issues page queries against one collection of a shared store
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn ChannelStore>,
    collection: String,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn ChannelStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Fetch one page.
    ///
    /// # Arguments
    /// * `plan` - Pushable constraints from the planner
    /// * `sort` - Active ordering
    /// * `cursor` - Boundary to page from; `None` fetches the first page
    /// * `direction` - Which side of the cursor to read; ignored without one
    ///
    /// # Returns
    /// The raw page. Store failures are returned as
    /// [`QueryError::StoreFetch`] and never retried.
    #[instrument(skip_all, fields(collection = %self.collection, sort = %sort.field, dir = %sort.direction))]
    pub async fn fetch_page(
        &self,
        plan: &PlanResult,
        sort: &SortSpec,
        cursor: Option<&Cursor>,
        direction: Direction,
    ) -> Result<RawPage> {
        let limit = PAGE_SIZE + 1;
        let mut query = PageQuery::new(self.collection.clone(), sort.field, sort.direction)
            .with_constraints(plan.constraints.clone())
            .with_limit(limit);
        if let Some(cursor) = cursor {
            query = query.with_boundary(cursor.boundary(), direction.mode());
        }

        let mut channels = self.store.query_page(&query).await.map_err(|e| {
            error!("Store fetch error: {}", e);
            QueryError::StoreFetch(e)
        })?;

        if channels.len() > limit {
            return Err(QueryError::LimitExceeded {
                returned: channels.len(),
                limit,
            });
        }

        let overfetched = channels.len() > PAGE_SIZE;
        let backward = cursor.is_some() && direction == Direction::Backward;
        if overfetched {
            if backward {
                // The extra record is the one farthest from the boundary
                channels.remove(0);
            } else {
                channels.truncate(PAGE_SIZE);
            }
        }

        let has_next = if backward { !channels.is_empty() } else { overfetched };
        let has_prev = cursor.is_some();

        debug!(
            "Fetched {} channels (has_next: {}, has_prev: {})",
            channels.len(),
            has_next,
            has_prev
        );

        Ok(RawPage {
            channels,
            has_next,
            has_prev,
        })
    }
}
