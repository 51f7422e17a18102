//! Approximate result totals.
//!
//! The count covers only the constraints the store can evaluate. Search,
//! category tags and a residual subscriber range are not reflected, so the
//! figure is an upper bound on what the user will actually see.

use crate::planner::FilterPlanner;
use crate::spec::FilterSpec;
use catalog::ChannelStore;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CountEstimator {
    store: Arc<dyn ChannelStore>,
    collection: String,
}

impl CountEstimator {
    pub fn new(store: Arc<dyn ChannelStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Count channels matching the pushable part of `filters`.
    ///
    /// Failures are logged and reported as 0; a missing total never blocks
    /// a page from rendering.
    pub async fn estimate(&self, filters: &FilterSpec) -> u64 {
        let plan = FilterPlanner::plan(filters);
        match self.store.count_matching(&self.collection, &plan.constraints).await {
            Ok(count) => {
                debug!("Estimated {} matching channels", count);
                count
            }
            Err(e) => {
                warn!("Count query failed, reporting 0: {}", e);
                0
            }
        }
    }
}
