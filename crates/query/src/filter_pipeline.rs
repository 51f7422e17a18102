//! The FilterPipeline chains residual filters.
//!
//! [`FilterPipeline::residual`] builds the pipeline a given spec and plan
//! need; stages whose predicate is unset are simply not added.

use crate::filters::{CategoryFilter, SearchFilter, SubscriberRangeFilter};
use crate::planner::PlanResult;
use crate::spec::FilterSpec;
use crate::traits::Filter;
use catalog::Channel;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(SearchFilter::new("gaming"))
///     .add_filter(CategoryFilter::new(["Esports"]));
///
/// let displayed = pipeline.apply(raw_page);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build the residual pass for a spec and the plan made from it.
    ///
    /// ## Stages, in order
    /// 1. Search, when the search text is non-empty
    /// 2. Category tags, when any are selected
    /// 3. Subscriber range, when the revenue range took the store's range slot
    ///    and a subscriber bound is set
    pub fn residual(filters: &FilterSpec, plan: &PlanResult) -> Self {
        let mut pipeline = Self::new();
        if !filters.search.is_empty() {
            pipeline = pipeline.add_filter(SearchFilter::new(&filters.search));
        }
        if !filters.categories.is_empty() {
            pipeline = pipeline.add_filter(CategoryFilter::new(filters.categories.iter().cloned()));
        }
        if plan.subscriber_range_is_residual() && filters.has_subscriber_bound() {
            pipeline = pipeline.add_filter(SubscriberRangeFilter::new(
                filters.min_subscribers,
                filters.max_subscribers,
            ));
        }
        pipeline
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the page.
    ///
    /// ## Algorithm
    /// 1. Start with the fetched page
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return what survived, in the original order
    pub fn apply(&self, channels: Vec<Channel>) -> Vec<Channel> {
        let mut current = channels;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the residual pass for `filters` over a fetched page.
pub fn apply_residual(channels: Vec<Channel>, filters: &FilterSpec, plan: &PlanResult) -> Vec<Channel> {
    FilterPipeline::residual(filters, plan).apply(channels)
}
