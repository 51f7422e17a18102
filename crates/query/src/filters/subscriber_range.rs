//! Local subscriber range check.
//!
//! Only used when the revenue range took the store's single range slot.

use crate::traits::Filter;
use catalog::Channel;

/// Keeps channels whose subscriber count lies within the inclusive bounds.
pub struct SubscriberRangeFilter {
    min: Option<u64>,
    max: Option<u64>,
}

impl SubscriberRangeFilter {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }
}

impl Filter for SubscriberRangeFilter {
    fn name(&self) -> &str {
        "SubscriberRangeFilter"
    }

    fn apply(&self, channels: Vec<Channel>) -> Vec<Channel> {
        channels
            .into_iter()
            .filter(|channel| {
                self.min.is_none_or(|min| channel.subscribers >= min)
                    && self.max.is_none_or(|max| channel.subscribers <= max)
            })
            .collect()
    }
}
