//! Filter and sort state.
//!
//! Both specs are plain values. They are replaced wholesale on every change;
//! the only place partial edits exist is [`FilterPatch`], which is merged
//! onto the current spec to produce the next one.

use catalog::{Quality, SortDirection, SortField};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Everything the user can filter on.
///
/// The all-default value means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Free-text search over title and category tags
    pub search: String,
    /// Category tags, OR semantics
    pub categories: Vec<String>,
    /// Quality buckets, OR semantics
    pub quality: Vec<Quality>,
    pub is_monetized: Option<bool>,
    pub is_faceless: Option<bool>,
    pub has_shorts: Option<bool>,
    pub min_subscribers: Option<u64>,
    pub max_subscribers: Option<u64>,
    pub min_revenue: Option<f64>,
    pub max_revenue: Option<f64>,
}

impl FilterSpec {
    /// True when no field deviates from its default
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_revenue_bound(&self) -> bool {
        self.min_revenue.is_some() || self.max_revenue.is_some()
    }

    pub fn has_subscriber_bound(&self) -> bool {
        self.min_subscribers.is_some() || self.max_subscribers.is_some()
    }

    /// Apply a patch, producing the next spec
    pub fn merged(&self, patch: FilterPatch) -> Self {
        let mut next = self.clone();
        if let Some(search) = patch.search {
            next.search = search;
        }
        if let Some(categories) = patch.categories {
            next.categories = categories;
        }
        if let Some(quality) = patch.quality {
            next.quality = quality;
        }
        if let Some(v) = patch.is_monetized {
            next.is_monetized = v;
        }
        if let Some(v) = patch.is_faceless {
            next.is_faceless = v;
        }
        if let Some(v) = patch.has_shorts {
            next.has_shorts = v;
        }
        if let Some(v) = patch.min_subscribers {
            next.min_subscribers = v;
        }
        if let Some(v) = patch.max_subscribers {
            next.max_subscribers = v;
        }
        if let Some(v) = patch.min_revenue {
            next.min_revenue = v;
        }
        if let Some(v) = patch.max_revenue {
            next.max_revenue = v;
        }
        next
    }
}

impl Hash for FilterSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.search.hash(state);
        self.categories.hash(state);
        self.quality.hash(state);
        self.is_monetized.hash(state);
        self.is_faceless.hash(state);
        self.has_shorts.hash(state);
        self.min_subscribers.hash(state);
        self.max_subscribers.hash(state);
        self.min_revenue.map(f64::to_bits).hash(state);
        self.max_revenue.map(f64::to_bits).hash(state);
    }
}

/// Partial override of a [`FilterSpec`].
///
/// `None` leaves a field untouched. Nullable fields take `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub categories: Option<Vec<String>>,
    pub quality: Option<Vec<Quality>>,
    pub is_monetized: Option<Option<bool>>,
    pub is_faceless: Option<Option<bool>>,
    pub has_shorts: Option<Option<bool>>,
    pub min_subscribers: Option<Option<u64>>,
    pub max_subscribers: Option<Option<u64>>,
    pub min_revenue: Option<Option<f64>>,
    pub max_revenue: Option<Option<f64>>,
}

/// The single active ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Next spec after the user picks `field`: the active field flips
    /// direction, a new field starts descending.
    pub fn toggled(&self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::new(field, SortDirection::Desc)
        }
    }
}

/// Identity of a (FilterSpec, SortSpec) pair.
///
/// Cursors carry the fingerprint they were produced under and are only
/// honoured while it still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(filters: &FilterSpec, sort: &SortSpec) -> Self {
        let mut hasher = DefaultHasher::new();
        filters.hash(&mut hasher);
        sort.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_unconstrained() {
        assert!(FilterSpec::default().is_unconstrained());

        let searched = FilterSpec {
            search: "gaming".to_string(),
            ..Default::default()
        };
        assert!(!searched.is_unconstrained());
    }

    #[test]
    fn test_patch_overrides_only_given_fields() {
        let base = FilterSpec {
            search: "cooking".to_string(),
            is_monetized: Some(true),
            min_revenue: Some(100.0),
            ..Default::default()
        };
        let patch = FilterPatch {
            is_monetized: Some(None),
            max_subscribers: Some(Some(50_000)),
            ..Default::default()
        };

        let next = base.merged(patch);
        assert_eq!(next.search, "cooking");
        assert_eq!(next.is_monetized, None);
        assert_eq!(next.min_revenue, Some(100.0));
        assert_eq!(next.max_subscribers, Some(50_000));
    }

    #[test]
    fn test_sort_toggle() {
        let sort = SortSpec::default();
        assert_eq!(sort.field, SortField::Subscribers);
        assert_eq!(sort.direction, SortDirection::Desc);

        let flipped = sort.toggled(SortField::Subscribers);
        assert_eq!(flipped.direction, SortDirection::Asc);

        let switched = flipped.toggled(SortField::Rpm);
        assert_eq!(switched, SortSpec::new(SortField::Rpm, SortDirection::Desc));
    }

    #[test]
    fn test_fingerprint_tracks_both_specs() {
        let filters = FilterSpec::default();
        let sort = SortSpec::default();
        let base = Fingerprint::of(&filters, &sort);

        assert_eq!(base, Fingerprint::of(&filters.clone(), &sort));
        assert_ne!(base, Fingerprint::of(&filters, &sort.toggled(SortField::Subscribers)));

        let filtered = FilterSpec {
            min_revenue: Some(1000.0),
            ..Default::default()
        };
        assert_ne!(base, Fingerprint::of(&filtered, &sort));
    }
}
