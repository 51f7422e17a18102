//! Key/value codec for filter and sort state.
//!
//! Used to persist the browsing state in a URL query string. Parsing is
//! total: a missing or unparseable key yields that field's default, and
//! when a key repeats, the first occurrence wins.

use crate::spec::{FilterSpec, SortSpec};
use catalog::Quality;
use std::collections::HashMap;
use std::str::FromStr;

const SEARCH: &str = "search";
const CATEGORIES: &str = "categories";
const QUALITY: &str = "quality";
const MONETIZED: &str = "monetized";
const FACELESS: &str = "faceless";
const SHORTS: &str = "shorts";
const MIN_SUBS: &str = "minSubs";
const MAX_SUBS: &str = "maxSubs";
const MIN_REV: &str = "minRev";
const MAX_REV: &str = "maxRev";
const SORT: &str = "sort";
const DIR: &str = "dir";

/// Encode the state as ordered key/value pairs.
///
/// Unset fields and the default sort are omitted, so the default state
/// serializes to nothing.
pub fn serialize(filters: &FilterSpec, sort: &SortSpec) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut push = |key: &str, value: String| pairs.push((key.to_string(), value));

    if !filters.search.is_empty() {
        push(SEARCH, filters.search.clone());
    }
    if !filters.categories.is_empty() {
        push(CATEGORIES, filters.categories.join(","));
    }
    if !filters.quality.is_empty() {
        let quality: Vec<&str> = filters.quality.iter().map(Quality::as_str).collect();
        push(QUALITY, quality.join(","));
    }
    if let Some(v) = filters.is_monetized {
        push(MONETIZED, v.to_string());
    }
    if let Some(v) = filters.is_faceless {
        push(FACELESS, v.to_string());
    }
    if let Some(v) = filters.has_shorts {
        push(SHORTS, v.to_string());
    }
    if let Some(v) = filters.min_subscribers {
        push(MIN_SUBS, v.to_string());
    }
    if let Some(v) = filters.max_subscribers {
        push(MAX_SUBS, v.to_string());
    }
    if let Some(v) = filters.min_revenue {
        push(MIN_REV, v.to_string());
    }
    if let Some(v) = filters.max_revenue {
        push(MAX_REV, v.to_string());
    }

    let default_sort = SortSpec::default();
    if sort.field != default_sort.field {
        push(SORT, sort.field.as_str().to_string());
    }
    if sort.direction != default_sort.direction {
        push(DIR, sort.direction.as_str().to_string());
    }
    pairs
}

/// Decode key/value pairs into a state.
pub fn parse<I, K, V>(pairs: I) -> (FilterSpec, SortSpec)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in pairs {
        params.entry(key.into()).or_insert_with(|| value.into());
    }
    let get = |key: &str| params.get(key).map(String::as_str);

    let filters = FilterSpec {
        search: get(SEARCH).unwrap_or_default().to_string(),
        categories: get(CATEGORIES).map(split_list).unwrap_or_default(),
        quality: get(QUALITY)
            .map(|raw| {
                split_list(raw)
                    .iter()
                    .filter_map(|q| Quality::from_str(q).ok())
                    .collect()
            })
            .unwrap_or_default(),
        is_monetized: get(MONETIZED).and_then(parse_bool),
        is_faceless: get(FACELESS).and_then(parse_bool),
        has_shorts: get(SHORTS).and_then(parse_bool),
        min_subscribers: get(MIN_SUBS).and_then(|v| v.trim().parse().ok()),
        max_subscribers: get(MAX_SUBS).and_then(|v| v.trim().parse().ok()),
        min_revenue: get(MIN_REV).and_then(parse_finite),
        max_revenue: get(MAX_REV).and_then(parse_finite),
    };

    let default_sort = SortSpec::default();
    let sort = SortSpec {
        field: get(SORT)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_sort.field),
        direction: get(DIR)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_sort.direction),
    };

    (filters, sort)
}

/// Encode the state as a URL query string (without the leading `?`)
pub fn to_query_string(filters: &FilterSpec, sort: &SortSpec) -> String {
    serde_urlencoded::to_string(serialize(filters, sort)).unwrap_or_default()
}

/// Decode a URL query string; a leading `?` is accepted
pub fn from_query_string(query: &str) -> (FilterSpec, SortSpec) {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
    parse(pairs)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{SortDirection, SortField};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_state_serializes_to_nothing() {
        assert!(serialize(&FilterSpec::default(), &SortSpec::default()).is_empty());
        assert_eq!(to_query_string(&FilterSpec::default(), &SortSpec::default()), "");
    }

    #[test]
    fn test_serialize_uses_short_keys() {
        let filters = FilterSpec {
            categories: vec!["Gaming".to_string(), "Tech".to_string()],
            quality: vec![Quality::High, Quality::Mid],
            is_faceless: Some(false),
            min_subscribers: Some(5000),
            min_revenue: Some(1000.0),
            ..Default::default()
        };
        let sort = SortSpec::new(SortField::Rpm, SortDirection::Asc);

        assert_eq!(
            serialize(&filters, &sort),
            pairs(&[
                ("categories", "Gaming,Tech"),
                ("quality", "high,mid"),
                ("faceless", "false"),
                ("minSubs", "5000"),
                ("minRev", "1000"),
                ("sort", "rpm"),
                ("dir", "asc"),
            ])
        );
    }

    #[test]
    fn test_parse_restores_serialized_state() {
        let filters = FilterSpec {
            search: "lo-fi beats".to_string(),
            is_monetized: Some(true),
            max_revenue: Some(2500.5),
            ..Default::default()
        };
        let sort = SortSpec::new(SortField::TotalViews, SortDirection::Desc);

        let query = to_query_string(&filters, &sort);
        assert_eq!(from_query_string(&query), (filters, sort));
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let (filters, sort) = parse(pairs(&[
            ("monetized", "yes"),
            ("minSubs", "-5"),
            ("minRev", "NaN"),
            ("maxRev", "abc"),
            ("quality", "high,ultra"),
            ("sort", "likes"),
            ("dir", "sideways"),
        ]));

        assert_eq!(filters.is_monetized, None);
        assert_eq!(filters.min_subscribers, None);
        assert_eq!(filters.min_revenue, None);
        assert_eq!(filters.max_revenue, None);
        assert_eq!(filters.quality, vec![Quality::High]);
        assert_eq!(sort, SortSpec::default());
    }

    #[test]
    fn test_first_occurrence_wins_and_empty_entries_dropped() {
        let (filters, _) = parse(pairs(&[
            ("search", "first"),
            ("search", "second"),
            ("categories", "a,,b,"),
        ]));

        assert_eq!(filters.search, "first");
        assert_eq!(filters.categories, vec!["a", "b"]);
    }

    #[test]
    fn test_from_query_string_accepts_leading_question_mark() {
        let (filters, sort) = from_query_string("?search=pro%20gaming&sort=avgMonthlyRevenue");
        assert_eq!(filters.search, "pro gaming");
        assert_eq!(sort.field, SortField::AvgMonthlyRevenue);
        assert_eq!(sort.direction, SortDirection::Desc);
    }
}
