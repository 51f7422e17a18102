//! Core domain types for the channel collection.
//!
//! This module defines the record the store holds and the vocabulary the
//! query layer uses to talk about it:
//! - [`Channel`], the stored entity
//! - [`Field`] and [`FieldValue`], the typed view of a document field
//! - [`SortField`] and [`SortDirection`], the orderings the store supports

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable document identifier of a channel.
///
/// Upstream sources key channels either numerically or with an opaque string
/// (a database object id, a `UC...` channel id). Numeric ids order before
/// string keys; each kind orders naturally within itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelId {
    Number(u64),
    Key(String),
}

impl ChannelId {
    /// Read an id from its text form. Numeric text becomes a numeric id;
    /// blank text is no id at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(
            raw.parse()
                .map(ChannelId::Number)
                .unwrap_or_else(|_| ChannelId::Key(raw.to_string())),
        )
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            ChannelId::Number(n) => Some(*n),
            ChannelId::Key(_) => None,
        }
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        ChannelId::Number(0)
    }
}

impl From<u64> for ChannelId {
    fn from(value: u64) -> Self {
        ChannelId::Number(value)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        ChannelId::Key(value.to_string())
    }
}

impl From<ChannelId> for serde_json::Value {
    fn from(id: ChannelId) -> Self {
        match id {
            ChannelId::Number(n) => serde_json::Value::from(n),
            ChannelId::Key(key) => serde_json::Value::String(key),
        }
    }
}

impl PartialEq<u64> for ChannelId {
    fn eq(&self, other: &u64) -> bool {
        self.as_number() == Some(*other)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Number(n) => write!(f, "{n}"),
            ChannelId::Key(key) => f.write_str(key),
        }
    }
}

// =============================================================================
// Channel
// =============================================================================

/// Content quality bucket assigned by the upstream source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Mid,
    High,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Low, Quality::Mid, Quality::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Mid => "mid",
            Quality::High => "high",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "mid" => Ok(Quality::Mid),
            "high" => Ok(Quality::High),
            _ => Err(StoreError::InvalidValue {
                field: "quality".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A YouTube channel record as persisted in the `channels` collection.
///
/// Field names serialize in camelCase so documents match what the ingestion
/// job writes. Missing fields take their `Default` value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Channel {
    pub id: ChannelId,
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
    pub subscribers: u64,
    pub avg_view_per_video: f64,
    pub median_view_per_video: f64,
    /// Channel age in days
    pub days_since_start: u32,
    pub num_of_uploads: u32,
    pub is_monetized: bool,
    pub rpm: f64,
    pub avg_monthly_revenue: f64,
    /// Free-form category tags, matched by search and category filters
    pub categories: Vec<String>,
    pub category: Option<String>,
    pub format: Option<String>,
    pub is_faceless: bool,
    pub quality: Quality,
    pub avg_monthly_views: f64,
    pub total_views: u64,
    pub total_revenue_generated: f64,
    pub days_since_last_upload: u32,
    pub has_shorts: bool,
    /// Average video length in seconds
    pub avg_video_length: f64,
    pub outlier_score: f64,
    pub avg_monthly_upload_frequency: f64,
    /// Set by the ingestion job on every sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

impl Channel {
    /// Typed value of a document field, as the store's query engine sees it.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Quality => FieldValue::Text(self.quality.as_str().to_string()),
            Field::Categories => FieldValue::List(self.categories.clone()),
            Field::IsMonetized => FieldValue::Bool(self.is_monetized),
            Field::IsFaceless => FieldValue::Bool(self.is_faceless),
            Field::HasShorts => FieldValue::Bool(self.has_shorts),
            Field::Subscribers => FieldValue::Number(self.subscribers as f64),
            Field::AvgMonthlyRevenue => FieldValue::Number(self.avg_monthly_revenue),
            Field::TotalViews => FieldValue::Number(self.total_views as f64),
            Field::Rpm => FieldValue::Number(self.rpm),
            Field::NumOfUploads => FieldValue::Number(self.num_of_uploads as f64),
            Field::AvgViewPerVideo => FieldValue::Number(self.avg_view_per_video),
            Field::DaysSinceStart => FieldValue::Number(self.days_since_start as f64),
            Field::OutlierScore => FieldValue::Number(self.outlier_score),
        }
    }
}

// =============================================================================
// Fields and values
// =============================================================================

/// Document fields that can appear in a store constraint or ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Quality,
    Categories,
    IsMonetized,
    IsFaceless,
    HasShorts,
    Subscribers,
    AvgMonthlyRevenue,
    TotalViews,
    Rpm,
    NumOfUploads,
    AvgViewPerVideo,
    DaysSinceStart,
    OutlierScore,
}

impl Field {
    /// Document field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Quality => "quality",
            Field::Categories => "categories",
            Field::IsMonetized => "isMonetized",
            Field::IsFaceless => "isFaceless",
            Field::HasShorts => "hasShorts",
            Field::Subscribers => "subscribers",
            Field::AvgMonthlyRevenue => "avgMonthlyRevenue",
            Field::TotalViews => "totalViews",
            Field::Rpm => "rpm",
            Field::NumOfUploads => "numOfUploads",
            Field::AvgViewPerVideo => "avgViewPerVideo",
            Field::DaysSinceStart => "daysSinceStart",
            Field::OutlierScore => "outlierScore",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar or array value carried by a constraint or read from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::List(items) => write!(f, "{items:?}"),
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Numeric attributes a page can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Subscribers,
    AvgMonthlyRevenue,
    TotalViews,
    Rpm,
    NumOfUploads,
    AvgViewPerVideo,
    DaysSinceStart,
    OutlierScore,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Subscribers,
        SortField::AvgMonthlyRevenue,
        SortField::TotalViews,
        SortField::Rpm,
        SortField::NumOfUploads,
        SortField::AvgViewPerVideo,
        SortField::DaysSinceStart,
        SortField::OutlierScore,
    ];

    /// The document field this ordering reads
    pub fn field(&self) -> Field {
        match self {
            SortField::Subscribers => Field::Subscribers,
            SortField::AvgMonthlyRevenue => Field::AvgMonthlyRevenue,
            SortField::TotalViews => Field::TotalViews,
            SortField::Rpm => Field::Rpm,
            SortField::NumOfUploads => Field::NumOfUploads,
            SortField::AvgViewPerVideo => Field::AvgViewPerVideo,
            SortField::DaysSinceStart => Field::DaysSinceStart,
            SortField::OutlierScore => Field::OutlierScore,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.field().as_str()
    }

    /// Sort key of a channel under this ordering
    pub fn key(&self, channel: &Channel) -> f64 {
        // Every sortable field is numeric
        channel.value(self.field()).as_number().unwrap_or_default()
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| StoreError::InvalidValue {
                field: "sort".to_string(),
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(StoreError::InvalidValue {
                field: "dir".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_deserializes_camel_case_with_defaults() {
        let json = r#"{
            "id": 42,
            "title": "Pro Gaming Channel",
            "subscribers": 120000,
            "avgMonthlyRevenue": 1500.5,
            "isMonetized": true,
            "quality": "high",
            "categories": ["Gaming", "Esports"]
        }"#;

        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.id, 42u64);
        assert_eq!(channel.subscribers, 120_000);
        assert_eq!(channel.quality, Quality::High);
        assert!(channel.is_monetized);
        assert!(!channel.has_shorts);
        assert_eq!(channel.categories.len(), 2);
        assert_eq!(channel.fetched_at, None);
    }

    #[test]
    fn test_sort_field_round_trips_through_names() {
        for field in SortField::ALL {
            assert_eq!(field.as_str().parse::<SortField>().unwrap(), field);
        }
        assert!("title".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_key_reads_numeric_field() {
        let channel = Channel {
            num_of_uploads: 310,
            outlier_score: 2.5,
            ..Default::default()
        };
        assert_eq!(SortField::NumOfUploads.key(&channel), 310.0);
        assert_eq!(SortField::OutlierScore.key(&channel), 2.5);
    }

    #[test]
    fn test_channel_id_accepts_string_keys() {
        let channel: Channel = serde_json::from_str(r#"{"id": "UCabc123"}"#).unwrap();
        assert_eq!(channel.id, ChannelId::Key("UCabc123".to_string()));
        assert_eq!(serde_json::to_value(&channel.id).unwrap(), serde_json::json!("UCabc123"));
    }

    #[test]
    fn test_channel_id_parse_and_order() {
        assert_eq!(ChannelId::parse(" 42 "), Some(ChannelId::Number(42)));
        assert_eq!(ChannelId::parse("UCabc"), Some(ChannelId::from("UCabc")));
        assert_eq!(ChannelId::parse("  "), None);

        // Numeric ids order numerically and before string keys
        assert!(ChannelId::from(9u64) < ChannelId::from(10u64));
        assert!(ChannelId::from(10u64) < ChannelId::from("1"));
    }

    #[test]
    fn test_quality_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Quality>().unwrap(), Quality::High);
        assert!("premium".parse::<Quality>().is_err());
    }
}
