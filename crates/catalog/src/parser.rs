//! Parser for channel payloads fetched by the ingestion job.
//!
//! The upstream API is loose about its envelope and its id field:
//! - the body is either a bare array or an object with `data` or `channels`
//! - the identifier may be called `id`, `_id`, or `channelId`
//! - some fields are too heavy to persist and must be projected away
//!
//! Records that cannot be turned into a [`Channel`] are skipped and counted,
//! never fatal. Surviving records stay partial: they carry only the fields
//! the payload sent, so a merge never clobbers what the payload left out.

use crate::error::Result;
use crate::types::{Channel, ChannelId};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::warn;

/// Fields stripped from every record before it is persisted
pub const EXCLUDED_FIELDS: &[&str] = &["lastUploadedVideos"];

/// Id field names, in lookup order
const ID_FIELDS: &[&str] = &["id", "_id", "channelId"];

/// One projected record, ready to merge into the stored document
#[derive(Debug, Clone, PartialEq)]
pub struct IngestRecord {
    pub id: ChannelId,
    /// Fields sent by the payload, with `id` and `fetchedAt` normalised
    pub fields: Map<String, Value>,
}

/// Outcome of parsing one payload
#[derive(Debug, Default)]
pub struct IngestBatch {
    pub records: Vec<IngestRecord>,
    /// Records dropped for a missing id or an unreadable shape
    pub skipped: usize,
}

/// Parse a raw API response body into records ready for a merge upsert.
///
/// # Arguments
/// * `body` - Response text from the channel API
/// * `fetched_at` - Timestamp stamped onto every record as `fetchedAt`
pub fn parse_payload(body: &str, fetched_at: &str) -> Result<IngestBatch> {
    let payload: Value = serde_json::from_str(body)?;
    let records = extract_records(payload);

    let parsed: Vec<Option<IngestRecord>> = records
        .into_par_iter()
        .map(|record| normalize_record(record, fetched_at))
        .collect();

    let total = parsed.len();
    let records: Vec<IngestRecord> = parsed.into_iter().flatten().collect();
    let skipped = total - records.len();
    if skipped > 0 {
        warn!("Skipped {} of {} channel records", skipped, total);
    }

    Ok(IngestBatch { records, skipped })
}

/// Unwrap the record list from whatever envelope the API used.
///
/// `data` wins when it holds an array; otherwise `channels` is tried.
/// Unknown shapes yield no records rather than an error.
pub fn extract_records(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(records) => records,
        Value::Object(mut envelope) => {
            for name in ["data", "channels"] {
                if let Some(Value::Array(records)) = envelope.remove(name) {
                    return records;
                }
            }
            warn!("Payload has no channel array under 'data' or 'channels'");
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Identifier of a raw record.
///
/// Numbers and numeric strings become numeric ids; any other non-blank
/// string is kept as an opaque key.
pub fn resolve_id(record: &Value) -> Option<ChannelId> {
    ID_FIELDS.iter().find_map(|name| match record.get(*name)? {
        Value::Number(n) => match n.as_u64() {
            Some(id) => Some(ChannelId::Number(id)),
            None => ChannelId::parse(&n.to_string()),
        },
        Value::String(s) => ChannelId::parse(s),
        _ => None,
    })
}

/// Remove [`EXCLUDED_FIELDS`] from a raw record
pub fn project(mut record: Value) -> Value {
    if let Value::Object(fields) = &mut record {
        for name in EXCLUDED_FIELDS {
            fields.remove(*name);
        }
    }
    record
}

/// Project one raw record, or `None` if it must be skipped
fn normalize_record(record: Value, fetched_at: &str) -> Option<IngestRecord> {
    let Some(id) = resolve_id(&record) else {
        warn!("Channel without ID found, skipping");
        return None;
    };
    let Value::Object(mut fields) = project(record) else {
        return None;
    };
    fields.insert("id".to_string(), Value::from(id.clone()));
    fields.insert("fetchedAt".to_string(), Value::from(fetched_at));

    // Typed fields must still read as a channel
    if let Err(e) = serde_json::from_value::<Channel>(Value::Object(fields.clone())) {
        warn!("Channel {} has an unreadable shape: {}", id, e);
        return None;
    }
    Some(IngestRecord { id, fields })
}
