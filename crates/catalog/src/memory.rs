//! In-memory document store.
//!
//! `MemoryStore` holds whole collections in memory and evaluates the
//! restricted constraint language from [`crate::store`] exactly the way a
//! hosted document store would, including its refusals. It backs the CLI and
//! every test that needs a store.
//!
//! Constraint evaluation and sorting run on Rayon's thread pool; collections
//! of a few hundred thousand channels stay well under a millisecond per page.

use crate::error::{Result, StoreError};
use crate::parser::IngestRecord;
use crate::store::{
    compare_positions, validate_constraints, Boundary, BoundaryMode, ChannelStore, Constraint,
    PageQuery,
};
use crate::types::{Channel, ChannelId};
use async_trait::async_trait;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// Maximum number of documents written per upsert batch
pub const UPSERT_BATCH_SIZE: usize = 500;

type Collection = HashMap<ChannelId, Channel>;

/// Thread-safe in-memory store keyed by collection name, then document id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one pre-filled collection
    pub fn with_channels(collection: &str, channels: Vec<Channel>) -> Self {
        let docs: Collection = channels.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self {
            collections: RwLock::new(HashMap::from([(collection.to_string(), docs)])),
        }
    }

    /// Load a collection from a JSON array of channel documents
    pub fn load_from_file(path: &Path, collection: &str) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let channels: Vec<Channel> = serde_json::from_str(&text)?;
        info!(
            "Loaded {} channels from {} into '{}'",
            channels.len(),
            path.display(),
            collection
        );
        let store = Self::new();
        store.upsert(collection, channels)?;
        Ok(store)
    }

    /// Write a collection out as a JSON array, ordered by id
    pub fn save_to_file(&self, collection: &str, path: &Path) -> Result<usize> {
        let mut channels: Vec<Channel> = {
            let collections = self.read()?;
            collections
                .get(collection)
                .map(|docs| docs.values().cloned().collect())
                .unwrap_or_default()
        };
        channels.sort_by(|a, b| a.id.cmp(&b.id));
        fs::write(path, serde_json::to_string_pretty(&channels)?)?;
        Ok(channels.len())
    }

    /// Insert or replace documents, in batches of [`UPSERT_BATCH_SIZE`].
    ///
    /// Returns the number of documents written.
    pub fn upsert(&self, collection: &str, channels: Vec<Channel>) -> Result<usize> {
        let mut written = 0;
        for (batch_no, chunk) in channels.chunks(UPSERT_BATCH_SIZE).enumerate() {
            let mut collections = self.write()?;
            let docs = collections.entry(collection.to_string()).or_default();
            for channel in chunk {
                docs.insert(channel.id.clone(), channel.clone());
            }
            written += chunk.len();
            debug!(
                "Committed batch {} ({} documents) to '{}'",
                batch_no + 1,
                chunk.len(),
                collection
            );
        }
        Ok(written)
    }

    /// Merge partial documents into a collection, in batches of
    /// [`UPSERT_BATCH_SIZE`].
    ///
    /// Fields present in a record overwrite the stored document's; fields it
    /// leaves out keep their stored values. Records with an unknown id
    /// create a new document. A batch is applied whole or not at all.
    ///
    /// Returns the number of documents written.
    pub fn merge_upsert(&self, collection: &str, records: Vec<IngestRecord>) -> Result<usize> {
        let mut written = 0;
        for (batch_no, chunk) in records.chunks(UPSERT_BATCH_SIZE).enumerate() {
            let mut collections = self.write()?;
            let docs = collections.entry(collection.to_string()).or_default();

            let merged = chunk
                .iter()
                .map(|record| merge_document(docs.get(&record.id), record))
                .collect::<Result<Vec<Channel>>>()?;
            for channel in merged {
                docs.insert(channel.id.clone(), channel);
            }

            written += chunk.len();
            debug!(
                "Merged batch {} ({} documents) into '{}'",
                batch_no + 1,
                chunk.len(),
                collection
            );
        }
        Ok(written)
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> Result<usize> {
        Ok(self.read()?.get(collection).map(|docs| docs.len()).unwrap_or(0))
    }

    pub fn is_empty(&self, collection: &str) -> Result<bool> {
        Ok(self.len(collection)? == 0)
    }

    /// Get a document by id
    pub fn get(&self, collection: &str, id: &ChannelId) -> Result<Option<Channel>> {
        Ok(self.read()?.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    /// All documents matching every constraint, in no particular order
    fn select(&self, collection: &str, constraints: &[Constraint]) -> Result<Vec<Channel>> {
        let collections = self.read()?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .par_iter()
            .filter(|(_, channel)| constraints.iter().all(|c| c.matches(channel)))
            .map(|(_, channel)| channel.clone())
            .collect())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

/// Overlay a partial record onto the stored document, if there is one
fn merge_document(existing: Option<&Channel>, record: &IngestRecord) -> Result<Channel> {
    let mut document = match existing {
        Some(channel) => serde_json::to_value(channel)?,
        None => Value::Object(serde_json::Map::new()),
    };
    if let Value::Object(fields) = &mut document {
        for (name, value) in &record.fields {
            fields.insert(name.clone(), value.clone());
        }
    }
    let mut channel: Channel = serde_json::from_value(document)?;
    channel.id = record.id.clone();
    Ok(channel)
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Channel>> {
        validate_constraints(&query.constraints)?;
        if query.limit == 0 {
            return Err(StoreError::InvalidQuery {
                reason: "limit must be positive".to_string(),
            });
        }

        let mut matching = self.select(&query.collection, &query.constraints)?;
        let (sort_field, direction) = (query.sort_field, query.direction);
        matching.par_sort_by(|a, b| {
            compare_positions(
                &Boundary::of(a, sort_field),
                &Boundary::of(b, sort_field),
                direction,
            )
        });

        let page: Vec<Channel> = match (&query.boundary, query.mode) {
            (None, _) => matching.into_iter().take(query.limit).collect(),
            (Some(boundary), BoundaryMode::After) => matching
                .into_iter()
                .filter(|c| {
                    compare_positions(&Boundary::of(c, sort_field), boundary, direction).is_gt()
                })
                .take(query.limit)
                .collect(),
            (Some(boundary), BoundaryMode::Before) => {
                let mut preceding: Vec<Channel> = matching
                    .into_iter()
                    .filter(|c| {
                        compare_positions(&Boundary::of(c, sort_field), boundary, direction)
                            .is_lt()
                    })
                    .collect();
                let skip = preceding.len().saturating_sub(query.limit);
                preceding.drain(..skip);
                preceding
            }
        };

        debug!(
            "Query on '{}' ({} constraints, {} {}) returned {} documents",
            query.collection,
            query.constraints.len(),
            sort_field,
            direction,
            page.len()
        );
        Ok(page)
    }

    async fn count_matching(&self, collection: &str, constraints: &[Constraint]) -> Result<u64> {
        validate_constraints(constraints)?;
        let collections = self.read()?;
        let count = collections
            .get(collection)
            .map(|docs| {
                docs.par_iter()
                    .filter(|(_, channel)| constraints.iter().all(|c| c.matches(channel)))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }
}
