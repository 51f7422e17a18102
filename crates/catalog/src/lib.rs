//! # Catalog Crate
//!
//! This crate owns the channel records and the store they live in.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Channel, Quality, Field, SortField)
//! - **store**: The store's constraint language and the `ChannelStore` trait
//! - **memory**: An in-memory `ChannelStore` with the same query rules
//! - **parser**: Normalise ingestion payloads into partial channel records
//! - **error**: Error types for store access
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{ChannelStore, MemoryStore, PageQuery, SortDirection, SortField};
//! use std::path::Path;
//!
//! let store = MemoryStore::load_from_file(Path::new("data/channels.json"), "channels")?;
//!
//! let query = PageQuery::new("channels", SortField::Subscribers, SortDirection::Desc)
//!     .with_limit(26);
//! let page = store.query_page(&query).await?;
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod store;
pub mod memory;
pub mod parser;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use memory::{MemoryStore, UPSERT_BATCH_SIZE};
pub use parser::{parse_payload, IngestBatch, IngestRecord};
pub use store::{
    compare_positions, validate_constraints, Boundary, BoundaryMode, ChannelStore, Constraint,
    Operator, PageQuery,
};
pub use types::{
    // Core types
    Channel,
    ChannelId,
    Field,
    FieldValue,
    // Enums
    Quality,
    SortDirection,
    SortField,
};
