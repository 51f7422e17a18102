//! Filter planning and cursor pagination over a [`catalog::ChannelStore`].
//!
//! This crate provides:
//! - FilterSpec / SortSpec values and their URL key/value codec
//! - FilterPlanner for splitting a spec into store constraints and residuals
//! - QueryExecutor for over-fetching one page at a time
//! - Filter trait and FilterPipeline for the residual pass
//! - CursorManager for next/previous page requests
//! - CountEstimator and the category catalog
//!
//! ## Architecture
//! A page is produced in stages:
//! 1. FilterPlanner pushes what the store can evaluate
//! 2. QueryExecutor fetches `PAGE_SIZE + 1` records and decides has-next
//! 3. CursorManager records the raw page's first and last records
//! 4. FilterPipeline drops records failing the residual predicates
//!
//! ## Example Usage
//! ```ignore
//! use query::{apply_residual, Direction, FilterPlanner, FilterSpec, QueryExecutor, SortSpec};
//!
//! let plan = FilterPlanner::plan(&filters);
//! let executor = QueryExecutor::new(store.clone(), "channels");
//! let raw = executor.fetch_page(&plan, &SortSpec::default(), None, Direction::Forward).await?;
//! let displayed = apply_residual(raw.channels.clone(), &filters, &plan);
//! ```

pub mod categories;
pub mod count;
pub mod cursor;
pub mod error;
pub mod executor;
pub mod filter_pipeline;
pub mod filters;
pub mod params;
pub mod planner;
pub mod spec;
pub mod traits;

/// Records per page. Fixed; callers must not treat it as configurable.
pub const PAGE_SIZE: usize = 25;

// Re-export main types
pub use categories::{fetch_categories, CATEGORY_SAMPLE_SIZE};
pub use count::CountEstimator;
pub use cursor::{BoundaryKind, Cursor, CursorManager, Direction, PageRequest};
pub use error::{QueryError, Result};
pub use executor::{QueryExecutor, RawPage};
pub use filter_pipeline::{apply_residual, FilterPipeline};
pub use planner::{FilterPlanner, PlanResult};
pub use spec::{FilterPatch, FilterSpec, Fingerprint, SortSpec};
pub use traits::Filter;
