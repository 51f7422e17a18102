//! Browser crate: the page controller for one browsing session.
//!
//! This crate ties the query engine to a presentation layer. It owns the
//! current filter/sort specs, debounces edits, keeps stale fetches from
//! being published, and exposes page views plus summary stats.

pub mod controller;
pub mod debounce;
pub mod error;
pub mod stats;

pub use controller::{
    total_pages, ControllerConfig, FetchOutcome, PageController, PageView, DEFAULT_COLLECTION,
    DEFAULT_DEBOUNCE,
};
pub use debounce::Debouncer;
pub use error::{BrowseError, Result};
pub use stats::{format_currency, format_number, PageStats};
