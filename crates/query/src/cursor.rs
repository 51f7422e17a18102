//! Position cursors and the manager that tracks them.
//!
//! A [`Cursor`] is a plain value: the sort key and id of a boundary record,
//! plus the fingerprint of the filter/sort pair that produced it. Store
//! adapters turn it into their own boundary token via [`Cursor::boundary`].

use crate::executor::RawPage;
use crate::spec::{Fingerprint, SortSpec};
use catalog::{Boundary, BoundaryMode, Channel, ChannelId};
use tracing::debug;

/// Which edge of a page a cursor marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    FirstOfPage,
    LastOfPage,
}

/// Direction of travel from a cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn mode(&self) -> BoundaryMode {
        match self {
            Direction::Forward => BoundaryMode::After,
            Direction::Backward => BoundaryMode::Before,
        }
    }
}

/// Position of one record under one filter/sort pair
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub sort_value: f64,
    pub id: ChannelId,
    pub kind: BoundaryKind,
    pub fingerprint: Fingerprint,
}

impl Cursor {
    pub fn at(channel: &Channel, sort: &SortSpec, kind: BoundaryKind, fingerprint: Fingerprint) -> Self {
        Self {
            sort_value: sort.field.key(channel),
            id: channel.id.clone(),
            kind,
            fingerprint,
        }
    }

    /// Store-facing boundary for this position
    pub fn boundary(&self) -> Boundary {
        Boundary {
            sort_value: self.sort_value,
            id: self.id.clone(),
        }
    }

    pub fn is_valid_for(&self, fingerprint: Fingerprint) -> bool {
        self.fingerprint == fingerprint
    }
}

/// What the manager hands back for `advance` / `retreat`
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub cursor: Cursor,
    pub direction: Direction,
}

/// Tracks the boundary cursors and page number of the current page.
///
/// ## Lifecycle
/// - `reset` on every filter/sort change: cursors cleared, page 1
/// - `record` after every successful fetch: cursors taken from the RAW page
/// - `advance` / `retreat` produce the next request, or `None` when paging
///   that way is not possible
#[derive(Debug, Clone)]
pub struct CursorManager {
    fingerprint: Fingerprint,
    first: Option<Cursor>,
    last: Option<Cursor>,
    has_next: bool,
    has_prev: bool,
    page_number: u32,
}

impl CursorManager {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            first: None,
            last: None,
            has_next: false,
            has_prev: false,
            page_number: 1,
        }
    }

    /// Forget everything; cursors from the old specs are now meaningless
    pub fn reset(&mut self, fingerprint: Fingerprint) {
        *self = Self::new(fingerprint);
    }

    /// Record the boundaries of a freshly fetched raw page.
    ///
    /// `step` is the direction that was travelled to reach it, or `None`
    /// for a first-page fetch.
    pub fn record(&mut self, page: &RawPage, sort: &SortSpec, step: Option<Direction>) {
        let fingerprint = self.fingerprint;
        self.first = page
            .first()
            .map(|c| Cursor::at(c, sort, BoundaryKind::FirstOfPage, fingerprint));
        self.last = page
            .last()
            .map(|c| Cursor::at(c, sort, BoundaryKind::LastOfPage, fingerprint));
        self.has_next = page.has_next;
        self.has_prev = page.has_prev;

        match step {
            None => self.page_number = 1,
            Some(Direction::Forward) => self.page_number += 1,
            Some(Direction::Backward) => self.page_number = self.page_number.saturating_sub(1).max(1),
        }
        debug!(
            "Recorded cursors for page {} (has_next: {}, has_prev: {})",
            self.page_number, self.has_next, self.has_prev
        );
    }

    /// Request for the next page, from the last-of-page cursor
    pub fn advance(&self) -> Option<PageRequest> {
        if !self.has_next {
            return None;
        }
        let cursor = self.last.as_ref().filter(|c| c.is_valid_for(self.fingerprint))?;
        Some(PageRequest {
            cursor: cursor.clone(),
            direction: Direction::Forward,
        })
    }

    /// Request for the previous page, from the first-of-page cursor
    pub fn retreat(&self) -> Option<PageRequest> {
        if !self.has_prev {
            return None;
        }
        let cursor = self.first.as_ref().filter(|c| c.is_valid_for(self.fingerprint))?;
        Some(PageRequest {
            cursor: cursor.clone(),
            direction: Direction::Backward,
        })
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_prev(&self) -> bool {
        self.has_prev
    }

    pub fn first(&self) -> Option<&Cursor> {
        self.first.as_ref()
    }

    pub fn last(&self) -> Option<&Cursor> {
        self.last.as_ref()
    }
}
