//! # Page Controller
//!
//! Coordinates one browsing session over a channel collection:
//! 1. Hold the current FilterSpec and SortSpec
//! 2. On every change, reset the cursors and restart the debounce countdown
//! 3. When the countdown expires, fetch page 1 and the count concurrently
//! 4. Run the residual pass and publish the page
//! 5. Serve `advance` / `retreat` from the recorded cursors
//!
//! ## Concurrency
//! - Every spec change bumps a generation number. A fetch remembers the
//!   generation it started under and its result is dropped if the number
//!   moved in the meantime; in-flight fetches are never cancelled.
//! - A fetch lock keeps at most one page query in flight. Debounced fetches
//!   wait for it; `advance` / `retreat` give up immediately when it is held.
//! - Published pages go out through a `watch` channel, so observers always
//!   see the latest view without polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, error, info};

use catalog::{Channel, ChannelStore, SortField};
use query::{
    apply_residual, fetch_categories, CountEstimator, CursorManager, Direction, FilterPatch, FilterPlanner,
    FilterSpec, Fingerprint, PageRequest, QueryExecutor, RawPage, SortSpec, PAGE_SIZE,
};

use crate::debounce::Debouncer;
use crate::error::{BrowseError, Result};

/// Collection browsed when none is configured
pub const DEFAULT_COLLECTION: &str = "channels";

/// Quiet period before a spec change triggers a fetch
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub collection: String,
    pub debounce: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Everything the presentation layer needs to draw one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    /// Channels left after the residual pass, in sort order
    pub channels: Vec<Channel>,
    pub page_number: u32,
    /// Approximate; residual predicates are not reflected
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success
    pub error: Option<String>,
    /// Generation of the specs this page was fetched under
    pub generation: u64,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            page_number: 1,
            total_count: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

/// How a fetch request ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new page was published
    Published,
    /// The specs changed while fetching; the result was discarded
    Stale,
    /// Another fetch is in flight; nothing was done
    Busy,
    /// No page exists in the requested direction
    Unavailable,
}

/// Pages needed to show `count` records
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(PAGE_SIZE as u64)
}

struct Session {
    filters: FilterSpec,
    sort: SortSpec,
    cursors: CursorManager,
    generation: u64,
}

impl Session {
    fn new(filters: FilterSpec, sort: SortSpec) -> Self {
        let cursors = CursorManager::new(Fingerprint::of(&filters, &sort));
        Self {
            filters,
            sort,
            cursors,
            generation: 0,
        }
    }
}

pub struct PageController {
    store: Arc<dyn ChannelStore>,
    collection: String,
    executor: QueryExecutor,
    estimator: CountEstimator,
    session: Mutex<Session>,
    fetch_lock: tokio::sync::Mutex<()>,
    debouncer: Debouncer,
    view: watch::Sender<PageView>,
}

impl PageController {
    /// Create a controller with default specs.
    ///
    /// Nothing is fetched until the first `refresh` or spec change.
    pub fn new(store: Arc<dyn ChannelStore>, config: ControllerConfig) -> Arc<Self> {
        Self::with_specs(store, config, FilterSpec::default(), SortSpec::default())
    }

    /// Create a controller starting from restored specs
    pub fn with_specs(
        store: Arc<dyn ChannelStore>,
        config: ControllerConfig,
        filters: FilterSpec,
        sort: SortSpec,
    ) -> Arc<Self> {
        let (view, _) = watch::channel(PageView::default());
        Arc::new(Self {
            executor: QueryExecutor::new(store.clone(), config.collection.clone()),
            estimator: CountEstimator::new(store.clone(), config.collection.clone()),
            store,
            collection: config.collection,
            session: Mutex::new(Session::new(filters, sort)),
            fetch_lock: tokio::sync::Mutex::new(()),
            debouncer: Debouncer::new(config.debounce),
            view,
        })
    }

    // ========================================================================
    // Spec surface
    // ========================================================================

    pub fn filters(&self) -> FilterSpec {
        self.session().filters.clone()
    }

    pub fn sort(&self) -> SortSpec {
        self.session().sort
    }

    /// Replace the filters. An identical spec is ignored.
    pub fn set_filters(self: &Arc<Self>, filters: FilterSpec) {
        self.change(|session| {
            if session.filters == filters {
                return false;
            }
            session.filters = filters;
            true
        });
    }

    /// Merge a partial override onto the current filters
    pub fn update_filters(self: &Arc<Self>, patch: FilterPatch) {
        let next = self.filters().merged(patch);
        self.set_filters(next);
    }

    /// Replace the sort. An identical spec is ignored.
    pub fn set_sort(self: &Arc<Self>, sort: SortSpec) {
        self.change(|session| {
            if session.sort == sort {
                return false;
            }
            session.sort = sort;
            true
        });
    }

    /// Flip the direction of the active field, or switch to `field` descending
    pub fn toggle_sort(self: &Arc<Self>, field: SortField) {
        self.change(|session| {
            session.sort = session.sort.toggled(field);
            true
        });
    }

    /// Clear all filters and go back to page 1.
    ///
    /// Always refetches, even when the filters were already at their defaults.
    pub fn reset(self: &Arc<Self>) {
        self.change(|session| {
            session.filters = FilterSpec::default();
            true
        });
    }

    /// Apply a spec mutation and, if it reports a change, start a new
    /// generation and restart the debounce countdown.
    fn change(self: &Arc<Self>, mutate: impl FnOnce(&mut Session) -> bool) {
        let generation = {
            let mut session = self.session();
            if !mutate(&mut *session) {
                return;
            }
            session.generation += 1;
            let fingerprint = Fingerprint::of(&session.filters, &session.sort);
            session.cursors.reset(fingerprint);
            session.generation
        };
        debug!("Specs changed, generation {}", generation);

        let controller = Arc::clone(self);
        self.debouncer.schedule(move || {
            // Detached so a later countdown restart cannot abort the fetch
            tokio::spawn(async move {
                if let Err(e) = controller.refresh().await {
                    debug!("Debounced refresh failed: {}", e);
                }
            });
        });
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetch page 1 for the current specs, together with the total count.
    ///
    /// Waits for any in-flight fetch to finish first. Returns
    /// [`FetchOutcome::Stale`] if the specs changed before the result came
    /// back.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let _guard = self.fetch_lock.lock().await;

        let (filters, sort, generation) = {
            let session = self.session();
            (session.filters.clone(), session.sort, session.generation)
        };
        self.set_loading();

        let start_time = Instant::now();
        let plan = FilterPlanner::plan(&filters);

        // Page and count are independent round trips
        let (page, count) = tokio::join!(
            self.executor.fetch_page(&plan, &sort, None, Direction::Forward),
            self.estimator.estimate(&filters)
        );

        let mut session = self.session();
        if session.generation != generation {
            info!(
                "Discarding page for generation {} (current: {})",
                generation, session.generation
            );
            return Ok(FetchOutcome::Stale);
        }

        let raw = match page {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };
        session.cursors.record(&raw, &sort, None);
        let view = self.build_view(raw, &filters, &plan, &session, count);
        drop(session);

        info!(
            "Published page 1 ({} shown, {} total) in {:.2?}",
            view.channels.len(),
            view.total_count,
            start_time.elapsed()
        );
        self.view.send_replace(view);
        Ok(FetchOutcome::Published)
    }

    /// Move to the next page. No-op while busy or on the last page.
    pub async fn advance(&self) -> Result<FetchOutcome> {
        self.step(CursorManager::advance).await
    }

    /// Move to the previous page. No-op while busy or on the first page.
    pub async fn retreat(&self) -> Result<FetchOutcome> {
        self.step(CursorManager::retreat).await
    }

    async fn step(&self, pick: fn(&CursorManager) -> Option<PageRequest>) -> Result<FetchOutcome> {
        let Ok(_guard) = self.fetch_lock.try_lock() else {
            debug!("Fetch in flight, ignoring page step");
            return Ok(FetchOutcome::Busy);
        };

        let (filters, sort, generation, request) = {
            let session = self.session();
            let Some(request) = pick(&session.cursors) else {
                return Ok(FetchOutcome::Unavailable);
            };
            (session.filters.clone(), session.sort, session.generation, request)
        };
        self.set_loading();

        let start_time = Instant::now();
        let plan = FilterPlanner::plan(&filters);
        let page = self
            .executor
            .fetch_page(&plan, &sort, Some(&request.cursor), request.direction)
            .await;

        let mut session = self.session();
        if session.generation != generation {
            info!(
                "Discarding page step for generation {} (current: {})",
                generation, session.generation
            );
            return Ok(FetchOutcome::Stale);
        }

        let raw = match page {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };
        if raw.channels.is_empty() && request.direction == Direction::Backward {
            // Already on the first page; keep its cursors and view
            drop(session);
            debug!("Nothing before the first record, staying on the current page");
            self.view.send_modify(|view| view.loading = false);
            return Ok(FetchOutcome::Unavailable);
        }
        session.cursors.record(&raw, &sort, Some(request.direction));
        // The count belongs to the filters, not the page
        let count = self.view.borrow().total_count;
        let view = self.build_view(raw, &filters, &plan, &session, count);
        drop(session);

        info!(
            "Published page {} ({} shown) in {:.2?}",
            view.page_number,
            view.channels.len(),
            start_time.elapsed()
        );
        self.view.send_replace(view);
        Ok(FetchOutcome::Published)
    }

    fn build_view(
        &self,
        raw: RawPage,
        filters: &FilterSpec,
        plan: &query::PlanResult,
        session: &Session,
        total_count: u64,
    ) -> PageView {
        PageView {
            channels: apply_residual(raw.channels, filters, plan),
            page_number: session.cursors.page_number(),
            total_count,
            total_pages: total_pages(total_count),
            has_next: raw.has_next,
            has_prev: raw.has_prev,
            loading: false,
            error: None,
            generation: session.generation,
        }
    }

    fn set_loading(&self) {
        self.view.send_modify(|view| view.loading = true);
    }

    /// Keep the prior page on screen, clear loading, record the failure
    fn fail(&self, e: query::QueryError) -> BrowseError {
        error!("Page fetch failed: {}", e);
        let message = e.to_string();
        self.view.send_modify(|view| {
            view.loading = false;
            view.error = Some(message);
        });
        BrowseError::Fetch(e)
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Snapshot of the latest published view
    pub fn view(&self) -> PageView {
        self.view.borrow().clone()
    }

    /// Receiver that is notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<PageView> {
        self.view.subscribe()
    }

    /// True while a spec change is waiting out its quiet period
    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Distinct category tags for the filter UI
    pub async fn categories(&self) -> Vec<String> {
        fetch_categories(self.store.as_ref(), &self.collection).await
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
