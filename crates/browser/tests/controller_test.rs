//! Integration tests for the page controller.
//!
//! The store double wraps a MemoryStore and can count calls, add latency
//! and fail on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use browser::{ControllerConfig, FetchOutcome, PageController};
use catalog::{Channel, ChannelStore, Constraint, MemoryStore, PageQuery, StoreError};
use query::{FilterPatch, FilterSpec, SortSpec};

// ============================================================================
// Test Fixtures
// ============================================================================

struct TestStore {
    inner: MemoryStore,
    page_calls: AtomicUsize,
    count_calls: AtomicUsize,
    latency: Duration,
    failing: AtomicBool,
}

impl TestStore {
    fn new(channels: Vec<Channel>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::with_channels("channels", channels),
            page_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            latency,
            failing: AtomicBool::new(false),
        })
    }

    fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChannelStore for TestStore {
    async fn query_page(&self, query: &PageQuery) -> catalog::Result<Vec<Channel>> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.query_page(query).await
    }

    async fn count_matching(&self, collection: &str, constraints: &[Constraint]) -> catalog::Result<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.count_matching(collection, constraints).await
    }
}

/// 40 channels, subscribers 10..=400, half monetized
fn build_channels() -> Vec<Channel> {
    (1..=40u64)
        .map(|id| Channel {
            id: id.into(),
            title: format!("Channel {id}"),
            subscribers: id * 10,
            avg_monthly_revenue: (id * 100) as f64,
            is_monetized: id % 2 == 0,
            categories: vec![if id % 3 == 0 { "Gaming" } else { "Music" }.to_string()],
            ..Default::default()
        })
        .collect()
}

fn build_controller(store: Arc<TestStore>) -> Arc<PageController> {
    PageController::new(store, ControllerConfig::default())
}

fn ids(channels: &[Channel]) -> Vec<u64> {
    channels.iter().map(|c| c.id.as_number().unwrap()).collect()
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_first_page_of_forty() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());

    assert_eq!(controller.refresh().await.unwrap(), FetchOutcome::Published);

    let view = controller.view();
    assert_eq!(view.channels.len(), 25);
    assert!(view.has_next);
    assert!(!view.has_prev);
    assert_eq!(view.total_count, 40);
    assert_eq!(view.total_pages, 2);
    assert_eq!(view.page_number, 1);
    assert!(!view.loading);
    assert_eq!(view.channels[0].id, 40u64);
}

#[tokio::test]
async fn test_advance_to_second_page() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();

    assert_eq!(controller.advance().await.unwrap(), FetchOutcome::Published);

    let view = controller.view();
    assert_eq!(view.channels.len(), 15);
    assert!(!view.has_next);
    assert!(view.has_prev);
    assert_eq!(view.page_number, 2);
    assert_eq!(view.total_count, 40);

    // Paging does not recount
    assert_eq!(store.count_calls(), 1);
}

#[tokio::test]
async fn test_paging_past_either_end_is_a_no_op() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();

    assert_eq!(controller.retreat().await.unwrap(), FetchOutcome::Unavailable);

    controller.advance().await.unwrap();
    assert_eq!(controller.advance().await.unwrap(), FetchOutcome::Unavailable);
    assert_eq!(controller.view().page_number, 2);
    assert_eq!(store.page_calls(), 2);
}

#[tokio::test]
async fn test_retreat_returns_to_first_page() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store);
    controller.refresh().await.unwrap();
    let first = controller.view();

    controller.advance().await.unwrap();
    assert_eq!(controller.retreat().await.unwrap(), FetchOutcome::Published);

    let view = controller.view();
    assert_eq!(view.page_number, 1);
    assert_eq!(ids(&view.channels), ids(&first.channels));
    // Reached through a cursor, so a previous page is still offered
    assert!(view.has_prev);
    assert!(view.has_next);
}

#[tokio::test]
async fn test_retreat_past_first_page_keeps_current_page() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();
    controller.advance().await.unwrap();
    controller.retreat().await.unwrap();
    let first = controller.view();

    assert_eq!(controller.retreat().await.unwrap(), FetchOutcome::Unavailable);

    let view = controller.view();
    assert_eq!(view.channels, first.channels);
    assert_eq!(view.page_number, 1);
    assert!(view.has_next);
    assert!(!view.loading);

    // The session can still move forward
    assert_eq!(controller.advance().await.unwrap(), FetchOutcome::Published);
    let second = controller.view();
    assert_eq!(second.page_number, 2);
    assert_eq!(second.channels.len(), 15);
}

#[tokio::test]
async fn test_residual_filters_shape_displayed_page() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let filters = FilterSpec {
        min_revenue: Some(1000.0),
        min_subscribers: Some(300),
        categories: vec!["Gaming".to_string()],
        ..Default::default()
    };
    let controller = PageController::with_specs(store, ControllerConfig::default(), filters, SortSpec::default());

    controller.refresh().await.unwrap();
    let view = controller.view();

    // Count reflects only the pushed revenue range: ids 10..=40
    assert_eq!(view.total_count, 31);
    assert_eq!(ids(&view.channels), vec![39, 36, 33, 30]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_fetch_failure_keeps_prior_page() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();
    let before = controller.view();

    store.set_failing(true);
    assert!(controller.advance().await.is_err());

    let view = controller.view();
    assert_eq!(view.channels, before.channels);
    assert_eq!(view.page_number, 1);
    assert!(!view.loading);
    assert!(view.error.is_some());

    store.set_failing(false);
    controller.refresh().await.unwrap();
    assert!(controller.view().error.is_none());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_page_step_rejected_while_fetching() {
    let store = TestStore::new(build_channels(), Duration::from_millis(100));
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();

    let in_flight = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(controller.advance().await.unwrap(), FetchOutcome::Busy);
    assert_eq!(in_flight.await.unwrap().unwrap(), FetchOutcome::Published);
    assert_eq!(controller.advance().await.unwrap(), FetchOutcome::Published);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_trigger_one_fetch() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());

    for min in [50, 100, 150, 200, 250] {
        controller.update_filters(FilterPatch {
            min_subscribers: Some(Some(min)),
            ..Default::default()
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(controller.is_debouncing());

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(store.page_calls(), 1);
    assert_eq!(store.count_calls(), 1);
    let view = controller.view();
    assert_eq!(view.total_count, 16);
    assert_eq!(view.generation, 5);
}

#[tokio::test(start_paused = true)]
async fn test_only_latest_filters_are_published() {
    let store = TestStore::new(build_channels(), Duration::from_millis(100));
    let controller = build_controller(store.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut rx = controller.subscribe();
    tokio::spawn({
        let seen = seen.clone();
        async move {
            while rx.changed().await.is_ok() {
                let view = rx.borrow_and_update().clone();
                if !view.loading {
                    seen.lock().unwrap().push(view.generation);
                }
            }
        }
    });

    // First edit: its fetch starts at 300ms and resolves at 400ms
    controller.set_filters(FilterSpec {
        is_monetized: Some(true),
        ..Default::default()
    });
    tokio::time::sleep(Duration::from_millis(350)).await;

    // Second edit lands while the first fetch is in flight
    controller.set_filters(FilterSpec {
        is_monetized: Some(false),
        ..Default::default()
    });
    tokio::time::sleep(Duration::from_secs(1)).await;

    let view = controller.view();
    assert_eq!(view.generation, 2);
    assert_eq!(view.total_count, 20);
    assert!(view.channels.iter().all(|c| !c.is_monetized));
    assert_eq!(store.page_calls(), 2);
    assert!(!seen.lock().unwrap().contains(&1));
}

#[tokio::test(start_paused = true)]
async fn test_reset_reproduces_first_page() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();
    let first = controller.view();

    controller.advance().await.unwrap();
    controller.reset();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let view = controller.view();
    assert_eq!(view.page_number, 1);
    assert_eq!(view.channels, first.channels);
    assert_eq!(view.has_next, first.has_next);
    assert_eq!(view.total_count, first.total_count);
}

#[tokio::test(start_paused = true)]
async fn test_sort_toggle_resets_paging() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store.clone());
    controller.refresh().await.unwrap();
    controller.advance().await.unwrap();

    controller.toggle_sort(catalog::SortField::Subscribers);
    // Cursors are gone as soon as the sort changes
    assert_eq!(controller.retreat().await.unwrap(), FetchOutcome::Unavailable);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let view = controller.view();
    assert_eq!(view.page_number, 1);
    assert_eq!(view.channels[0].id, 1u64);
}

#[tokio::test]
async fn test_categories_from_store() {
    let store = TestStore::new(build_channels(), Duration::ZERO);
    let controller = build_controller(store);
    assert_eq!(controller.categories().await, vec!["Gaming", "Music"]);
}
