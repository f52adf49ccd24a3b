use std::sync::{
	Arc, Mutex,
	atomic::{AtomicU32, Ordering},
};

use tokio::sync::Notify;

use sift_config::Pagination;
use sift_domain::Page;
use sift_service::{BoxFuture, Error, FetchFn, PageCache, PageSource, Result};

struct Gate {
	offset: u32,
	started: Notify,
	release: Notify,
}

/// Rows are `base + index`; fetches at or past `fail_from` fail.
struct SpyPages {
	base: u32,
	total: u64,
	fail_from: AtomicU32,
	gate: Option<Gate>,
	calls: Mutex<Vec<(u32, u32)>>,
}
impl SpyPages {
	fn new(total: u64) -> Self {
		Self::with_base(0, total)
	}

	fn with_base(base: u32, total: u64) -> Self {
		Self {
			base,
			total,
			fail_from: AtomicU32::new(u32::MAX),
			gate: None,
			calls: Mutex::new(Vec::new()),
		}
	}

	fn gated(total: u64, offset: u32) -> Self {
		Self {
			gate: Some(Gate { offset, started: Notify::new(), release: Notify::new() }),
			..Self::new(total)
		}
	}

	fn gate(&self) -> &Gate {
		self.gate.as_ref().expect("Source has no gate.")
	}

	fn fail_from(&self, offset: u32) {
		self.fail_from.store(offset, Ordering::SeqCst);
	}

	fn calls(&self) -> Vec<(u32, u32)> {
		self.calls.lock().expect("Call log poisoned.").clone()
	}
}
impl PageSource<u32> for SpyPages {
	fn fetch_page(&self, offset: u32, limit: u32) -> BoxFuture<'_, Result<Page<u32>>> {
		self.calls.lock().expect("Call log poisoned.").push((offset, limit));

		Box::pin(async move {
			if let Some(gate) = self.gate.as_ref().filter(|gate| gate.offset == offset) {
				gate.started.notify_one();
				gate.release.notified().await;
			}
			if offset >= self.fail_from.load(Ordering::SeqCst) {
				return Err(Error::Backend { message: "listing unavailable".to_string() });
			}

			let end = (u64::from(offset) + u64::from(limit)).min(self.total);
			let items = (u64::from(offset)..end).map(|row| self.base + row as u32).collect();

			Ok(Page { items, total_count: self.total })
		})
	}
}

fn settings(initial_pages: u32, prefetch_threshold: Option<u32>) -> Pagination {
	Pagination { page_size: 10, initial_page: 1, initial_pages, prefetch_threshold }
}

fn new_cache(source: &Arc<SpyPages>, pagination: Pagination) -> PageCache<u32> {
	PageCache::<u32>::new("a", source.clone(), pagination)
}

fn rows(range: std::ops::Range<u32>) -> Vec<u32> {
	range.collect()
}

#[tokio::test]
async fn cached_page_is_served_without_fetching() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, None));

	assert_eq!(cache.mount().await, rows(0..10));
	assert_eq!(cache.go_to_page(2).await, rows(10..20));
	assert_eq!(cache.go_to_page(1).await, rows(0..10));
	assert_eq!(source.calls(), vec![(0, 10), (10, 10)]);

	let view = cache.view();

	assert_eq!(view.current_page, 1);
	assert_eq!(view.total_items, 35);
	assert_eq!(view.total_pages, 4);
	assert!(!view.loading);
}

#[tokio::test]
async fn loading_flag_tracks_the_foreground_fetch() {
	let source = Arc::new(SpyPages::gated(35, 0));
	let cache = Arc::new(new_cache(&source, settings(0, None)));
	let task = tokio::spawn({
		let cache = cache.clone();

		async move { cache.mount().await }
	});

	source.gate().started.notified().await;

	assert!(cache.view().loading);

	source.gate().release.notify_one();

	assert_eq!(task.await.expect("Page task panicked."), rows(0..10));
	assert!(!cache.view().loading);
}

#[tokio::test]
async fn switching_keys_drops_cached_pages() {
	let a = Arc::new(SpyPages::new(35));
	let b = Arc::new(SpyPages::with_base(1000, 12));
	let cache = new_cache(&a, settings(0, None));

	cache.mount().await;

	assert_eq!(cache.switch_key("b", b.clone()).await, rows(1000..1010));
	assert_eq!(cache.view().total_items, 12);

	cache.switch_key("a", a.clone()).await;

	assert_eq!(a.calls(), vec![(0, 10), (0, 10)]);
	assert_eq!(cache.view().total_items, 35);
}

#[tokio::test]
async fn switching_to_the_same_key_keeps_the_cache() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, None));

	cache.mount().await;

	assert_eq!(cache.switch_key("a", source.clone()).await, rows(0..10));
	assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn fetch_resolving_after_key_switch_is_discarded() {
	let a = Arc::new(SpyPages::gated(35, 0));
	let b = Arc::new(SpyPages::with_base(1000, 12));
	let cache = Arc::new(new_cache(&a, settings(0, None)));
	let stale = tokio::spawn({
		let cache = cache.clone();

		async move { cache.mount().await }
	});

	a.gate().started.notified().await;

	let fresh = cache.switch_key("b", b.clone()).await;

	a.gate().release.notify_one();
	stale.await.expect("Page task panicked.");

	let view = cache.view();

	assert_eq!(fresh, rows(1000..1010));
	assert_eq!(view.cache_key, "b");
	assert_eq!(view.items, fresh);
	assert_eq!(view.total_items, 12);
	assert!(!view.loading);
}

#[tokio::test]
async fn only_the_latest_foreground_request_updates_the_view() {
	let source = Arc::new(SpyPages::gated(35, 10));
	let cache = Arc::new(new_cache(&source, settings(0, None)));

	cache.mount().await;

	let slow = tokio::spawn({
		let cache = cache.clone();

		async move { cache.go_to_page(2).await }
	});

	source.gate().started.notified().await;

	let fast = cache.go_to_page(3).await;

	source.gate().release.notify_one();

	assert_eq!(slow.await.expect("Page task panicked."), rows(10..20));

	let view = cache.view();

	assert_eq!(fast, rows(20..30));
	assert_eq!(view.current_page, 3);
	assert_eq!(view.items, fast);
	assert!(!view.loading);
	assert!(cache.is_cached(2));
}

#[tokio::test]
async fn mount_warms_initial_pages_in_the_background() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(3, None));

	assert_eq!(cache.mount().await, rows(0..10));

	cache.settle().await;

	let mut calls = source.calls();

	calls.sort_unstable();

	assert_eq!(calls, vec![(0, 10), (10, 10), (20, 10)]);
	assert!((1..=3).all(|page| cache.is_cached(page)));
	assert!(!cache.is_cached(4));
	assert_eq!(cache.view().current_page, 1);
}

#[tokio::test]
async fn boundary_prefetch_stops_at_threshold_and_last_page() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, Some(1)));

	cache.mount().await;
	cache.settle().await;

	assert!(cache.is_cached(2));
	assert!(cache.is_cached(3));
	assert!(!cache.is_cached(4));

	cache.go_to_page(3).await;
	cache.settle().await;

	assert!(cache.is_cached(4));
	assert!(!cache.is_cached(5));
	assert_eq!(source.calls().len(), 4);
	assert!(!cache.view().loading);
}

#[tokio::test]
async fn foreground_failure_shows_an_empty_page() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, None));

	cache.mount().await;
	source.fail_from(10);

	assert!(cache.go_to_page(2).await.is_empty());

	let view = cache.view();

	assert!(view.items.is_empty());
	assert_eq!(view.total_items, 0);
	assert_eq!(view.current_page, 2);
	assert!(!view.loading);
	assert!(!cache.is_cached(2));
}

#[tokio::test]
async fn returning_to_a_cached_page_restores_its_total() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, None));

	cache.mount().await;
	source.fail_from(10);

	assert!(cache.go_to_page(2).await.is_empty());
	assert_eq!(cache.view().total_items, 0);
	assert_eq!(cache.go_to_page(1).await, rows(0..10));

	let view = cache.view();

	assert_eq!(view.items, rows(0..10));
	assert_eq!(view.total_items, 35);
	assert_eq!(view.total_pages, 4);
	assert_eq!(source.calls(), vec![(0, 10), (10, 10)]);
}

#[tokio::test]
async fn background_failure_keeps_the_known_total() {
	let source = Arc::new(SpyPages::new(35));

	source.fail_from(10);

	let cache = new_cache(&source, settings(0, Some(1)));

	assert_eq!(cache.mount().await, rows(0..10));

	cache.settle().await;

	let view = cache.view();

	assert_eq!(source.calls(), vec![(0, 10), (10, 10)]);
	assert_eq!(view.total_items, 35);
	assert_eq!(view.items, rows(0..10));
	assert!(!cache.is_cached(2));
}

#[tokio::test]
async fn page_size_change_keeps_the_first_visible_row() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, None));

	cache.mount().await;
	cache.go_to_page(3).await;

	assert_eq!(cache.set_page_size(5).await, rows(20..25));

	let view = cache.view();

	assert_eq!(view.page_size, 5);
	assert_eq!(view.current_page, 5);
	assert_eq!(view.total_pages, 7);
}

#[tokio::test]
async fn reload_fetches_the_current_page_again() {
	let source = Arc::new(SpyPages::new(35));
	let cache = new_cache(&source, settings(0, None));

	cache.mount().await;
	cache.reload().await;

	assert_eq!(source.calls(), vec![(0, 10), (0, 10)]);
}

#[tokio::test]
async fn closures_can_back_a_cache() {
	let source = FetchFn(|offset: u32, limit: u32| async move {
		Ok::<_, Error>(Page { items: vec![format!("{offset}+{limit}")], total_count: 1 })
	});
	let cache = PageCache::<String>::new("closure", Arc::new(source), settings(0, None));

	assert_eq!(cache.mount().await, vec!["0+10".to_string()]);
}
