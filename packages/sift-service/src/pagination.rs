//! Keyed page cache with background warmup and boundary prefetch.
//!
//! Pages live under `(page_size, page)` for the current cache key. Switching the key bumps a
//! generation counter and drops every cached page, so a fetch that lands afterwards is discarded
//! instead of leaking rows from the previous collection. Each page keeps the total reported with
//! it, and showing a cached page restores that total. Fetch failures never reach the caller: the
//! page degrades to empty and the error is logged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use tokio::task::JoinHandle;

use sift_config::Pagination;

use crate::PageSource;

type PageKey = (u32, u32);

/// Snapshot of what a paged view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
	pub cache_key: String,
	pub items: Vec<T>,
	pub current_page: u32,
	pub page_size: u32,
	pub total_pages: u32,
	pub total_items: u64,
	/// Set only while a foreground fetch is pending.
	pub loading: bool,
}

pub struct PageCache<T> {
	shared: Arc<Shared<T>>,
}
impl<T> PageCache<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new(
		cache_key: impl Into<String>,
		source: Arc<dyn PageSource<T>>,
		settings: Pagination,
	) -> Self {
		let state = CacheState {
			cache_key: cache_key.into(),
			source,
			generation: 0,
			page_size: settings.page_size.max(1),
			pages: AHashMap::new(),
			in_flight: AHashSet::new(),
			current_page: settings.initial_page.max(1),
			items: Arc::new(Vec::new()),
			total_count: 0,
			loading: false,
			foreground: 0,
		};

		Self {
			shared: Arc::new(Shared {
				settings,
				state: Mutex::new(state),
				background: Mutex::new(Vec::new()),
			}),
		}
	}

	/// Loads the initial page in the foreground and warms the configured pages behind it.
	pub async fn mount(&self) -> Vec<T> {
		self.shared.spawn_warmup();

		let page = self.shared.lock().current_page;

		self.shared.show_page(page).await
	}

	/// Shows page `page` (1-based), from cache when possible.
	pub async fn go_to_page(&self, page: u32) -> Vec<T> {
		self.shared.show_page(page).await
	}

	/// Rebinds the cache to another collection and mounts it from the initial page.
	///
	/// A no-op returning the current items when `cache_key` is unchanged.
	pub async fn switch_key(
		&self,
		cache_key: impl Into<String>,
		source: Arc<dyn PageSource<T>>,
	) -> Vec<T> {
		let cache_key = cache_key.into();

		{
			let mut state = self.shared.lock();

			if state.cache_key == cache_key {
				return state.items.to_vec();
			}

			tracing::debug!(from = %state.cache_key, to = %cache_key, "Switching page cache key.");
			state.reset(cache_key, source, self.shared.settings.initial_page);
		}

		self.mount().await
	}

	/// Changes the page size, keeping the first visible row on screen.
	///
	/// Pages fetched under other sizes stay cached.
	pub async fn set_page_size(&self, page_size: u32) -> Vec<T> {
		let page_size = page_size.max(1);
		let page = {
			let mut state = self.shared.lock();

			if state.page_size == page_size {
				state.current_page
			} else {
				let first_row = page_offset(state.current_page, state.page_size);

				state.page_size = page_size;

				first_row / page_size + 1
			}
		};

		self.shared.show_page(page).await
	}

	/// Drops the current page from the cache and fetches it again.
	pub async fn reload(&self) -> Vec<T> {
		let page = {
			let mut state = self.shared.lock();
			let key = (state.page_size, state.current_page);

			state.pages.remove(&key);

			state.current_page
		};

		self.shared.show_page(page).await
	}

	pub fn view(&self) -> PageView<T> {
		let state = self.shared.lock();

		PageView {
			cache_key: state.cache_key.clone(),
			items: state.items.to_vec(),
			current_page: state.current_page,
			page_size: state.page_size,
			total_pages: total_pages(state.total_count, state.page_size),
			total_items: state.total_count,
			loading: state.loading,
		}
	}

	pub fn is_cached(&self, page: u32) -> bool {
		let state = self.shared.lock();

		state.pages.contains_key(&(state.page_size, page))
	}

	/// Waits until no background fetch is running, including prefetches they trigger.
	pub async fn settle(&self) {
		loop {
			let tasks = std::mem::take(&mut *self.shared.tasks());

			if tasks.is_empty() {
				return;
			}

			for task in tasks {
				if let Err(err) = task.await {
					tracing::warn!(error = %err, "Background page task failed.");
				}
			}
		}
	}
}

struct Shared<T> {
	settings: Pagination,
	state: Mutex<CacheState<T>>,
	background: Mutex<Vec<JoinHandle<()>>>,
}
impl<T> Shared<T>
where
	T: Clone + Send + Sync + 'static,
{
	fn lock(&self) -> MutexGuard<'_, CacheState<T>> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
		self.background.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn track(&self, task: JoinHandle<()>) {
		let mut tasks = self.tasks();

		tasks.retain(|task| !task.is_finished());
		tasks.push(task);
	}

	async fn show_page(self: &Arc<Self>, page: u32) -> Vec<T> {
		let page = page.max(1);
		let request = {
			let mut state = self.lock();

			state.foreground += 1;
			state.current_page = page;

			let cached = state.pages.get(&(state.page_size, page)).cloned();

			match cached {
				Some(entry) => {
					tracing::debug!(cache_key = %state.cache_key, page, "Page cache hit.");

					state.items = entry.items.clone();
					state.total_count = entry.total_count;
					state.loading = false;

					Lookup::Hit(entry.items)
				},
				None => {
					state.loading = true;

					Lookup::Miss(state.request())
				},
			}
		};
		let request = match request {
			Lookup::Hit(items) => {
				self.schedule_prefetch();

				return items.to_vec();
			},
			Lookup::Miss(request) => request,
		};
		let result =
			request.source.fetch_page(page_offset(page, request.page_size), request.page_size).await;
		let (items, cached) = {
			let mut state = self.lock();
			let same_key = state.generation == request.generation;
			let visible = same_key && state.foreground == request.foreground;

			match result {
				Ok(fetched) => {
					let items = Arc::new(fetched.items);

					if same_key {
						state.pages.insert(
							(request.page_size, page),
							CachedPage { items: items.clone(), total_count: fetched.total_count },
						);
						state.total_count = fetched.total_count;
					} else {
						tracing::debug!(page, "Discarding page fetched for a previous cache key.");
					}
					if visible {
						state.items = items.clone();
						state.loading = false;
					}

					(items, same_key)
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						cache_key = %state.cache_key,
						page,
						"Page fetch failed. Showing an empty page."
					);

					if visible {
						state.items = Arc::new(Vec::new());
						state.total_count = 0;
						state.loading = false;
					}

					(Arc::new(Vec::new()), false)
				},
			}
		};

		if cached {
			self.schedule_prefetch();
		}

		items.to_vec()
	}

	fn spawn_warmup(self: &Arc<Self>) {
		let pages = self.settings.initial_pages;

		if pages == 0 {
			return;
		}

		let (generation, foreground_page) = {
			let state = self.lock();

			(state.generation, state.current_page)
		};
		let shared = self.clone();

		self.track(tokio::spawn(async move {
			for page in (1..=pages).filter(|page| *page != foreground_page) {
				let Some(request) = shared.lock().claim(generation, page) else {
					continue;
				};

				shared.fetch_background(request, page).await;
			}
		}));
	}

	fn schedule_prefetch(self: &Arc<Self>) {
		let Some(threshold) = self.settings.prefetch_threshold else {
			return;
		};
		let (request, page) = {
			let mut state = self.lock();
			let page_size = state.page_size;

			if !state.pages.contains_key(&(page_size, state.current_page)) {
				return;
			}

			let Some(highest) =
				state.pages.keys().filter(|(size, _)| *size == page_size).map(|(_, page)| *page).max()
			else {
				return;
			};

			if highest.saturating_sub(state.current_page) > threshold {
				return;
			}

			let Some(next) = highest.checked_add(1) else {
				return;
			};

			if next > total_pages(state.total_count, page_size) {
				return;
			}

			let generation = state.generation;
			let Some(request) = state.claim(generation, next) else {
				return;
			};

			(request, next)
		};
		let shared = self.clone();

		tracing::debug!(page, "Prefetching next page.");
		self.track(tokio::spawn(async move {
			shared.fetch_background(request, page).await;
		}));
	}

	async fn fetch_background(self: &Arc<Self>, request: FetchRequest<T>, page: u32) {
		let result =
			request.source.fetch_page(page_offset(page, request.page_size), request.page_size).await;

		{
			let mut state = self.lock();

			if state.generation != request.generation {
				return;
			}

			state.in_flight.remove(&(request.page_size, page));

			match result {
				Ok(fetched) => {
					state.pages.insert(
						(request.page_size, page),
						CachedPage {
							items: Arc::new(fetched.items),
							total_count: fetched.total_count,
						},
					);
					state.total_count = fetched.total_count;
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						cache_key = %state.cache_key,
						page,
						"Background page fetch failed."
					);

					return;
				},
			}
		}

		self.schedule_prefetch();
	}
}

struct CacheState<T> {
	cache_key: String,
	source: Arc<dyn PageSource<T>>,
	generation: u64,
	page_size: u32,
	pages: AHashMap<PageKey, CachedPage<T>>,
	/// Background fetches only; foreground fetches are tracked by `foreground`.
	in_flight: AHashSet<PageKey>,
	current_page: u32,
	items: Arc<Vec<T>>,
	total_count: u64,
	loading: bool,
	foreground: u64,
}
impl<T> CacheState<T> {
	fn request(&self) -> FetchRequest<T> {
		FetchRequest {
			source: self.source.clone(),
			generation: self.generation,
			foreground: self.foreground,
			page_size: self.page_size,
		}
	}

	/// Reserves `page` for a background fetch unless it is cached, in flight, past the known
	/// end, or belongs to an older generation.
	fn claim(&mut self, generation: u64, page: u32) -> Option<FetchRequest<T>> {
		let key = (self.page_size, page);

		if self.generation != generation || self.pages.contains_key(&key) {
			return None;
		}
		if self.total_count > 0 && page > total_pages(self.total_count, self.page_size) {
			return None;
		}
		if !self.in_flight.insert(key) {
			return None;
		}

		Some(self.request())
	}

	fn reset(&mut self, cache_key: String, source: Arc<dyn PageSource<T>>, initial_page: u32) {
		self.cache_key = cache_key;
		self.source = source;
		self.generation += 1;
		self.pages.clear();
		self.in_flight.clear();
		self.current_page = initial_page.max(1);
		self.items = Arc::new(Vec::new());
		self.total_count = 0;
		self.loading = false;
		self.foreground += 1;
	}
}

/// Rows of one page plus the server total reported with them.
struct CachedPage<T> {
	items: Arc<Vec<T>>,
	total_count: u64,
}
impl<T> Clone for CachedPage<T> {
	fn clone(&self) -> Self {
		Self { items: self.items.clone(), total_count: self.total_count }
	}
}

struct FetchRequest<T> {
	source: Arc<dyn PageSource<T>>,
	generation: u64,
	foreground: u64,
	page_size: u32,
}

enum Lookup<T> {
	Hit(Arc<Vec<T>>),
	Miss(FetchRequest<T>),
}

fn page_offset(page: u32, page_size: u32) -> u32 {
	page.saturating_sub(1).saturating_mul(page_size)
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
	if page_size == 0 {
		return 0;
	}

	u32::try_from(total_count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}
