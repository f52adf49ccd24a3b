mod candidates;
mod session;

pub use session::SearchSession;

use std::{
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use serde::Serialize;
use tokio::sync::watch;

use sift_config::{CollectionScoring, Config, Ranking, Search};
use sift_domain::{CollectionRecord, DocumentRecord, NormalizedQuery, SearchResultItem, ranking};
use sift_providers::SearchOptions;

use crate::{Result, SearchBackend};

/// Locally-held data the search blends in without a network call.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
	/// Most recent documents, newest first.
	pub recent_documents: Vec<DocumentRecord>,
	pub collections: Vec<CollectionRecord>,
}

#[derive(Debug, Clone)]
pub struct SearchInput {
	pub query: String,
	/// Whether any consumer is currently showing results. When false, nothing is fetched.
	pub wants_results: bool,
	pub context: Arc<SearchContext>,
}
impl SearchInput {
	pub fn new(query: impl Into<String>, context: Arc<SearchContext>) -> Self {
		Self { query: query.into(), wants_results: true, context }
	}
}

/// What consumers observe. Only the newest query may write it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
	pub query: String,
	pub results: Vec<SearchResultItem>,
	pub is_searching: bool,
}

/// Which path produced a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPath {
	/// The caller did not want results.
	Disabled,
	/// Blank query; the locally-held recent documents were shown.
	Recent,
	Primary,
	DocumentListing,
	RecentDocuments,
}
impl SearchPath {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Disabled => "disabled",
			Self::Recent => "recent",
			Self::Primary => "primary",
			Self::DocumentListing => "document_listing",
			Self::RecentDocuments => "recent_documents",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
	pub path: SearchPath,
	pub results: Vec<SearchResultItem>,
}

/// A submitted query that still needs a network round trip.
#[derive(Debug, Clone)]
pub struct SearchTicket {
	seq: u64,
	input: SearchInput,
}
impl SearchTicket {
	pub fn seq(&self) -> u64 {
		self.seq
	}

	pub fn query(&self) -> &str {
		&self.input.query
	}
}

#[derive(Debug, Clone)]
pub enum Submission {
	/// The query was answered locally and the state already reflects it.
	Resolved,
	Pending(SearchTicket),
}

/// Unified search over documents, collections and graph results.
///
/// Every submission takes a fresh sequence number. A result is committed to the shared state only
/// when its number is still the newest one, so a slow response for an old query can never
/// overwrite the answer to a newer one.
pub struct UnifiedSearch {
	backend: Arc<dyn SearchBackend>,
	search: Search,
	ranking: Ranking,
	scoring: CollectionScoring,
	options: SearchOptions,
	latest: AtomicU64,
	state: watch::Sender<SearchState>,
}
impl UnifiedSearch {
	pub fn new(cfg: &Config, backend: Arc<dyn SearchBackend>) -> Self {
		Self::with_settings(
			cfg.search.clone(),
			cfg.ranking.clone(),
			cfg.collections.clone(),
			backend,
		)
	}

	pub fn with_settings(
		search: Search,
		ranking: Ranking,
		scoring: CollectionScoring,
		backend: Arc<dyn SearchBackend>,
	) -> Self {
		let options = SearchOptions::from_config(&search);
		let (state, _) = watch::channel(SearchState::default());

		Self { backend, search, ranking, scoring, options, latest: AtomicU64::new(0), state }
	}

	pub fn debounce_interval(&self) -> Duration {
		Duration::from_millis(self.search.debounce_ms)
	}

	pub fn subscribe(&self) -> watch::Receiver<SearchState> {
		self.state.subscribe()
	}

	pub fn state(&self) -> SearchState {
		self.state.borrow().clone()
	}

	/// Registers `input` as the newest query.
	///
	/// Inputs that need no network call are committed right away. Everything else comes back as
	/// a ticket for [`UnifiedSearch::execute`], normally after debouncing.
	pub fn submit(&self, input: SearchInput) -> Submission {
		let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

		match self.local_outcome(&input) {
			Some(outcome) => {
				self.commit(seq, &input.query, outcome);

				Submission::Resolved
			},
			None => Submission::Pending(SearchTicket { seq, input }),
		}
	}

	/// Runs a ticket. Returns whether its results were committed.
	pub async fn execute(&self, ticket: SearchTicket) -> bool {
		if !self.is_latest(ticket.seq) {
			tracing::debug!(seq = ticket.seq, "Dropping superseded query before fetch.");

			return false;
		}

		self.state.send_if_modified(|state| {
			if !self.is_latest(ticket.seq) {
				return false;
			}

			state.is_searching = true;

			true
		});

		let outcome = self.search(&ticket.input).await;
		let committed = self.commit(ticket.seq, &ticket.input.query, outcome);

		if !committed {
			tracing::debug!(seq = ticket.seq, "Discarding results for a superseded query.");
		}

		committed
	}

	/// Runs the full pipeline for one input without touching the shared state.
	pub async fn search(&self, input: &SearchInput) -> SearchOutcome {
		if let Some(outcome) = self.local_outcome(input) {
			return outcome;
		}

		let query = NormalizedQuery::new(&input.query);

		match self.primary(&query, &input.context).await {
			Ok(results) => {
				tracing::debug!(
					tier = SearchPath::Primary.as_str(),
					results = results.len(),
					"Search completed."
				);

				return SearchOutcome { path: SearchPath::Primary, results };
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					tier = SearchPath::Primary.as_str(),
					"Search tier failed. Falling back to document listing."
				);
			},
		}

		match self.document_listing(&query).await {
			Ok(results) => {
				tracing::debug!(
					tier = SearchPath::DocumentListing.as_str(),
					results = results.len(),
					"Search completed."
				);

				return SearchOutcome { path: SearchPath::DocumentListing, results };
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					tier = SearchPath::DocumentListing.as_str(),
					"Search tier failed. Falling back to recent documents."
				);
			},
		}

		let results = candidates::matching_documents(
			&input.context.recent_documents,
			&query,
			self.search.local_fallback_max_results as usize,
		);

		SearchOutcome { path: SearchPath::RecentDocuments, results }
	}

	fn local_outcome(&self, input: &SearchInput) -> Option<SearchOutcome> {
		if !input.wants_results {
			return Some(SearchOutcome { path: SearchPath::Disabled, results: Vec::new() });
		}
		if !NormalizedQuery::new(&input.query).is_blank() {
			return None;
		}

		let results = input
			.context
			.recent_documents
			.iter()
			.take(self.search.recent_limit as usize)
			.cloned()
			.map(SearchResultItem::from_document)
			.collect();

		Some(SearchOutcome { path: SearchPath::Recent, results })
	}

	async fn primary(
		&self,
		query: &NormalizedQuery,
		context: &SearchContext,
	) -> Result<Vec<SearchResultItem>> {
		let matches = self.backend.content_search(query.as_str(), &self.options).await?;
		let candidates = candidates::collect(matches, context, query, &self.search, &self.scoring);
		let ranked = ranking::rank(ranking::dedup(candidates), query, &self.ranking);

		Ok(ranking::select_diverse(
			ranked,
			self.search.max_results as usize,
			self.search.per_kind_cap as usize,
		))
	}

	async fn document_listing(&self, query: &NormalizedQuery) -> Result<Vec<SearchResultItem>> {
		let page = self.backend.list_documents(0, self.search.fallback_list_limit).await?;

		Ok(candidates::matching_documents(
			&page.items,
			query,
			self.search.fallback_max_results as usize,
		))
	}

	fn is_latest(&self, seq: u64) -> bool {
		self.latest.load(Ordering::SeqCst) == seq
	}

	fn commit(&self, seq: u64, query: &str, outcome: SearchOutcome) -> bool {
		self.state.send_if_modified(|state| {
			if !self.is_latest(seq) {
				return false;
			}

			*state = SearchState {
				query: query.to_string(),
				results: outcome.results,
				is_searching: false,
			};

			true
		})
	}
}
