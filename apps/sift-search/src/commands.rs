use std::{sync::Arc, time::Duration};

use color_eyre::Result;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use sift_config::Config;
use sift_domain::CollectionRecord;
use sift_providers::{BackendClient, ListKind, listing};
use sift_service::{
	ListingSource, PageCache, SearchContext, SearchInput, SearchSession, SearchState,
	UnifiedSearch,
};

const CONTEXT_COLLECTIONS_LIMIT: u32 = 100;

pub async fn search(config: &Config, query: String) -> Result<()> {
	let client = BackendClient::new(config.backend.clone())?;
	let context = Arc::new(load_context(&client, config).await);
	let engine = UnifiedSearch::new(config, Arc::new(client));
	let outcome = engine.search(&SearchInput::new(query, context)).await;

	tracing::info!(path = outcome.path.as_str(), results = outcome.results.len(), "Search done.");
	println!("{}", serde_json::to_string_pretty(&outcome)?);

	Ok(())
}

pub async fn watch(config: &Config) -> Result<()> {
	let client = BackendClient::new(config.backend.clone())?;
	let context = Arc::new(load_context(&client, config).await);
	let engine = Arc::new(UnifiedSearch::new(config, Arc::new(client)));
	let session = SearchSession::spawn(engine.clone());
	let mut updates = session.subscribe();
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut last_query = None;
	let mut last_printed = None;

	loop {
		tokio::select! {
			line = lines.next_line() => {
				let Some(line) = line? else {
					break;
				};

				last_query = Some(line.clone());
				session.update(SearchInput::new(line, context.clone()));
			},
			changed = updates.changed() => {
				changed?;

				let state = updates.borrow_and_update().clone();

				emit(&state, &mut last_printed)?;
			},
		}
	}

	let Some(last_query) = last_query else {
		return Ok(());
	};
	// Three sequential tiers at most, each bounded by the client timeout.
	let deadline = engine.debounce_interval() + Duration::from_millis(config.backend.timeout_ms) * 3;
	let settled = tokio::time::timeout(
		deadline,
		updates.wait_for(|state| state.query == last_query && !state.is_searching),
	)
	.await;

	match settled {
		Ok(Ok(state)) => {
			let state = state.clone();

			emit(&state, &mut last_printed)?;
		},
		Ok(Err(err)) => tracing::warn!(error = %err, "Search session closed early."),
		Err(_) => tracing::warn!(query = %last_query, "Timed out waiting for the last query."),
	}

	Ok(())
}

pub async fn page(
	config: &Config,
	kind: ListKind,
	page: Option<u32>,
	page_size: Option<u32>,
) -> Result<()> {
	let client = BackendClient::new(config.backend.clone())?;
	let mut pagination = config.pagination.clone();

	if let Some(page) = page {
		pagination.initial_page = page;
	}
	if let Some(page_size) = page_size {
		pagination.page_size = page_size;
	}

	let source = ListingSource::<Value>::new(client, kind);
	let cache = PageCache::<Value>::new(kind.as_str(), Arc::new(source), pagination);

	cache.mount().await;
	cache.settle().await;

	let view = cache.view();

	tracing::info!(
		kind = kind.as_str(),
		page = view.current_page,
		total_items = view.total_items,
		"Page loaded."
	);
	println!("{}", serde_json::to_string_pretty(&view)?);

	Ok(())
}

/// Prints committed states once each; in-progress states are skipped.
fn emit(state: &SearchState, last_printed: &mut Option<SearchState>) -> Result<()> {
	if state.is_searching || last_printed.as_ref() == Some(state) {
		return Ok(());
	}

	println!("{}", serde_json::to_string(state)?);

	*last_printed = Some(state.clone());

	Ok(())
}

/// Recent documents and collections held locally for blank queries and the last-resort fallback.
///
/// Either list degrades to empty when the backend cannot serve it.
async fn load_context(client: &BackendClient, config: &Config) -> SearchContext {
	let documents = client.list_documents(0, config.search.fallback_list_limit).await;
	let collections = client.list(ListKind::Collections, 0, CONTEXT_COLLECTIONS_LIMIT).await;
	let mut recent_documents = documents.map(|page| page.items).unwrap_or_else(|err| {
		tracing::warn!(error = %err, "Failed to load recent documents.");

		Vec::new()
	});
	let collections = collections
		.map(|page| listing::decode_rows::<CollectionRecord>(page).items)
		.unwrap_or_else(|err| {
			tracing::warn!(error = %err, "Failed to load collections.");

			Vec::new()
		});

	recent_documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));

	SearchContext { recent_documents, collections }
}
