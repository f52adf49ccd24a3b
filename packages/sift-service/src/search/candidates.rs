use std::collections::HashSet;

use sift_config::{CollectionScoring, Search};
use sift_domain::{ContentMatches, DocumentRecord, NormalizedQuery, SearchResultItem, ranking};

use super::SearchContext;

/// Turns one content search response plus the locally-held context into unranked candidates.
///
/// Order: passage documents, then matching collections, then graph results.
pub(crate) fn collect(
	matches: ContentMatches,
	context: &SearchContext,
	query: &NormalizedQuery,
	search: &Search,
	scoring: &CollectionScoring,
) -> Vec<SearchResultItem> {
	let ContentMatches { passages, graph } = matches;
	let mut seen_documents = HashSet::new();
	let mut candidates = Vec::with_capacity(passages.len() + graph.len());

	for passage in passages {
		if !seen_documents.insert(passage.document_id.clone()) {
			continue;
		}

		let document = find_document(&context.recent_documents, &passage.document_id).cloned();

		candidates.push(SearchResultItem::from_passage(
			passage,
			document,
			search.snippet_chars as usize,
		));
	}

	candidates.extend(context.collections.iter().filter_map(|collection| {
		ranking::collection_score(collection, query, scoring)
			.map(|score| SearchResultItem::from_collection(collection.clone(), score))
	}));
	candidates.extend(graph.into_iter().map(SearchResultItem::from_graph));

	candidates
}

/// Documents whose title or id contains the query, in input order, at most `limit`.
pub(crate) fn matching_documents<'a>(
	documents: impl IntoIterator<Item = &'a DocumentRecord>,
	query: &NormalizedQuery,
	limit: usize,
) -> Vec<SearchResultItem> {
	documents
		.into_iter()
		.filter(|document| {
			query.matches_any(document.title.as_deref().into_iter().chain([document.id.as_str()]))
		})
		.take(limit)
		.cloned()
		.map(SearchResultItem::from_document)
		.collect()
}

fn find_document<'a>(documents: &'a [DocumentRecord], id: &str) -> Option<&'a DocumentRecord> {
	documents.iter().find(|document| document.id == id)
}
