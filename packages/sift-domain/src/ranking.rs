use std::{
	cmp::Ordering,
	collections::{HashMap, HashSet},
};

use sift_config::{CollectionScoring, Ranking};

use crate::{
	item::{ResultKind, SearchResultItem},
	record::CollectionRecord,
	text::{self, NormalizedQuery, TextMatch},
};

pub fn kind_weight(kind: ResultKind, cfg: &Ranking) -> f32 {
	let weights = &cfg.kind_weights;

	match kind {
		ResultKind::Document => weights.document,
		ResultKind::Collection => weights.collection,
		ResultKind::Entity => weights.entity,
		ResultKind::Relationship => weights.relationship,
		ResultKind::Community => weights.community,
	}
}

pub fn title_match_bonus(title: &str, query: &NormalizedQuery, cfg: &Ranking) -> f32 {
	match query.match_text(title) {
		Some(TextMatch::Exact) => cfg.title_match.exact,
		Some(TextMatch::Prefix) => cfg.title_match.prefix,
		Some(TextMatch::Substring) => cfg.title_match.substring,
		None => 0.0,
	}
}

/// Composite priority used for ordering and selection.
pub fn priority(item: &SearchResultItem, query: &NormalizedQuery, cfg: &Ranking) -> f32 {
	let mut priority = kind_weight(item.kind(), cfg);

	if let Some(score) = item.score {
		priority += score * cfg.score_weight;
	}

	priority += title_match_bonus(&item.title, query, cfg);

	if item
		.description
		.as_deref()
		.map(|description| text::char_len(description) > cfg.description_min_chars as usize)
		.unwrap_or(false)
	{
		priority += cfg.description_bonus;
	}
	if item.title != item.id && text::char_len(&item.title) > cfg.named_title_min_chars as usize {
		priority += cfg.named_title_bonus;
	}
	if let Some(document) = item.document() {
		if document.is_ingested() {
			priority += cfg.ingestion_success_bonus;
		}
		if document.is_extracted() {
			priority += cfg.extraction_success_bonus;
		}
	}

	priority
}

/// Assigns priorities and sorts descending; equal priorities keep their input order.
pub fn rank(
	mut items: Vec<SearchResultItem>,
	query: &NormalizedQuery,
	cfg: &Ranking,
) -> Vec<SearchResultItem> {
	for item in &mut items {
		item.priority = Some(priority(item, query, cfg));
	}

	items.sort_by(|a, b| cmp_priority_desc(a.priority, b.priority));

	items
}

pub fn cmp_priority_desc(a: Option<f32>, b: Option<f32>) -> Ordering {
	let a = a.unwrap_or(f32::NEG_INFINITY);
	let b = b.unwrap_or(f32::NEG_INFINITY);

	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Drops repeated `(kind, id)` pairs, keeping the first occurrence.
pub fn dedup(items: Vec<SearchResultItem>) -> Vec<SearchResultItem> {
	let mut seen = HashSet::new();

	items.into_iter().filter(|item| seen.insert((item.kind(), item.id.clone()))).collect()
}

/// Picks at most `max_results` items from a ranked list.
///
/// The first pass admits at most `per_kind_cap` items of each kind; remaining slots are then
/// filled from the leftovers in rank order regardless of kind.
pub fn select_diverse(
	ranked: Vec<SearchResultItem>,
	max_results: usize,
	per_kind_cap: usize,
) -> Vec<SearchResultItem> {
	if ranked.is_empty() || max_results == 0 {
		return Vec::new();
	}

	let mut per_kind: HashMap<ResultKind, usize> = HashMap::new();
	let mut picked = vec![false; ranked.len()];
	let mut order = Vec::with_capacity(max_results.min(ranked.len()));

	for (idx, item) in ranked.iter().enumerate() {
		if order.len() >= max_results {
			break;
		}

		let count = per_kind.entry(item.kind()).or_default();

		if *count < per_kind_cap {
			*count += 1;
			picked[idx] = true;
			order.push(idx);
		}
	}
	for idx in 0..ranked.len() {
		if order.len() >= max_results {
			break;
		}
		if !picked[idx] {
			picked[idx] = true;
			order.push(idx);
		}
	}

	let mut slots: Vec<Option<SearchResultItem>> = ranked.into_iter().map(Some).collect();

	order.into_iter().filter_map(|idx| slots[idx].take()).collect()
}

/// Local relevance of a collection, or `None` when neither its name nor id contains the query.
pub fn collection_score(
	collection: &CollectionRecord,
	query: &NormalizedQuery,
	cfg: &CollectionScoring,
) -> Option<f32> {
	let name_match = query.match_text(&collection.name);

	if name_match.is_none() && query.match_text(&collection.id).is_none() {
		return None;
	}

	let base = match name_match {
		Some(TextMatch::Exact) => cfg.exact,
		Some(TextMatch::Prefix) => cfg.prefix,
		_ => cfg.substring,
	};
	let bonus = if collection.has_description() { cfg.description_bonus } else { 0.0 };

	Some((base + bonus).min(1.0))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::record::DocumentRecord;

	fn collection(name: &str, description: Option<&str>) -> CollectionRecord {
		CollectionRecord {
			id: format!("col-{}", name.to_lowercase()),
			name: name.to_string(),
			description: description.map(str::to_string),
		}
	}

	#[test]
	fn collection_scores_follow_match_strength() {
		let cfg = CollectionScoring::default();
		let reports = collection("Reports", None);

		assert_eq!(collection_score(&reports, &NormalizedQuery::new("Reports"), &cfg), Some(1.0));
		assert_eq!(collection_score(&reports, &NormalizedQuery::new("Rep"), &cfg), Some(0.8));
		assert_eq!(collection_score(&reports, &NormalizedQuery::new("ort"), &cfg), Some(0.6));
		assert_eq!(collection_score(&reports, &NormalizedQuery::new("budget"), &cfg), None);
	}

	#[test]
	fn collection_id_match_scores_as_substring() {
		let cfg = CollectionScoring::default();
		let record = CollectionRecord {
			id: "c-7781".to_string(),
			name: "Finance".to_string(),
			description: Some("Quarterly numbers".to_string()),
		};
		let score = collection_score(&record, &NormalizedQuery::new("7781"), &cfg)
			.expect("Id match must score.");

		assert!((score - 0.7).abs() < 1e-6, "Unexpected score: {score}");
	}

	#[test]
	fn described_exact_collection_is_capped_at_one() {
		let cfg = CollectionScoring::default();
		let record = collection("Reports", Some("All reporting"));

		assert_eq!(collection_score(&record, &NormalizedQuery::new("reports"), &cfg), Some(1.0));
	}

	#[test]
	fn priority_adds_document_status_bonuses() {
		let cfg = Ranking::default();
		let mut document = DocumentRecord::new("doc-1");

		document.title = Some("Roadmap".to_string());
		document.ingestion_status = Some("success".to_string());
		document.extraction_status = Some("success".to_string());

		let item = SearchResultItem::from_document(document);
		let value = priority(&item, &NormalizedQuery::new("road"), &cfg);

		// kind 100 + prefix 20 + named title 5 + ingestion 10 + extraction 5
		assert_eq!(value, 140.0);
	}

	#[test]
	fn bare_identifier_titles_get_no_name_bonus() {
		let cfg = Ranking::default();
		let item = SearchResultItem::from_document(DocumentRecord::new("doc-1"));

		assert_eq!(priority(&item, &NormalizedQuery::new("zzz"), &cfg), 100.0);
	}

	#[test]
	fn dedup_keeps_first_occurrence_per_kind_and_id() {
		let mut first = DocumentRecord::new("same");
		let mut second = DocumentRecord::new("same");

		first.title = Some("first".to_string());
		second.title = Some("second".to_string());

		let collection_with_same_id = SearchResultItem::from_collection(
			CollectionRecord { id: "same".to_string(), name: "Same".to_string(), description: None },
			0.6,
		);
		let items = dedup(vec![
			SearchResultItem::from_document(first),
			SearchResultItem::from_document(second),
			collection_with_same_id,
		]);

		assert_eq!(items.len(), 2);
		assert_eq!(items[0].title, "first");
		assert_eq!(items[1].kind(), ResultKind::Collection);
	}
}
