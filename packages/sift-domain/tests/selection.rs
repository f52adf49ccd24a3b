use sift_config::Ranking;
use sift_domain::{
	GraphEntity, GraphMatch, GraphRecord, NormalizedQuery, ResultKind, SearchResultItem, ranking,
};

fn entity(id: &str, name: &str, score: f32) -> SearchResultItem {
	SearchResultItem::from_graph(GraphMatch {
		record: GraphRecord::Entity(GraphEntity {
			id: id.to_string(),
			name: Some(name.to_string()),
			description: None,
			category: None,
		}),
		score: Some(score),
	})
}

fn kinds(items: &[SearchResultItem]) -> Vec<ResultKind> {
	items.iter().map(SearchResultItem::kind).collect()
}

#[test]
fn higher_score_never_ranks_below_lower_score() {
	let cfg = Ranking::default();
	let query = NormalizedQuery::new("acme");
	let ranked = ranking::rank(
		vec![
			entity("e1", "Acme Labs", 0.2),
			entity("e2", "Acme Corp", 0.9),
			entity("e3", "Acme Group", 0.5),
		],
		&query,
		&cfg,
	);
	let ids: Vec<&str> = ranked.iter().map(|item| item.id.as_str()).collect();

	assert_eq!(ids, vec!["e2", "e3", "e1"]);
	assert!(ranked.windows(2).all(|pair| pair[0].priority >= pair[1].priority));
}

#[test]
fn equal_priorities_keep_input_order() {
	let cfg = Ranking::default();
	let query = NormalizedQuery::new("zzz");
	let ranked = ranking::rank(
		vec![entity("e1", "Alpha", 0.5), entity("e2", "Bravo", 0.5), entity("e3", "Charlie", 0.5)],
		&query,
		&cfg,
	);
	let ids: Vec<&str> = ranked.iter().map(|item| item.id.as_str()).collect();

	assert_eq!(ids, vec!["e1", "e2", "e3"]);
}

#[test]
fn cap_is_waived_when_fewer_than_max_results_exist() {
	let cfg = Ranking::default();
	let items = (0..6)
		.map(|idx| entity(&format!("e{idx}"), &format!("Entity {idx}"), idx as f32 / 10.0))
		.collect();
	let ranked = ranking::rank(items, &NormalizedQuery::new("entity"), &cfg);
	let selected = ranking::select_diverse(ranked, 8, 3);

	assert_eq!(selected.len(), 6);
	assert!(selected.iter().all(|item| item.kind() == ResultKind::Entity));
}

#[test]
fn cap_limits_a_single_kind_when_others_fill_the_list() {
	let cfg = Ranking::default();
	let query = NormalizedQuery::new("acme");
	let mut items: Vec<SearchResultItem> =
		(0..6).map(|idx| entity(&format!("e{idx}"), "Acme", 0.9)).collect();

	for idx in 0..6 {
		items.push(SearchResultItem::from_collection(
			sift_domain::CollectionRecord {
				id: format!("c{idx}"),
				name: format!("Acme collection {idx}"),
				description: None,
			},
			0.8,
		));
	}

	let ranked = ranking::rank(items, &query, &cfg);
	let selected = ranking::select_diverse(ranked, 8, 3);
	let selected_kinds = kinds(&selected);

	assert_eq!(selected.len(), 8);
	// First pass takes three of each kind; the fill pass tops up from the best leftovers.
	let first_pass = &selected_kinds[..6];

	assert_eq!(first_pass.iter().filter(|kind| **kind == ResultKind::Entity).count(), 3);
	assert_eq!(first_pass.iter().filter(|kind| **kind == ResultKind::Collection).count(), 3);
}

#[test]
fn selection_never_exceeds_max_results() {
	let cfg = Ranking::default();
	let items = (0..40).map(|idx| entity(&format!("e{idx}"), "Acme", 0.5)).collect();
	let ranked = ranking::rank(items, &NormalizedQuery::new("acme"), &cfg);

	assert_eq!(ranking::select_diverse(ranked, 8, 3).len(), 8);
}

#[test]
fn fill_pass_skips_items_already_selected() {
	let cfg = Ranking::default();
	let items = vec![
		entity("e1", "Acme", 0.9),
		entity("e2", "Acme", 0.8),
		entity("e3", "Acme", 0.7),
		entity("e4", "Acme", 0.6),
	];
	let ranked = ranking::rank(items, &NormalizedQuery::new("acme"), &cfg);
	let selected = ranking::select_diverse(ranked, 8, 3);
	let ids: Vec<&str> = selected.iter().map(|item| item.id.as_str()).collect();

	assert_eq!(ids, vec!["e1", "e2", "e3", "e4"]);
}
