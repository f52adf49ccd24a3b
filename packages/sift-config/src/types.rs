use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub backend: Backend,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub collections: CollectionScoring,
	#[serde(default)]
	pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

/// Connection settings handed to every backend call.
///
/// This is the whole session context: nothing in the workspace reads credentials or the base URL
/// from anywhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub api_base: String,
	pub access_token: Option<String>,
	#[serde(default = "default_search_path")]
	pub search_path: String,
	#[serde(default = "default_list_path")]
	pub list_path: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub debounce_ms: u64,
	/// Result count requested from the upstream content search.
	pub limit: u32,
	pub semantic: bool,
	pub fulltext: bool,
	pub graph: bool,
	pub max_results: u32,
	pub per_kind_cap: u32,
	pub recent_limit: u32,
	pub snippet_chars: u32,
	pub fallback_list_limit: u32,
	pub fallback_max_results: u32,
	pub local_fallback_max_results: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			debounce_ms: 300,
			limit: 10,
			semantic: true,
			fulltext: false,
			graph: true,
			max_results: 8,
			per_kind_cap: 3,
			recent_limit: 5,
			snippet_chars: 100,
			fallback_list_limit: 50,
			fallback_max_results: 8,
			local_fallback_max_results: 5,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub score_weight: f32,
	pub kind_weights: KindWeights,
	pub title_match: TitleMatch,
	pub description_bonus: f32,
	pub description_min_chars: u32,
	pub named_title_bonus: f32,
	pub named_title_min_chars: u32,
	pub ingestion_success_bonus: f32,
	pub extraction_success_bonus: f32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			score_weight: 50.0,
			kind_weights: KindWeights::default(),
			title_match: TitleMatch::default(),
			description_bonus: 5.0,
			description_min_chars: 20,
			named_title_bonus: 5.0,
			named_title_min_chars: 3,
			ingestion_success_bonus: 10.0,
			extraction_success_bonus: 5.0,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KindWeights {
	pub document: f32,
	pub collection: f32,
	pub entity: f32,
	pub relationship: f32,
	pub community: f32,
}
impl Default for KindWeights {
	fn default() -> Self {
		Self { document: 100.0, collection: 90.0, entity: 70.0, relationship: 60.0, community: 50.0 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TitleMatch {
	pub exact: f32,
	pub prefix: f32,
	pub substring: f32,
}
impl Default for TitleMatch {
	fn default() -> Self {
		Self { exact: 30.0, prefix: 20.0, substring: 10.0 }
	}
}

/// Local relevance for collections, which the backend never scores.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionScoring {
	pub exact: f32,
	pub prefix: f32,
	pub substring: f32,
	pub description_bonus: f32,
}
impl Default for CollectionScoring {
	fn default() -> Self {
		Self { exact: 1.0, prefix: 0.8, substring: 0.6, description_bonus: 0.1 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Pagination {
	pub page_size: u32,
	pub initial_page: u32,
	/// Pages warmed in the background on mount, counted from page one.
	pub initial_pages: u32,
	/// Absent disables boundary prefetch.
	pub prefetch_threshold: Option<u32>,
}
impl Default for Pagination {
	fn default() -> Self {
		Self { page_size: 10, initial_page: 1, initial_pages: 1, prefetch_threshold: None }
	}
}

fn default_search_path() -> String {
	"/v3/retrieval/search".to_string()
}

fn default_list_path() -> String {
	"/v3".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}
