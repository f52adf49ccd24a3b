mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Backend, CollectionScoring, Config, KindWeights, Pagination, Ranking, Search, Service,
	TitleMatch,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes, and validates an in-memory TOML document.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: "<inline>".into(), source: Box::new(err) })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	validate_backend(&cfg.backend)?;
	validate_search(&cfg.search)?;
	validate_ranking(&cfg.ranking)?;
	validate_collections(&cfg.collections)?;

	if cfg.pagination.page_size == 0 {
		return Err(Error::invalid("pagination.page_size", "must be greater than zero"));
	}
	if cfg.pagination.initial_page == 0 {
		return Err(Error::invalid("pagination.initial_page", "must be at least 1"));
	}

	Ok(())
}

fn validate_backend(backend: &Backend) -> Result<()> {
	let api_base = backend.api_base.trim();

	if api_base.is_empty() {
		return Err(Error::invalid("backend.api_base", "must be non-empty"));
	}
	if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
		return Err(Error::invalid("backend.api_base", "must start with http:// or https://"));
	}
	if backend.timeout_ms == 0 {
		return Err(Error::invalid("backend.timeout_ms", "must be greater than zero"));
	}

	for (key, value) in [
		("backend.search_path", &backend.search_path),
		("backend.list_path", &backend.list_path),
	] {
		if !value.starts_with('/') {
			return Err(Error::invalid(key, "must start with /"));
		}
	}

	Ok(())
}

fn validate_search(search: &Search) -> Result<()> {
	for (key, value) in [
		("search.limit", search.limit),
		("search.max_results", search.max_results),
		("search.per_kind_cap", search.per_kind_cap),
		("search.recent_limit", search.recent_limit),
		("search.snippet_chars", search.snippet_chars),
		("search.fallback_list_limit", search.fallback_list_limit),
		("search.fallback_max_results", search.fallback_max_results),
		("search.local_fallback_max_results", search.local_fallback_max_results),
	] {
		if value == 0 {
			return Err(Error::invalid(key, "must be greater than zero"));
		}
	}

	if search.per_kind_cap > search.max_results {
		return Err(Error::invalid("search.per_kind_cap", "must not exceed search.max_results"));
	}
	if !search.semantic && !search.fulltext && !search.graph {
		return Err(Error::invalid(
			"search.semantic",
			"or one of search.fulltext and search.graph must be enabled",
		));
	}

	Ok(())
}

fn validate_ranking(ranking: &Ranking) -> Result<()> {
	let weights = &ranking.kind_weights;
	let titles = &ranking.title_match;

	for (key, value) in [
		("ranking.score_weight", ranking.score_weight),
		("ranking.kind_weights.document", weights.document),
		("ranking.kind_weights.collection", weights.collection),
		("ranking.kind_weights.entity", weights.entity),
		("ranking.kind_weights.relationship", weights.relationship),
		("ranking.kind_weights.community", weights.community),
		("ranking.title_match.exact", titles.exact),
		("ranking.title_match.prefix", titles.prefix),
		("ranking.title_match.substring", titles.substring),
		("ranking.description_bonus", ranking.description_bonus),
		("ranking.named_title_bonus", ranking.named_title_bonus),
		("ranking.ingestion_success_bonus", ranking.ingestion_success_bonus),
		("ranking.extraction_success_bonus", ranking.extraction_success_bonus),
	] {
		if !value.is_finite() {
			return Err(Error::invalid(key, "must be a finite number"));
		}
		if value < 0.0 {
			return Err(Error::invalid(key, "must be zero or greater"));
		}
	}

	Ok(())
}

fn validate_collections(scoring: &CollectionScoring) -> Result<()> {
	for (key, value) in [
		("collections.exact", scoring.exact),
		("collections.prefix", scoring.prefix),
		("collections.substring", scoring.substring),
		("collections.description_bonus", scoring.description_bonus),
	] {
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::invalid(key, "must be in the range 0.0-1.0"));
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.backend.api_base = cfg.backend.api_base.trim().trim_end_matches('/').to_string();

	if cfg.backend.access_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.backend.access_token = None;
	}
	if cfg.backend.list_path.len() > 1 && cfg.backend.list_path.ends_with('/') {
		cfg.backend.list_path = cfg.backend.list_path.trim_end_matches('/').to_string();
	}
}
