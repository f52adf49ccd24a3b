use reqwest::Client;
use serde_json::Value;

use sift_config::Backend;
use sift_domain::{
	ContentMatches, GraphCommunity, GraphEntity, GraphMatch, GraphRecord, GraphRelationship,
	GraphResultType, PassageMatch,
};

use crate::{Error, Result, value_id, value_score, value_str};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
	pub semantic: bool,
	pub fulltext: bool,
	pub graph: bool,
	pub limit: u32,
}
impl SearchOptions {
	pub fn from_config(cfg: &sift_config::Search) -> Self {
		Self { semantic: cfg.semantic, fulltext: cfg.fulltext, graph: cfg.graph, limit: cfg.limit }
	}
}

pub async fn content_search(
	client: &Client,
	cfg: &Backend,
	query: &str,
	options: &SearchOptions,
) -> Result<ContentMatches> {
	let body = serde_json::json!({
		"query": query,
		"search_settings": {
			"use_semantic_search": options.semantic,
			"use_fulltext_search": options.fulltext,
			"limit": options.limit,
			"chunk_settings": { "enabled": options.semantic || options.fulltext },
			"graph_settings": { "enabled": options.graph },
		},
	});
	let res = client
		.post(crate::endpoint(cfg, &cfg.search_path))
		.headers(crate::request_headers(cfg)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

/// Normalizes a search response.
///
/// Only a response without a `results` object is an error. Each result list is parsed on its
/// own, so a malformed graph section still leaves the passages usable, and malformed entries are
/// skipped.
pub fn parse_search_response(json: Value) -> Result<ContentMatches> {
	let results = json.get("results").and_then(Value::as_object).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing results object.".to_string() }
	})?;
	let passages = match results.get("chunk_search_results") {
		Some(Value::Array(items)) => items.iter().filter_map(parse_passage).collect(),
		None | Some(Value::Null) => Vec::new(),
		Some(_) => {
			tracing::warn!("Search response chunk_search_results is not an array.");

			Vec::new()
		},
	};
	let graph = match results.get("graph_search_results") {
		Some(Value::Array(items)) => items.iter().filter_map(parse_graph_match).collect(),
		None | Some(Value::Null) => Vec::new(),
		Some(_) => {
			tracing::warn!("Search response graph_search_results is not an array.");

			Vec::new()
		},
	};

	Ok(ContentMatches { passages, graph })
}

fn parse_passage(item: &Value) -> Option<PassageMatch> {
	let Some(document_id) = value_id(item.get("document_id")) else {
		tracing::warn!("Passage match missing document_id.");

		return None;
	};
	let id = value_id(item.get("id")).unwrap_or_else(|| document_id.clone());
	let text = item.get("text").and_then(Value::as_str).unwrap_or_default().to_string();
	let metadata = item.get("metadata").and_then(Value::as_object).cloned().unwrap_or_default();

	Some(PassageMatch { id, document_id, text, score: value_score(item.get("score")), metadata })
}

fn parse_graph_match(item: &Value) -> Option<GraphMatch> {
	let raw_type = item.get("result_type").and_then(Value::as_str).unwrap_or_default();
	let Some(result_type) = GraphResultType::parse(raw_type) else {
		tracing::warn!(result_type = raw_type, "Graph match has unknown result_type.");

		return None;
	};
	let Some(content) = item.get("content").filter(|content| content.is_object()) else {
		tracing::warn!(result_type = result_type.as_str(), "Graph match missing content.");

		return None;
	};
	let record = match result_type {
		GraphResultType::Entity => parse_entity(content).map(GraphRecord::Entity),
		GraphResultType::Relationship =>
			parse_relationship(content).map(GraphRecord::Relationship),
		GraphResultType::Community => parse_community(content).map(GraphRecord::Community),
	};
	let Some(record) = record else {
		tracing::warn!(result_type = result_type.as_str(), "Graph match content is malformed.");

		return None;
	};

	Some(GraphMatch { record, score: value_score(item.get("score")) })
}

fn parse_entity(content: &Value) -> Option<GraphEntity> {
	let name = value_str(content.get("name"));
	let id = value_id(content.get("id")).or_else(|| name.clone())?;

	Some(GraphEntity {
		id,
		name,
		description: value_str(content.get("description")),
		category: value_str(content.get("category")),
	})
}

fn parse_relationship(content: &Value) -> Option<GraphRelationship> {
	let subject = value_str(content.get("subject"))?;
	let predicate = value_str(content.get("predicate"))?;
	let object = value_str(content.get("object"))?;
	let id = value_id(content.get("id"))
		.unwrap_or_else(|| format!("{subject}:{predicate}:{object}"));

	Some(GraphRelationship {
		id,
		subject,
		predicate,
		object,
		description: value_str(content.get("description")),
	})
}

fn parse_community(content: &Value) -> Option<GraphCommunity> {
	let id = value_id(content.get("id")).or_else(|| value_id(content.get("community_id")))?;

	Some(GraphCommunity {
		id,
		name: value_str(content.get("name")),
		summary: value_str(content.get("summary")),
		level: content.get("level").and_then(Value::as_i64),
	})
}
