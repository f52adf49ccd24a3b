use std::{fmt, str::FromStr};

use reqwest::Client;
use serde_json::Value;

use sift_config::Backend;
use sift_domain::{DocumentRecord, Page};

use crate::{Error, Result};

/// Server-side collections that support offset/limit listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
	Documents,
	Collections,
	Chunks,
	Entities,
	Relationships,
	Communities,
	Users,
}
impl ListKind {
	pub const ALL: [Self; 7] = [
		Self::Documents,
		Self::Collections,
		Self::Chunks,
		Self::Entities,
		Self::Relationships,
		Self::Communities,
		Self::Users,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Documents => "documents",
			Self::Collections => "collections",
			Self::Chunks => "chunks",
			Self::Entities => "entities",
			Self::Relationships => "relationships",
			Self::Communities => "communities",
			Self::Users => "users",
		}
	}
}
impl fmt::Display for ListKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ListKind {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		let raw = raw.trim();

		Self::ALL
			.into_iter()
			.find(|kind| raw.eq_ignore_ascii_case(kind.as_str()))
			.ok_or_else(|| Error::UnknownListKind(raw.to_string()))
	}
}

pub async fn list(
	client: &Client,
	cfg: &Backend,
	kind: ListKind,
	offset: u32,
	limit: u32,
) -> Result<Page<Value>> {
	let url = crate::endpoint(cfg, &format!("{}/{}", cfg.list_path, kind.as_str()));
	let res = client
		.get(url)
		.headers(crate::request_headers(cfg)?)
		.query(&[("offset", offset), ("limit", limit)])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_list_response(json)
}

pub async fn list_documents(
	client: &Client,
	cfg: &Backend,
	offset: u32,
	limit: u32,
) -> Result<Page<DocumentRecord>> {
	let page = list(client, cfg, ListKind::Documents, offset, limit).await?;

	Ok(decode_rows(page))
}

pub fn parse_list_response(json: Value) -> Result<Page<Value>> {
	let Value::Object(mut body) = json else {
		return Err(Error::InvalidResponse {
			message: "Listing response must be a JSON object.".to_string(),
		});
	};
	let items = match body.remove("results") {
		Some(Value::Array(items)) => items,
		_ =>
			return Err(Error::InvalidResponse {
				message: "Listing response is missing results array.".to_string(),
			}),
	};
	let total_count = body
		.get("total_entries")
		.or_else(|| body.get("total"))
		.and_then(Value::as_u64)
		.unwrap_or(items.len() as u64);

	Ok(Page { items, total_count })
}

/// Decodes rows into records, dropping rows that do not fit.
pub fn decode_rows<T>(page: Page<Value>) -> Page<T>
where
	T: serde::de::DeserializeOwned,
{
	let items = page
		.items
		.into_iter()
		.filter_map(|row| match serde_json::from_value(row) {
			Ok(record) => Some(record),
			Err(err) => {
				tracing::warn!(error = %err, "Skipping malformed listing row.");

				None
			},
		})
		.collect();

	Page { items, total_count: page.total_count }
}
