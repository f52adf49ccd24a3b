pub mod listing;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use listing::ListKind;
pub use search::SearchOptions;

use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::Value;

use sift_config::Backend;
use sift_domain::{ContentMatches, DocumentRecord, Page};

/// Backend handle: one pooled HTTP client plus the connection settings every call uses.
#[derive(Debug, Clone)]
pub struct BackendClient {
	http: Client,
	cfg: Backend,
}
impl BackendClient {
	pub fn new(cfg: Backend) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { http, cfg })
	}

	pub fn config(&self) -> &Backend {
		&self.cfg
	}

	pub async fn content_search(
		&self,
		query: &str,
		options: &SearchOptions,
	) -> Result<ContentMatches> {
		search::content_search(&self.http, &self.cfg, query, options).await
	}

	pub async fn list(&self, kind: ListKind, offset: u32, limit: u32) -> Result<Page<Value>> {
		listing::list(&self.http, &self.cfg, kind, offset, limit).await
	}

	pub async fn list_documents(&self, offset: u32, limit: u32) -> Result<Page<DocumentRecord>> {
		listing::list_documents(&self.http, &self.cfg, offset, limit).await
	}
}

pub fn request_headers(cfg: &Backend) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(token) = cfg.access_token.as_deref() {
		headers.insert(AUTHORIZATION, format!("Bearer {token}").parse()?);
	}

	for (key, value) in &cfg.default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn endpoint(cfg: &Backend, path: &str) -> String {
	format!("{}{}", cfg.api_base, path)
}

/// Ids arrive as strings from most endpoints and as integers from the graph store.
pub(crate) fn value_id(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(raw) if !raw.trim().is_empty() => Some(raw.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

pub(crate) fn value_str(value: Option<&Value>) -> Option<String> {
	value.and_then(Value::as_str).filter(|raw| !raw.trim().is_empty()).map(str::to_string)
}

/// Upstream relevance, clamped into `0.0..=1.0`.
pub(crate) fn value_score(value: Option<&Value>) -> Option<f32> {
	value
		.and_then(Value::as_f64)
		.filter(|score| score.is_finite())
		.map(|score| score.clamp(0.0, 1.0) as f32)
}
