use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
	pub id: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub summary: Option<String>,
	#[serde(default)]
	pub document_type: Option<String>,
	#[serde(default)]
	pub collection_ids: Vec<String>,
	#[serde(default)]
	pub ingestion_status: Option<String>,
	#[serde(default)]
	pub extraction_status: Option<String>,
	#[serde(default, with = "crate::timestamp")]
	pub created_at: Option<OffsetDateTime>,
}
impl DocumentRecord {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			title: None,
			summary: None,
			document_type: None,
			collection_ids: Vec::new(),
			ingestion_status: None,
			extraction_status: None,
			created_at: None,
		}
	}

	/// Human-readable name, or the id when the document has none.
	pub fn display_title(&self) -> &str {
		non_empty(self.title.as_deref()).unwrap_or(&self.id)
	}

	pub fn is_ingested(&self) -> bool {
		is_success(self.ingestion_status.as_deref())
	}

	pub fn is_extracted(&self) -> bool {
		is_success(self.extraction_status.as_deref())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
}
impl CollectionRecord {
	pub fn has_description(&self) -> bool {
		non_empty(self.description.as_deref()).is_some()
	}
}

/// A text span returned by semantic or full-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageMatch {
	pub id: String,
	pub document_id: String,
	pub text: String,
	#[serde(default)]
	pub score: Option<f32>,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}
impl PassageMatch {
	pub fn metadata_title(&self) -> Option<&str> {
		non_empty(self.metadata.get("title").and_then(Value::as_str))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
	pub id: String,
	pub name: Option<String>,
	pub description: Option<String>,
	pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
	pub id: String,
	pub subject: String,
	pub predicate: String,
	pub object: String,
	pub description: Option<String>,
}
impl GraphRelationship {
	pub fn statement(&self) -> String {
		format!("{} {} {}", self.subject, self.predicate, self.object)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCommunity {
	pub id: String,
	pub name: Option<String>,
	pub summary: Option<String>,
	pub level: Option<i64>,
}

/// Discriminator carried by graph search results.
///
/// Upstream sends it in whatever casing the producing service chose; [`GraphResultType::parse`]
/// is the only place that casing is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphResultType {
	Entity,
	Relationship,
	Community,
}
impl GraphResultType {
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		[Self::Entity, Self::Relationship, Self::Community]
			.into_iter()
			.find(|kind| raw.eq_ignore_ascii_case(kind.as_str()))
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Entity => "entity",
			Self::Relationship => "relationship",
			Self::Community => "community",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result_type", content = "content", rename_all = "snake_case")]
pub enum GraphRecord {
	Entity(GraphEntity),
	Relationship(GraphRelationship),
	Community(GraphCommunity),
}
impl GraphRecord {
	pub fn result_type(&self) -> GraphResultType {
		match self {
			Self::Entity(_) => GraphResultType::Entity,
			Self::Relationship(_) => GraphResultType::Relationship,
			Self::Community(_) => GraphResultType::Community,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMatch {
	pub record: GraphRecord,
	pub score: Option<f32>,
}

/// Everything one content search call produced, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentMatches {
	pub passages: Vec<PassageMatch>,
	pub graph: Vec<GraphMatch>,
}

/// One page of a server-side listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub total_count: u64,
}
impl<T> Page<T> {
	pub fn empty() -> Self {
		Self { items: Vec::new(), total_count: 0 }
	}
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|text| !text.trim().is_empty())
}

fn is_success(status: Option<&str>) -> bool {
	status.map(|value| value.trim().eq_ignore_ascii_case(SUCCESS_STATUS)).unwrap_or(false)
}
