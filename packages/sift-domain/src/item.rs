use serde::Serialize;

use crate::{
	record::{
		CollectionRecord, DocumentRecord, GraphCommunity, GraphEntity, GraphMatch, GraphRecord,
		GraphRelationship, PassageMatch, non_empty,
	},
	text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
	Document,
	Collection,
	Entity,
	Relationship,
	Community,
}
impl ResultKind {
	pub const ALL: [Self; 5] =
		[Self::Document, Self::Collection, Self::Entity, Self::Relationship, Self::Community];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Document => "document",
			Self::Collection => "collection",
			Self::Entity => "entity",
			Self::Relationship => "relationship",
			Self::Community => "community",
		}
	}
}

/// Where a document-kind result came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentHit {
	/// A document record taken from a listing or the locally-held recent set.
	Listed(DocumentRecord),
	/// The first passage seen for a document, plus the document when it is known locally.
	Passage { passage: PassageMatch, document: Option<DocumentRecord> },
}
impl DocumentHit {
	pub fn document(&self) -> Option<&DocumentRecord> {
		match self {
			Self::Listed(document) => Some(document),
			Self::Passage { document, .. } => document.as_ref(),
		}
	}
}

/// The source record a result was built from; its variant decides the result kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "raw", rename_all = "snake_case")]
pub enum ResultRecord {
	Document(DocumentHit),
	Collection(CollectionRecord),
	Entity(GraphEntity),
	Relationship(GraphRelationship),
	Community(GraphCommunity),
}
impl ResultRecord {
	pub fn kind(&self) -> ResultKind {
		match self {
			Self::Document(_) => ResultKind::Document,
			Self::Collection(_) => ResultKind::Collection,
			Self::Entity(_) => ResultKind::Entity,
			Self::Relationship(_) => ResultKind::Relationship,
			Self::Community(_) => ResultKind::Community,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultItem {
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	/// Upstream relevance in `0.0..=1.0`; absent for unscored sources.
	pub score: Option<f32>,
	/// Set only by the ranking step.
	pub priority: Option<f32>,
	#[serde(flatten)]
	pub raw: ResultRecord,
}
impl SearchResultItem {
	pub fn kind(&self) -> ResultKind {
		self.raw.kind()
	}

	pub fn from_document(document: DocumentRecord) -> Self {
		Self {
			id: document.id.clone(),
			title: document.display_title().to_string(),
			description: owned_non_empty(document.summary.as_deref()),
			score: None,
			priority: None,
			raw: ResultRecord::Document(DocumentHit::Listed(document)),
		}
	}

	/// Builds a document result from a passage; `snippet_chars` bounds the description.
	pub fn from_passage(
		passage: PassageMatch,
		document: Option<DocumentRecord>,
		snippet_chars: usize,
	) -> Self {
		let title = passage
			.metadata_title()
			.or_else(|| document.as_ref().and_then(|doc| non_empty(doc.title.as_deref())))
			.unwrap_or(&passage.document_id)
			.to_string();
		let snippet = text::snippet(&passage.text, snippet_chars);

		Self {
			id: passage.document_id.clone(),
			title,
			description: (!snippet.is_empty()).then_some(snippet),
			score: passage.score,
			priority: None,
			raw: ResultRecord::Document(DocumentHit::Passage { passage, document }),
		}
	}

	pub fn from_collection(collection: CollectionRecord, score: f32) -> Self {
		Self {
			id: collection.id.clone(),
			title: non_empty(Some(collection.name.as_str())).unwrap_or(&collection.id).to_string(),
			description: owned_non_empty(collection.description.as_deref()),
			score: Some(score),
			priority: None,
			raw: ResultRecord::Collection(collection),
		}
	}

	pub fn from_graph(graph: GraphMatch) -> Self {
		let GraphMatch { record, score } = graph;

		match record {
			GraphRecord::Entity(entity) => Self {
				id: entity.id.clone(),
				title: non_empty(entity.name.as_deref()).unwrap_or(&entity.id).to_string(),
				description: owned_non_empty(entity.description.as_deref())
					.or_else(|| owned_non_empty(entity.category.as_deref())),
				score,
				priority: None,
				raw: ResultRecord::Entity(entity),
			},
			GraphRecord::Relationship(relationship) => Self {
				id: relationship.id.clone(),
				title: relationship.statement(),
				description: owned_non_empty(relationship.description.as_deref()),
				score,
				priority: None,
				raw: ResultRecord::Relationship(relationship),
			},
			GraphRecord::Community(community) => Self {
				id: community.id.clone(),
				title: owned_non_empty(community.name.as_deref())
					.unwrap_or_else(|| format!("Community {}", community.id)),
				description: owned_non_empty(community.summary.as_deref()),
				score,
				priority: None,
				raw: ResultRecord::Community(community),
			},
		}
	}

	/// The backing document record, when this is a document result that has one.
	pub fn document(&self) -> Option<&DocumentRecord> {
		match &self.raw {
			ResultRecord::Document(hit) => hit.document(),
			_ => None,
		}
	}
}

fn owned_non_empty(value: Option<&str>) -> Option<String> {
	non_empty(value).map(str::to_string)
}
