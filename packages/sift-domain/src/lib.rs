pub mod item;
pub mod ranking;
pub mod record;
pub mod text;
pub mod timestamp;

pub use item::{DocumentHit, ResultKind, ResultRecord, SearchResultItem};
pub use record::{
	CollectionRecord, ContentMatches, DocumentRecord, GraphCommunity, GraphEntity, GraphMatch,
	GraphRecord, GraphRelationship, GraphResultType, Page, PassageMatch,
};
pub use text::NormalizedQuery;
