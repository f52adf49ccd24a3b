pub mod debounce;
pub mod pagination;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use pagination::{PageCache, PageView};
pub use search::{
	SearchContext, SearchInput, SearchOutcome, SearchPath, SearchSession, SearchState,
	SearchTicket, Submission, UnifiedSearch,
};

use std::{future::Future, marker::PhantomData, pin::Pin};

use serde::de::DeserializeOwned;

use sift_domain::{ContentMatches, DocumentRecord, Page};
use sift_providers::{BackendClient, ListKind, SearchOptions, listing};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote calls the unified search depends on.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn content_search<'a>(
		&'a self,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, Result<ContentMatches>>;

	fn list_documents(&self, offset: u32, limit: u32) -> BoxFuture<'_, Result<Page<DocumentRecord>>>;
}

/// An offset/limit fetch behind one cache key.
pub trait PageSource<T>
where
	Self: Send + Sync,
{
	fn fetch_page(&self, offset: u32, limit: u32) -> BoxFuture<'_, Result<Page<T>>>;
}

/// Listing of one server-side collection, decoded into `T`.
pub struct ListingSource<T> {
	client: BackendClient,
	kind: ListKind,
	_rows: PhantomData<fn() -> T>,
}
impl<T> ListingSource<T> {
	pub fn new(client: BackendClient, kind: ListKind) -> Self {
		Self { client, kind, _rows: PhantomData }
	}

	pub fn kind(&self) -> ListKind {
		self.kind
	}
}

/// Adapts an async closure into a [`PageSource`].
pub struct FetchFn<F>(pub F);

impl SearchBackend for BackendClient {
	fn content_search<'a>(
		&'a self,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, Result<ContentMatches>> {
		Box::pin(async move { Ok(BackendClient::content_search(self, query, options).await?) })
	}

	fn list_documents(&self, offset: u32, limit: u32) -> BoxFuture<'_, Result<Page<DocumentRecord>>> {
		Box::pin(async move { Ok(BackendClient::list_documents(self, offset, limit).await?) })
	}
}

impl<T> PageSource<T> for ListingSource<T>
where
	T: DeserializeOwned + Send + 'static,
{
	fn fetch_page(&self, offset: u32, limit: u32) -> BoxFuture<'_, Result<Page<T>>> {
		Box::pin(async move {
			let page = self.client.list(self.kind, offset, limit).await?;

			Ok(listing::decode_rows(page))
		})
	}
}

impl<T, F, Fut> PageSource<T> for FetchFn<F>
where
	F: Fn(u32, u32) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Page<T>>> + Send + 'static,
{
	fn fetch_page(&self, offset: u32, limit: u32) -> BoxFuture<'_, Result<Page<T>>> {
		Box::pin((self.0)(offset, limit))
	}
}
