//! Page resolution protocol.
//!
//! Rich-text page links reference pages by primary key. A [`PageResolver`]
//! turns such a key into the routing data the front end needs, looking only
//! at pages that are live and publicly visible. Draft and private pages
//! resolve as [`PageLookupError::NotFound`], exactly like a missing record.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by page lookup.
///
/// Only [`PageLookupError::NotFound`] is ever recovered by callers (the
/// rich-text rewriter degrades the link); everything else propagates.
#[derive(Debug, Error)]
pub enum PageLookupError {
	#[error("page {0} not found")]
	NotFound(String),
	#[error("invalid page id {0:?}")]
	InvalidId(String),
	#[error("page backend error: {0}")]
	Backend(String),
}

/// Routing data for one live, publicly visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
	/// Concrete page type name, e.g. `BlogPage`.
	pub type_name: String,
	pub slug: String,
	/// Cached full URL, when the page has one.
	pub url: Option<String>,
	/// Computed URL path, always present.
	pub url_path: String,
}

impl ResolvedPage {
	/// The URL the front end should route to: the cached `url` when
	/// present, the computed `url_path` otherwise.
	///
	/// # Examples
	///
	/// ```
	/// use nuages::pages::ResolvedPage;
	///
	/// let page = ResolvedPage {
	/// 	type_name: "BlogPage".to_string(),
	/// 	slug: "about".to_string(),
	/// 	url: None,
	/// 	url_path: "/about/".to_string(),
	/// };
	/// assert_eq!(page.front_end_url(), "/about/");
	/// ```
	pub fn front_end_url(&self) -> &str {
		self.url.as_deref().unwrap_or(&self.url_path)
	}
}

/// Lookup of live, publicly visible pages by primary key.
///
/// The id arrives as the raw attribute text from the rich-text source;
/// implementations decide what a well-formed key looks like.
#[async_trait]
pub trait PageResolver: Send + Sync {
	async fn resolve(&self, id: &str) -> Result<ResolvedPage, PageLookupError>;
}

/// One page registered with [`MemoryPageResolver`].
#[derive(Debug, Clone)]
pub struct PageRecord {
	pub id: u64,
	pub type_name: String,
	pub slug: String,
	pub url: Option<String>,
	pub url_path: String,
	pub live: bool,
	pub public: bool,
}

impl PageRecord {
	/// A live, public page with no cached URL.
	pub fn new(
		id: u64,
		type_name: impl Into<String>,
		slug: impl Into<String>,
		url_path: impl Into<String>,
	) -> Self {
		Self {
			id,
			type_name: type_name.into(),
			slug: slug.into(),
			url: None,
			url_path: url_path.into(),
			live: true,
			public: true,
		}
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	pub fn draft(mut self) -> Self {
		self.live = false;
		self
	}

	pub fn private(mut self) -> Self {
		self.public = false;
		self
	}
}

/// In-memory page registry.
///
/// # Examples
///
/// ```
/// use nuages::pages::{MemoryPageResolver, PageRecord, PageResolver};
///
/// # async fn demo() {
/// let resolver = MemoryPageResolver::new();
/// resolver.insert(PageRecord::new(5, "StandardPage", "about", "/about/"));
///
/// let page = resolver.resolve("5").await.unwrap();
/// assert_eq!(page.slug, "about");
/// assert_eq!(page.front_end_url(), "/about/");
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryPageResolver {
	pages: RwLock<HashMap<u64, PageRecord>>,
}

impl MemoryPageResolver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, record: PageRecord) {
		self.pages.write().insert(record.id, record);
	}
}

#[async_trait]
impl PageResolver for MemoryPageResolver {
	async fn resolve(&self, id: &str) -> Result<ResolvedPage, PageLookupError> {
		let key: u64 = id
			.parse()
			.map_err(|_| PageLookupError::InvalidId(id.to_string()))?;

		let pages = self.pages.read();
		let record = pages
			.get(&key)
			.filter(|record| record.live && record.public)
			.ok_or_else(|| PageLookupError::NotFound(id.to_string()))?;

		Ok(ResolvedPage {
			type_name: record.type_name.clone(),
			slug: record.slug.clone(),
			url: record.url.clone(),
			url_path: record.url_path.clone(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn resolver_with(record: PageRecord) -> MemoryPageResolver {
		let resolver = MemoryPageResolver::new();
		resolver.insert(record);
		resolver
	}

	#[rstest]
	#[tokio::test]
	async fn resolves_live_public_pages() {
		let resolver = resolver_with(
			PageRecord::new(1, "BlogPage", "hello", "/blog/hello/").with_url("https://example.com/blog/hello/"),
		);

		let page = resolver.resolve("1").await.unwrap();
		assert_eq!(page.type_name, "BlogPage");
		assert_eq!(page.front_end_url(), "https://example.com/blog/hello/");
	}

	#[rstest]
	#[tokio::test]
	async fn url_path_is_the_fallback() {
		let resolver = resolver_with(PageRecord::new(1, "BlogPage", "hello", "/blog/hello/"));

		let page = resolver.resolve("1").await.unwrap();
		assert_eq!(page.front_end_url(), "/blog/hello/");
	}

	#[rstest]
	#[tokio::test]
	async fn draft_and_private_pages_are_not_found() {
		let resolver = MemoryPageResolver::new();
		resolver.insert(PageRecord::new(1, "BlogPage", "draft", "/draft/").draft());
		resolver.insert(PageRecord::new(2, "BlogPage", "private", "/private/").private());

		assert!(matches!(
			resolver.resolve("1").await,
			Err(PageLookupError::NotFound(_))
		));
		assert!(matches!(
			resolver.resolve("2").await,
			Err(PageLookupError::NotFound(_))
		));
	}

	#[rstest]
	#[tokio::test]
	async fn malformed_ids_are_rejected() {
		let resolver = MemoryPageResolver::new();
		assert!(matches!(
			resolver.resolve("not-a-pk").await,
			Err(PageLookupError::InvalidId(_))
		));
	}
}
