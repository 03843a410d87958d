//! Search backend protocol.
//!
//! The queryset resolver never matches text itself. It hands the query
//! string and the current queryset to a [`SearchBackend`] and returns
//! whatever comes back. Query-popularity tracking is a second, separately
//! injected service so the side effect shows up in the resolver's
//! dependencies instead of hiding behind a global flag check.

use crate::queryset::QuerySet;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by search collaborators.
///
/// These pass through the resolver unmodified; it adds no retry and no
/// wrapping.
#[derive(Debug, Error)]
pub enum SearchError {
	#[error("search backend error: {0}")]
	Backend(String),
	#[error("search hit counter error: {0}")]
	Counter(String),
}

/// Full-text search delegation.
///
/// `search` receives the queryset as refined so far (primary-key filtering
/// excluded, since an `id` filter short-circuits search entirely) and
/// returns a queryset of matching records. Match semantics, relevance
/// ordering, and result limits are the backend's business.
#[async_trait]
pub trait SearchBackend<Q: QuerySet>: Send + Sync {
	async fn search(&self, query: &str, qs: Q) -> Result<Q, SearchError>;
}

/// Query-popularity counter keyed by search text.
///
/// Incrementing is fire-and-forget from the resolver's point of view, but
/// failures still propagate to the caller. Serializing concurrent
/// increments is the implementation's concern.
#[async_trait]
pub trait SearchHitCounter: Send + Sync {
	async fn add_hit(&self, query: &str) -> Result<(), SearchError>;
}

#[async_trait]
impl<'a, T: SearchHitCounter + ?Sized> SearchHitCounter for &'a T {
	async fn add_hit(&self, query: &str) -> Result<(), SearchError> {
		(**self).add_hit(query).await
	}
}

#[async_trait]
impl<T: SearchHitCounter + ?Sized> SearchHitCounter for std::sync::Arc<T> {
	async fn add_hit(&self, query: &str) -> Result<(), SearchError> {
		(**self).add_hit(query).await
	}
}

/// In-memory hit counter.
///
/// # Examples
///
/// ```
/// use nuages::search::{MemoryHitCounter, SearchHitCounter};
///
/// # async fn demo() {
/// let counter = MemoryHitCounter::new();
/// counter.add_hit("pricing").await.unwrap();
/// counter.add_hit("pricing").await.unwrap();
/// assert_eq!(counter.hits("pricing"), 2);
/// assert_eq!(counter.hits("careers"), 0);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryHitCounter {
	hits: RwLock<HashMap<String, u64>>,
}

impl MemoryHitCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of hits recorded for `query`.
	pub fn hits(&self, query: &str) -> u64 {
		self.hits.read().get(query).copied().unwrap_or(0)
	}
}

#[async_trait]
impl SearchHitCounter for MemoryHitCounter {
	async fn add_hit(&self, query: &str) -> Result<(), SearchError> {
		*self.hits.write().entry(query.to_string()).or_insert(0) += 1;
		Ok(())
	}
}

/// Hit counter that records nothing.
///
/// Use when hit tracking is disabled or handled elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHitCounter;

#[async_trait]
impl SearchHitCounter for NoopHitCounter {
	async fn add_hit(&self, _query: &str) -> Result<(), SearchError> {
		Ok(())
	}
}
