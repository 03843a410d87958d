//! Queryset refinement for GraphQL list resolvers.
//!
//! A resolver hands over an opaque, chainable queryset together with the
//! optional arguments every list field accepts (`limit`, `offset`,
//! `search_query`, `id`, `order`) and gets back a refined queryset. The
//! precedence rules are fixed:
//!
//! 1. `id` filters by primary key and wins over search.
//! 2. Otherwise a non-empty `search_query` delegates to the search backend
//!    and returns its result as-is; ordering and slicing are skipped.
//! 3. `order` applies a multi-key ordering (`-` prefix for descending).
//! 4. `limit` slices `[offset, offset + limit)`. An `offset` without a
//!    `limit` is a pass-through; callers wanting offset-only pagination
//!    must also supply a limit.

use crate::search::{SearchBackend, SearchError, SearchHitCounter};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while refining a queryset.
#[derive(Debug, Error)]
pub enum RefineError {
	/// `search_query` was supplied for a model type that is not registered
	/// with the search index.
	#[error("{0} is not searchable")]
	NotSearchable(String),
	/// A parameter could not be coerced to the expected type.
	#[error("invalid value {value:?} for parameter {name:?}")]
	InvalidParameter { name: &'static str, value: String },
	#[error(transparent)]
	Search(#[from] SearchError),
}

pub type RefineResult<T> = Result<T, RefineError>;

/// The chainable collection handle a resolver works against.
///
/// Every method consumes the handle and returns a (possibly narrowed) one;
/// nothing is evaluated here. The ORM, or whatever sits behind the
/// implementation, stays in charge of execution and collation.
pub trait QuerySet: Sized {
	/// Primary key type for exact-match filtering.
	type Pk;

	/// Restrict to records whose primary key equals `pk`.
	fn filter_pk(self, pk: &Self::Pk) -> Self;

	/// Apply a stable multi-key ordering.
	fn order_by(self, ordering: &[OrderingField]) -> Self;

	/// Restrict to `[offset, offset + limit)`.
	fn slice(self, offset: usize, limit: usize) -> Self;

	/// Whether the underlying model type is registered for full-text
	/// search.
	fn is_indexed(&self) -> bool;
}

/// Sort direction for one ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
	Asc,
	Desc,
}

/// One parsed ordering key.
///
/// The wire format is the ORM convention: a field name, optionally
/// prefixed with `-` for descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingField {
	pub field: String,
	pub direction: OrderDirection,
}

impl OrderingField {
	/// Parse a single ordering token.
	///
	/// # Examples
	///
	/// ```
	/// use nuages::queryset::{OrderDirection, OrderingField};
	///
	/// let field = OrderingField::parse("-published_at");
	/// assert_eq!(field.field, "published_at");
	/// assert_eq!(field.direction, OrderDirection::Desc);
	/// ```
	pub fn parse(token: &str) -> Self {
		if let Some(stripped) = token.strip_prefix('-') {
			Self {
				field: stripped.to_string(),
				direction: OrderDirection::Desc,
			}
		} else {
			Self {
				field: token.to_string(),
				direction: OrderDirection::Asc,
			}
		}
	}
}

/// Parse a comma-separated ordering expression.
///
/// Tokens are trimmed; empty tokens are dropped.
///
/// # Examples
///
/// ```
/// use nuages::queryset::{OrderDirection, parse_ordering};
///
/// let ordering = parse_ordering("name, -date");
/// assert_eq!(ordering.len(), 2);
/// assert_eq!(ordering[0].field, "name");
/// assert_eq!(ordering[1].direction, OrderDirection::Desc);
/// ```
pub fn parse_ordering(expr: &str) -> Vec<OrderingField> {
	expr.split(',')
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(OrderingField::parse)
		.collect()
}

/// An integer-valued argument as it arrives from the GraphQL layer.
///
/// Variables frequently reach the resolver as JSON numbers, but clients
/// also send numeric strings; both coerce. Anything else is an
/// [`RefineError::InvalidParameter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntParam {
	Int(i64),
	Text(String),
}

impl IntParam {
	fn coerce(&self, name: &'static str) -> RefineResult<i64> {
		let parsed = match self {
			Self::Int(value) => Some(*value),
			Self::Text(text) => text.trim().parse::<i64>().ok(),
		};
		parsed.ok_or_else(|| RefineError::InvalidParameter {
			name,
			value: self.display_value(),
		})
	}

	/// Coerce to a non-negative index.
	fn coerce_index(&self, name: &'static str) -> RefineResult<usize> {
		let value = self.coerce(name)?;
		usize::try_from(value).map_err(|_| RefineError::InvalidParameter {
			name,
			value: self.display_value(),
		})
	}

	fn display_value(&self) -> String {
		match self {
			Self::Int(value) => value.to_string(),
			Self::Text(text) => text.clone(),
		}
	}
}

impl From<i64> for IntParam {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<&str> for IntParam {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

/// The optional arguments shared by every list field.
///
/// All fields are optional and there is no required combination. `id` and
/// `search_query` are mutually exclusive in effect: when both are present
/// the primary-key filter applies and search is skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryParams<Pk> {
	pub limit: Option<IntParam>,
	pub offset: Option<IntParam>,
	pub search_query: Option<String>,
	pub id: Option<Pk>,
	pub order: Option<String>,
}

impl<Pk> Default for QueryParams<Pk> {
	fn default() -> Self {
		Self {
			limit: None,
			offset: None,
			search_query: None,
			id: None,
			order: None,
		}
	}
}

/// Refines querysets on behalf of GraphQL list resolvers.
///
/// The search backend, the hit counter, and the settings that decide
/// whether hits are recorded are all injected; the resolver holds no state
/// of its own between calls.
///
/// # Examples
///
/// ```
/// use nuages::queryset::{QueryParams, QuerySetResolver};
/// use nuages::search::MemoryHitCounter;
/// use nuages::testing::{MemoryQuerySet, MemorySearchBackend};
/// use serde_json::json;
///
/// # async fn demo() {
/// let resolver = QuerySetResolver::new(MemorySearchBackend, MemoryHitCounter::new());
/// let qs = MemoryQuerySet::new(vec![
/// 	json!({"id": 1, "name": "home"}),
/// 	json!({"id": 2, "name": "about"}),
/// ]);
///
/// let params = QueryParams {
/// 	order: Some("name".to_string()),
/// 	..QueryParams::default()
/// };
/// let refined = resolver.resolve(qs, &params).await.unwrap();
/// assert_eq!(refined.records()[0]["name"], "about");
/// # }
/// ```
pub struct QuerySetResolver<S, C> {
	search: S,
	hits: C,
	settings: Settings,
}

impl<S, C> QuerySetResolver<S, C>
where
	C: SearchHitCounter,
{
	pub fn new(search: S, hits: C) -> Self {
		Self {
			search,
			hits,
			settings: Settings::default(),
		}
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	/// Refine `qs` according to `params`.
	///
	/// See the module docs for the precedence rules. Search delegation
	/// returns the backend's result as-is; a queryset that went through
	/// search is neither reordered nor sliced here.
	pub async fn resolve<Q>(&self, qs: Q, params: &QueryParams<Q::Pk>) -> RefineResult<Q>
	where
		Q: QuerySet,
		S: SearchBackend<Q>,
	{
		let offset = match &params.offset {
			Some(value) => value.coerce_index("offset")?,
			None => 0,
		};

		let mut qs = qs;
		if let Some(id) = &params.id {
			qs = qs.filter_pk(id);
		} else if let Some(query) = params.search_query.as_deref().filter(|q| !q.is_empty()) {
			if !qs.is_indexed() {
				return Err(RefineError::NotSearchable(
					std::any::type_name::<Q>().to_string(),
				));
			}
			if self.settings.add_search_hit {
				self.hits.add_hit(query).await?;
			}
			tracing::debug!(query, "delegating queryset to search backend");
			return Ok(self.search.search(query, qs).await?);
		}

		if let Some(order) = params.order.as_deref() {
			let ordering = parse_ordering(order);
			if !ordering.is_empty() {
				qs = qs.order_by(&ordering);
			}
		}

		if let Some(limit) = &params.limit {
			let limit = limit.coerce_index("limit")?;
			qs = qs.slice(offset, limit);
		}

		Ok(qs)
	}
}
