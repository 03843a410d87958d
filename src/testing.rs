//! In-memory collaborators for tests, examples, and prototyping.
//!
//! [`MemoryQuerySet`] keeps records as JSON objects and evaluates the
//! queryset operations eagerly over a `Vec`. It is not an ORM; it exists so
//! the refinement rules can be exercised without a database.

use crate::queryset::{OrderDirection, OrderingField, QuerySet};
use crate::search::{SearchBackend, SearchError};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

/// An eagerly evaluated queryset over JSON records.
///
/// # Examples
///
/// ```
/// use nuages::queryset::{QuerySet, parse_ordering};
/// use nuages::testing::MemoryQuerySet;
/// use serde_json::json;
///
/// let qs = MemoryQuerySet::new(vec![
/// 	json!({"id": 1, "name": "banana"}),
/// 	json!({"id": 2, "name": "apple"}),
/// ]);
/// let qs = qs.order_by(&parse_ordering("name"));
/// assert_eq!(qs.records()[0]["name"], "apple");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryQuerySet {
	records: Vec<Value>,
	pk_field: String,
	indexed: bool,
}

impl MemoryQuerySet {
	/// A searchable queryset keyed by the `"id"` field.
	pub fn new(records: Vec<Value>) -> Self {
		Self {
			records,
			pk_field: "id".to_string(),
			indexed: true,
		}
	}

	pub fn with_pk_field(mut self, field: impl Into<String>) -> Self {
		self.pk_field = field.into();
		self
	}

	/// Mark the underlying model type as absent from the search index.
	pub fn unindexed(mut self) -> Self {
		self.indexed = false;
		self
	}

	pub fn records(&self) -> &[Value] {
		&self.records
	}

	pub fn into_records(self) -> Vec<Value> {
		self.records
	}

	/// Records with any string field containing `query`, case-insensitive.
	pub fn matching(&self, query: &str) -> Self {
		let needle = query.to_lowercase();
		Self {
			records: self
				.records
				.iter()
				.filter(|record| record_matches(record, &needle))
				.cloned()
				.collect(),
			pk_field: self.pk_field.clone(),
			indexed: self.indexed,
		}
	}
}

impl QuerySet for MemoryQuerySet {
	type Pk = Value;

	fn filter_pk(mut self, pk: &Value) -> Self {
		self.records
			.retain(|record| record.get(&self.pk_field) == Some(pk));
		self
	}

	fn order_by(mut self, ordering: &[OrderingField]) -> Self {
		self.records.sort_by(|a, b| {
			for key in ordering {
				let lhs = a.get(&key.field).unwrap_or(&Value::Null);
				let rhs = b.get(&key.field).unwrap_or(&Value::Null);
				let ord = match key.direction {
					OrderDirection::Asc => compare_values(lhs, rhs),
					OrderDirection::Desc => compare_values(lhs, rhs).reverse(),
				};
				if ord != Ordering::Equal {
					return ord;
				}
			}
			Ordering::Equal
		});
		self
	}

	fn slice(mut self, offset: usize, limit: usize) -> Self {
		self.records = self
			.records
			.into_iter()
			.skip(offset)
			.take(limit)
			.collect();
		self
	}

	fn is_indexed(&self) -> bool {
		self.indexed
	}
}

/// Naive full-text search over [`MemoryQuerySet`] records.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySearchBackend;

#[async_trait]
impl SearchBackend<MemoryQuerySet> for MemorySearchBackend {
	async fn search(&self, query: &str, qs: MemoryQuerySet) -> Result<MemoryQuerySet, SearchError> {
		Ok(qs.matching(query))
	}
}

fn record_matches(record: &Value, needle: &str) -> bool {
	record.as_object().is_some_and(|fields| {
		fields.values().any(|value| {
			value
				.as_str()
				.is_some_and(|text| text.to_lowercase().contains(needle))
		})
	})
}

// Collation for ordering: nulls first, then booleans, numbers, strings,
// everything else by type only.
fn compare_values(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::Bool(x), Value::Bool(y)) => x.cmp(y),
		(Value::Number(x), Value::Number(y)) => {
			if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
				x.cmp(&y)
			} else {
				x.as_f64()
					.unwrap_or(0.0)
					.partial_cmp(&y.as_f64().unwrap_or(0.0))
					.unwrap_or(Ordering::Equal)
			}
		}
		(Value::String(x), Value::String(y)) => x.cmp(y),
		_ => type_rank(a).cmp(&type_rank(b)),
	}
}

fn type_rank(value: &Value) -> u8 {
	match value {
		Value::Null => 0,
		Value::Bool(_) => 1,
		Value::Number(_) => 2,
		Value::String(_) => 3,
		Value::Array(_) => 4,
		Value::Object(_) => 5,
	}
}
