//! Crate configuration.
//!
//! A small, injectable settings struct in the spirit of a Django settings
//! module. There are no global statics: whoever constructs the resolver
//! decides what it reads.

use serde::{Deserialize, Serialize};

/// Behavioral settings for the GraphQL helper layer.
///
/// # Examples
///
/// ```
/// use nuages::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.add_search_hit);
///
/// let settings = Settings {
/// 	add_search_hit: true,
/// };
/// assert!(settings.add_search_hit);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
	/// Record a query-popularity hit against the injected
	/// [`SearchHitCounter`](crate::search::SearchHitCounter) every time a
	/// queryset resolution delegates to the search backend.
	pub add_search_hit: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_no_hit_tracking() {
		assert!(!Settings::default().add_search_hit);
	}

	#[test]
	fn round_trips_through_serde() {
		let settings = Settings {
			add_search_hit: true,
		};
		let json = serde_json::to_string(&settings).unwrap();
		let back: Settings = serde_json::from_str(&json).unwrap();
		assert!(back.add_search_hit);
	}
}
