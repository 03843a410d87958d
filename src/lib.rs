//! # Nuages
//!
//! GraphQL resolver helpers for CMS content. The crate sits between a
//! GraphQL schema and the content backend and does two jobs:
//!
//! - **Queryset refinement**: apply the optional list-field arguments
//!   (`limit`, `offset`, `search_query`, `id`, `order`) to an opaque,
//!   chainable queryset, delegating full-text matching to a pluggable
//!   search backend.
//! - **Rich-text page links**: rewrite stored `<a linktype="page" id="...">`
//!   references into concrete front-end links carrying routing metadata,
//!   degrading dangling references instead of failing the request.
//!
//! ## Architecture
//!
//! ```text
//! nuages
//! ├── queryset  - QuerySet protocol, list-field arguments, refinement rules
//! ├── search    - search backend + query-popularity counter protocols
//! ├── pages     - live/public page lookup protocol
//! ├── richtext  - RichText wrapper, page-link rewriter
//! ├── settings  - injectable behavioral flags
//! └── testing   - in-memory queryset and search backend
//! ```
//!
//! The collaborators (the ORM's querysets, the search index, the page
//! tree) stay outside; this crate only defines the protocols it consumes
//! and the transformations it owns. All errors surface to the resolver
//! layer untouched except the single documented recovery: a page link
//! whose target is missing, draft, or private becomes a bare anchor.
//!
//! ## Quick Start
//!
//! ```rust
//! use nuages::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() {
//! // Refine a queryset the way a list resolver would.
//! let resolver = QuerySetResolver::new(MemorySearchBackend, NoopHitCounter);
//! let qs = MemoryQuerySet::new(vec![
//! 	json!({"id": 1, "title": "Home"}),
//! 	json!({"id": 2, "title": "About"}),
//! ]);
//! let params = QueryParams {
//! 	limit: Some(1.into()),
//! 	order: Some("title".to_string()),
//! 	..QueryParams::default()
//! };
//! let page_of_results = resolver.resolve(qs, &params).await.unwrap();
//! assert_eq!(page_of_results.records().len(), 1);
//!
//! // Resolve rich-text page links for the front end.
//! let pages = MemoryPageResolver::new();
//! pages.insert(PageRecord::new(2, "StandardPage", "about", "/about/"));
//! let rich = RichTextRewriter::new(pages)
//! 	.rewrite(r#"<a linktype="page" id="2">About us</a>"#)
//! 	.await
//! 	.unwrap();
//! assert_eq!(
//! 	rich.as_html(),
//! 	r#"<a href="/about/" data-page-type="StandardPage" data-page-slug="about" data-page-url="/about/">About us</a>"#
//! );
//! # }
//! ```

pub mod pages;
pub mod queryset;
pub mod richtext;
pub mod search;
pub mod settings;
pub mod testing;

pub use queryset::{QueryParams, QuerySet, QuerySetResolver, RefineError};
pub use richtext::{RichText, RichTextError, RichTextRewriter};
pub use settings::Settings;

// Prelude for convenient imports
pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::pages::{MemoryPageResolver, PageRecord, PageResolver, ResolvedPage};
	pub use crate::queryset::{
		IntParam, OrderDirection, OrderingField, QueryParams, QuerySet, QuerySetResolver,
		RefineError, parse_ordering,
	};
	pub use crate::richtext::{RichText, RichTextError, RichTextRewriter};
	pub use crate::search::{
		MemoryHitCounter, NoopHitCounter, SearchBackend, SearchError, SearchHitCounter,
	};
	pub use crate::settings::Settings;
	pub use crate::testing::{MemoryQuerySet, MemorySearchBackend};
}
