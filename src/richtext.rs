//! Rich-text page-link rewriting.
//!
//! CMS rich text stores internal links as `<a linktype="page" id="...">`
//! rather than as concrete URLs, so stored content survives page moves.
//! Before the text is handed to a front end, those anchors have to become
//! real links. [`RichTextRewriter`] streams over the source, resolves each
//! page link and replaces the anchor's opening tag with one carrying the
//! resolved `href` plus routing metadata (`data-page-type`,
//! `data-page-slug`, `data-page-url`). A link whose target page is gone, a
//! draft, or private degrades to a bare `<a>` keeping the inner content.
//!
//! Everything that is not a page-link anchor is copied from the source
//! byte-for-byte; the rewriter never reformats markup it does not touch.

use crate::pages::{PageLookupError, PageResolver, ResolvedPage};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while rewriting rich text.
#[derive(Debug, Error)]
pub enum RichTextError {
	/// The source is not well-formed markup.
	#[error("rich text parse error: {0}")]
	Parse(#[from] quick_xml::Error),
	/// An anchor carries a malformed attribute list.
	#[error("malformed attribute: {0}")]
	Attr(String),
	/// A `linktype="page"` anchor has no `id` attribute.
	#[error("page link without id attribute")]
	MissingPageId,
	/// Page lookup failed for a reason other than the page being absent.
	#[error(transparent)]
	PageLookup(PageLookupError),
}

/// Render-ready rich text.
///
/// An opaque marker wrapper: downstream consumers treat the contents as
/// sanitized HTML and do not reparse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(String);

impl RichText {
	pub fn new(html: impl Into<String>) -> Self {
		Self(html.into())
	}

	pub fn as_html(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for RichText {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Rewrites internal page links in rich-text source.
///
/// # Examples
///
/// ```
/// use nuages::pages::{MemoryPageResolver, PageRecord};
/// use nuages::richtext::RichTextRewriter;
///
/// # async fn demo() {
/// let pages = MemoryPageResolver::new();
/// pages.insert(PageRecord::new(5, "StandardPage", "about", "/about/"));
/// let rewriter = RichTextRewriter::new(pages);
///
/// let rich = rewriter
/// 	.rewrite(r#"<p>See <a linktype="page" id="5">About</a>.</p>"#)
/// 	.await
/// 	.unwrap();
/// assert!(rich.as_html().contains(r#"href="/about/""#));
/// assert!(rich.as_html().contains(r#"data-page-slug="about""#));
/// # }
/// ```
pub struct RichTextRewriter<P> {
	pages: P,
}

impl<P: PageResolver> RichTextRewriter<P> {
	pub fn new(pages: P) -> Self {
		Self { pages }
	}

	/// Rewrite every `<a linktype="page">` in `source` and wrap the result.
	///
	/// Only the opening (or self-closing) anchor tag is replaced; inner
	/// content and the closing `</a>` pass through untouched. The output of
	/// a rewrite contains no `linktype` markers, so rewriting it again is
	/// the identity.
	pub async fn rewrite(&self, source: &str) -> Result<RichText, RichTextError> {
		let mut reader = Reader::from_str(source);
		let mut out = String::with_capacity(source.len());
		// Source bytes emitted so far; spans between rewritten anchors are
		// copied verbatim.
		let mut copied = 0usize;

		loop {
			let tag_start = reader.buffer_position() as usize;
			match reader.read_event() {
				Ok(Event::Start(tag)) if tag.name().as_ref() == b"a" => {
					if attr_value(&tag, b"linktype")?.as_deref() == Some("page") {
						let tag_end = reader.buffer_position() as usize;
						let id = attr_value(&tag, b"id")?;
						out.push_str(&source[copied..tag_start]);
						self.render_anchor(&mut out, id, false).await?;
						copied = tag_end;
					}
				}
				Ok(Event::Empty(tag)) if tag.name().as_ref() == b"a" => {
					if attr_value(&tag, b"linktype")?.as_deref() == Some("page") {
						let tag_end = reader.buffer_position() as usize;
						let id = attr_value(&tag, b"id")?;
						out.push_str(&source[copied..tag_start]);
						self.render_anchor(&mut out, id, true).await?;
						copied = tag_end;
					}
				}
				Ok(Event::Eof) => break,
				Ok(_) => {}
				Err(err) => return Err(RichTextError::Parse(err)),
			}
		}

		out.push_str(&source[copied..]);
		Ok(RichText::new(out))
	}

	async fn render_anchor(
		&self,
		out: &mut String,
		id: Option<String>,
		self_closing: bool,
	) -> Result<(), RichTextError> {
		let id = id.ok_or(RichTextError::MissingPageId)?;
		match self.pages.resolve(&id).await {
			Ok(page) => {
				tracing::trace!(id = %id, slug = %page.slug, "resolved page link");
				render_page_anchor(out, &page, self_closing);
			}
			Err(PageLookupError::NotFound(_)) => {
				// Dangling links degrade to plain text-in-anchor instead of
				// disappearing.
				tracing::trace!(id = %id, "page link target not found");
				out.push_str(if self_closing { "<a/>" } else { "<a>" });
			}
			Err(err) => return Err(RichTextError::PageLookup(err)),
		}
		Ok(())
	}
}

fn render_page_anchor(out: &mut String, page: &ResolvedPage, self_closing: bool) {
	let url = escape(page.front_end_url());
	out.push_str("<a href=\"");
	out.push_str(&url);
	out.push_str("\" data-page-type=\"");
	out.push_str(&escape(page.type_name.as_str()));
	out.push_str("\" data-page-slug=\"");
	out.push_str(&escape(page.slug.as_str()));
	out.push_str("\" data-page-url=\"");
	out.push_str(&url);
	out.push_str(if self_closing { "\"/>" } else { "\">" });
}

/// First value of the named attribute, if present.
fn attr_value(tag: &BytesStart, name: &[u8]) -> Result<Option<String>, RichTextError> {
	for attr in tag.attributes() {
		let attr = attr.map_err(|err| RichTextError::Attr(err.to_string()))?;
		if attr.key.as_ref() == name {
			return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
		}
	}
	Ok(None)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pages::{MemoryPageResolver, PageRecord};
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn attribute_values_are_escaped() {
		let pages = MemoryPageResolver::new();
		pages.insert(
			PageRecord::new(1, "EventPage", "food & drink", "/events/?a=1&b=2"),
		);
		let rewriter = RichTextRewriter::new(pages);

		let rich = rewriter
			.rewrite(r#"<a linktype="page" id="1">Events</a>"#)
			.await
			.unwrap();
		assert!(rich.as_html().contains("href=\"/events/?a=1&amp;b=2\""));
		assert!(rich.as_html().contains("data-page-slug=\"food &amp; drink\""));
	}

	#[rstest]
	fn rich_text_displays_as_its_html() {
		let rich = RichText::new("<p>hi</p>");
		assert_eq!(rich.to_string(), "<p>hi</p>");
		assert_eq!(rich.as_html(), "<p>hi</p>");
		assert_eq!(rich.into_inner(), "<p>hi</p>");
	}
}
