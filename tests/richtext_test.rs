//! Behavioral tests for rich-text page-link rewriting.

use nuages::pages::{MemoryPageResolver, PageRecord};
use nuages::richtext::{RichTextError, RichTextRewriter};
use rstest::rstest;

fn rewriter() -> RichTextRewriter<MemoryPageResolver> {
	let pages = MemoryPageResolver::new();
	pages.insert(PageRecord::new(5, "StandardPage", "about", "/about/"));
	pages.insert(
		PageRecord::new(7, "BlogPage", "launch", "/blog/launch/")
			.with_url("https://example.com/blog/launch/"),
	);
	pages.insert(PageRecord::new(8, "BlogPage", "draft-post", "/blog/draft-post/").draft());
	pages.insert(PageRecord::new(9, "BlogPage", "members", "/blog/members/").private());
	RichTextRewriter::new(pages)
}

#[rstest]
#[tokio::test]
async fn page_links_gain_href_and_routing_metadata() {
	let rich = rewriter()
		.rewrite(r#"<p>Go <a linktype="page" id="5">here</a> now.</p>"#)
		.await
		.unwrap();
	assert_eq!(
		rich.as_html(),
		r#"<p>Go <a href="/about/" data-page-type="StandardPage" data-page-slug="about" data-page-url="/about/">here</a> now.</p>"#
	);
}

#[rstest]
#[tokio::test]
async fn cached_url_is_preferred_over_url_path() {
	let rich = rewriter()
		.rewrite(r#"<a linktype="page" id="7">Launch</a>"#)
		.await
		.unwrap();
	assert_eq!(
		rich.as_html(),
		r#"<a href="https://example.com/blog/launch/" data-page-type="BlogPage" data-page-slug="launch" data-page-url="https://example.com/blog/launch/">Launch</a>"#
	);
}

#[rstest]
#[tokio::test]
async fn inner_markup_is_preserved() {
	let rich = rewriter()
		.rewrite(r#"<a linktype="page" id="5">read <b>all</b> about it</a>"#)
		.await
		.unwrap();
	assert_eq!(
		rich.as_html(),
		r#"<a href="/about/" data-page-type="StandardPage" data-page-slug="about" data-page-url="/about/">read <b>all</b> about it</a>"#
	);
}

#[rstest]
#[case::missing("404")]
#[case::draft("8")]
#[case::private("9")]
#[tokio::test]
async fn unresolvable_page_links_degrade_to_bare_anchors(#[case] id: &str) {
	let source = format!(r#"<p><a linktype="page" id="{id}">Gone</a></p>"#);
	let rich = rewriter().rewrite(&source).await.unwrap();
	assert_eq!(rich.as_html(), "<p><a>Gone</a></p>");
}

#[rstest]
#[tokio::test]
async fn non_page_anchors_pass_through_unchanged() {
	let source = concat!(
		r#"<p>An <a href="https://example.com" target="_blank">external link</a>, "#,
		r#"a <a linktype="document" id="3">document link</a> and an <a>empty anchor</a>.</p>"#
	);
	let rich = rewriter().rewrite(source).await.unwrap();
	assert_eq!(rich.as_html(), source);
}

#[rstest]
#[tokio::test]
async fn markup_without_anchors_passes_through_unchanged() {
	let source = r#"<h2>Title</h2><p>Plain <i>rich</i> text with an image <embed embedtype="image" id="12"/>.</p>"#;
	let rich = rewriter().rewrite(source).await.unwrap();
	assert_eq!(rich.as_html(), source);
}

#[rstest]
#[tokio::test]
async fn rewriting_is_idempotent() {
	let source = concat!(
		r#"<p><a linktype="page" id="5">About</a>, <a linktype="page" id="404">gone</a> "#,
		r#"and <a href="/raw/">raw</a>.</p>"#
	);
	let rewriter = rewriter();
	let once = rewriter.rewrite(source).await.unwrap();
	let twice = rewriter.rewrite(once.as_html()).await.unwrap();
	assert_eq!(once, twice);
}

#[rstest]
#[tokio::test]
async fn self_closing_page_anchors_are_rewritten() {
	let rich = rewriter()
		.rewrite(r#"<p><a linktype="page" id="5"/></p>"#)
		.await
		.unwrap();
	assert_eq!(
		rich.as_html(),
		r#"<p><a href="/about/" data-page-type="StandardPage" data-page-slug="about" data-page-url="/about/"/></p>"#
	);
}

#[rstest]
#[tokio::test]
async fn malformed_page_ids_propagate() {
	let result = rewriter()
		.rewrite(r#"<a linktype="page" id="not-a-pk">x</a>"#)
		.await;
	assert!(matches!(result, Err(RichTextError::PageLookup(_))));
}

#[rstest]
#[tokio::test]
async fn page_links_without_an_id_are_an_error() {
	let result = rewriter().rewrite(r#"<a linktype="page">x</a>"#).await;
	assert!(matches!(result, Err(RichTextError::MissingPageId)));
}

#[rstest]
#[tokio::test]
async fn malformed_markup_propagates() {
	let result = rewriter().rewrite(r#"<p>broken</b>"#).await;
	assert!(matches!(result, Err(RichTextError::Parse(_))));
}

#[rstest]
#[tokio::test]
async fn multiple_page_links_are_each_rewritten() {
	let rich = rewriter()
		.rewrite(concat!(
			r#"<p><a linktype="page" id="5">About</a> and "#,
			r#"<a linktype="page" id="7">Launch</a></p>"#
		))
		.await
		.unwrap();
	let html = rich.as_html();
	assert!(html.contains(r#"href="/about/""#));
	assert!(html.contains(r#"href="https://example.com/blog/launch/""#));
	assert!(!html.contains("linktype"));
}

#[rstest]
#[tokio::test]
async fn plain_text_sources_are_untouched() {
	let rich = rewriter().rewrite("just words").await.unwrap();
	assert_eq!(rich.as_html(), "just words");
}
