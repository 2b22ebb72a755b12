//! Plain-text extraction from article HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("static selector"));
static HEADLINE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("static selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));

/// Concatenate the text of every `<p>` element, joined by single spaces.
///
/// Whitespace inside a paragraph is collapsed and empty paragraphs are
/// dropped, so the result never contains runs of spaces. Returns an empty
/// string when the page has no paragraph text.
pub fn extract_paragraph_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    doc.select(&PARAGRAPH)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort headline: first non-empty `<h1>`, then `<title>`.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&HEADLINE)
        .chain(doc.select(&TITLE))
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
