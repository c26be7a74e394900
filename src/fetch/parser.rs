//! HTML parser for extracting anchors and metadata
//!
//! Hrefs are returned exactly as written so that link discovery can apply its
//! own fragment, origin and deduplication rules.

use super::Anchor;
use scraper::{Html, Selector};

/// Schemes that never lead to a fetchable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// What link discovery needs from one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Trimmed `<title>` text, if any
    pub title: Option<String>,

    /// `<a href>` targets in document order
    pub anchors: Vec<Anchor>,
}

/// Returns every `<a href>` of the page in document order
///
/// Duplicates, fragments and empty hrefs are kept. Download links and
/// `javascript:`, `mailto:`, `tel:` or `data:` targets are dropped, since none
/// of them names a page.
///
/// # Example
///
/// ```
/// use scroll_scribe::fetch::extract_anchors;
///
/// let html = r#"<html><head><title>Docs</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = extract_anchors(html);
/// assert_eq!(parsed.title.as_deref(), Some("Docs"));
/// assert_eq!(parsed.anchors[0].href, "/page");
/// ```
pub fn extract_anchors(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        anchors: collect_anchors(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("head > title, title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.trim();

    (!title.is_empty()).then(|| title.to_string())
}

fn collect_anchors(document: &Html) -> Vec<Anchor> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !has_skipped_scheme(href))
        .map(Anchor::new)
        .collect()
}

fn has_skipped_scheme(href: &str) -> bool {
    let href = href.trim_start().to_ascii_lowercase();
    SKIPPED_SCHEMES.iter().any(|scheme| href.starts_with(scheme))
}
