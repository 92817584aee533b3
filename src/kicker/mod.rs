pub(crate) mod detail;
pub(crate) mod discovery;
pub(crate) mod extract;

pub(crate) use ::scraper::Html;
use ::scraper::{ElementRef, Selector};
use itertools::Itertools;

use crate::error::Result;
use crate::normalize::collapse_whitespace;
use crate::transport::PageSource;

/// Fetch a URL through `source` and parse the body as an HTML document.
pub(crate) async fn get_document<S: PageSource>(source: &S, url: &str) -> Result<Html> {
    let body = source.fetch_page(url).await?;
    Ok(Html::parse_document(&body))
}

/// Extract trimmed text content from the first element matching `selector`
/// inside `element`. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default()
}

/// All text below `element`, whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().join(" "))
}

/// All text below `element` with every whitespace run removed.
///
/// Scores are often split over several spans (`2`, `:`, `3`).
pub(crate) fn compact_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<String>()
}

pub(crate) fn has_class_containing(element: &ElementRef, needle: &str) -> bool {
    element.value().classes().any(|c| c.contains(needle))
}

/// Text a reader would see: script, style and noscript content is skipped.
pub(crate) fn visible_text(document: &Html) -> String {
    let mut words = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent()?;
            let parent_name = parent.value().as_element()?.name();
            (!matches!(parent_name, "script" | "style" | "noscript")).then_some(&**text)
        })
        .flat_map(str::split_whitespace);
    words.join(" ")
}

/// Make a site-relative link absolute.
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{base_url}{href}")
    } else {
        format!("{base_url}/{href}")
    }
}
