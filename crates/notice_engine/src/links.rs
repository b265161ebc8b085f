use std::sync::LazyLock;

use notice_logging::notice_debug;
use scraper::{Html, Selector};
use url::Url;

/// Member links of a package index page.
pub const PACKAGE_LINK_SELECTOR: &str = "a.ADAMSLink[href]";
const DEFAULT_MAX_LINKS: usize = 500;

static PACKAGE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(PACKAGE_LINK_SELECTOR).unwrap());

/// Finds the member documents of a package index page, in document order.
#[derive(Debug, Clone)]
pub struct PackageLinkFinder {
    max_links: usize,
}

impl PackageLinkFinder {
    pub fn new() -> Self {
        Self::with_max_links(DEFAULT_MAX_LINKS)
    }

    pub fn with_max_links(max_links: usize) -> Self {
        Self { max_links }
    }

    pub fn find(&self, html: &str, index_url: Option<&Url>) -> Vec<Url> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();
        for anchor in document.select(&PACKAGE_LINK_SEL) {
            if links.len() >= self.max_links {
                notice_debug!("package link cap of {} reached", self.max_links);
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            match resolve_url(href, index_url) {
                Some(url) => links.push(url),
                None => notice_debug!("skipping unresolvable package link {href:?}"),
            }
        }
        links
    }
}

impl Default for PackageLinkFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute links pass through; relative ones are joined onto `base`.
pub fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_links_keep_document_order_and_resolve_relative_hrefs() {
        let html = r#"<html><body>
<a class="ADAMSLink" href="../docs/ML1900A123.pdf">first</a>
<a href="/ignored.pdf">plain link</a>
<a class="other ADAMSLink" href="https://example.org/ML1900A124.pdf">second</a>
<a class="ADAMSLink">no href</a>
</body></html>"#;
        let base = Url::parse("https://example.org/reading/pkg/ML1900A122.html").unwrap();
        let links = PackageLinkFinder::new().find(html, Some(&base));
        let links: Vec<String> = links.into_iter().map(String::from).collect();
        assert_eq!(
            links,
            vec![
                "https://example.org/reading/docs/ML1900A123.pdf".to_string(),
                "https://example.org/ML1900A124.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn fragment_and_script_links_are_not_resolved() {
        assert_eq!(resolve_url("#top", None), None);
        assert_eq!(resolve_url("javascript:void(0)", None), None);
        assert_eq!(resolve_url("relative.pdf", None), None);
    }
}
