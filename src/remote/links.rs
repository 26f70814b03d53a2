//! Anchor extraction from HTML pages.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").unwrap_or_else(|e| panic!("invalid static selector 'a[href]': {e}"))
});

/// A hyperlink found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute, trimmed.
    pub href: String,
    /// Visible text with whitespace runs collapsed.
    pub text: String,
}

/// Returns every anchor with a non-empty `href`, in document order.
#[must_use]
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            Some(Anchor {
                href: href.to_string(),
                text,
            })
        })
        .collect()
}

/// Resolves `href` against `base`, keeping only http(s) results.
#[must_use]
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_anchors_collects_href_and_text() {
        let html = r#"
            <html><body>
              <a href="/chem/2022.pdf">2022 <b>Chemistry</b>
                 Exam   Report</a>
              <a href="  ">blank</a>
              <a>no href</a>
              <a href="https://example.com/x">  </a>
            </body></html>
        "#;
        let anchors = extract_anchors(html);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].href, "/chem/2022.pdf");
        assert_eq!(anchors[0].text, "2022 Chemistry Exam Report");
        assert_eq!(anchors[1].href, "https://example.com/x");
        assert_eq!(anchors[1].text, "");
    }

    #[test]
    fn test_extract_anchors_tolerates_malformed_html() {
        let anchors = extract_anchors("<a href='/a.pdf'>Report<a href='/b.pdf'>Other");
        assert_eq!(anchors.len(), 2);
    }

    #[test]
    fn test_resolve_link_relative_and_absolute() {
        let base = Url::parse("https://www.example.edu/assessment/index").unwrap();
        assert_eq!(
            resolve_link(&base, "/files/a.pdf").unwrap().as_str(),
            "https://www.example.edu/files/a.pdf"
        );
        assert_eq!(
            resolve_link(&base, "https://cdn.example.edu/b.pdf").unwrap().as_str(),
            "https://cdn.example.edu/b.pdf"
        );
        assert!(resolve_link(&base, "mailto:someone@example.edu").is_none());
        assert!(resolve_link(&base, "javascript:void(0)").is_none());
    }
}
