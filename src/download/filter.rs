//! Report link filtering for subject pages.

use url::Url;

use crate::remote::links::{extract_anchors, resolve_link};

/// Substrings that mark a link as something other than an examination report.
pub const EXCLUDE_HINTS: &[&str] = &[
    "sample",
    "formula",
    "data book",
    "data-book",
    "databook",
    "assessment guide",
    "transcript",
];

/// Token the link text must contain.
pub const REPORT_TOKEN: &str = "report";

/// Downloadable report extensions.
pub const REPORT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Returns true when a link looks like a downloadable examination report.
///
/// The check is case-insensitive: no exclusion hint in the URL or text, the
/// text mentions `report`, and the URL ends with a report extension.
#[must_use]
pub fn is_report_link(url: &str, text: &str) -> bool {
    let url = url.to_lowercase();
    let text = text.to_lowercase();

    if EXCLUDE_HINTS
        .iter()
        .any(|hint| url.contains(hint) || text.contains(hint))
    {
        return false;
    }
    if !text.contains(REPORT_TOKEN) {
        return false;
    }
    REPORT_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
}

/// Collects report links from a subject page, resolved against `base` and
/// deduplicated in document order.
#[must_use]
pub fn report_links(html: &str, base: &Url) -> Vec<Url> {
    let mut links: Vec<Url> = Vec::new();
    for anchor in extract_anchors(html) {
        let Some(mut url) = resolve_link(base, &anchor.href) else {
            continue;
        };
        url.set_fragment(None);
        if !is_report_link(url.as_str(), &anchor.text) {
            continue;
        }
        if !links.contains(&url) {
            links.push(url);
        }
    }
    links
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_report_link_accepts_report_documents() {
        assert!(is_report_link("/files/2023chem-report.pdf", "2023 Examination Report"));
        assert!(is_report_link("/files/2019-MM.DOCX", "Exam 1 REPORT"));
        assert!(is_report_link("/files/old.doc", "report"));
    }

    #[test]
    fn test_is_report_link_rejects_excluded_hints() {
        assert!(!is_report_link("/files/2023chem-sample.pdf", "Sample report"));
        assert!(!is_report_link("/files/data-book.pdf", "Report"));
        assert!(!is_report_link("/files/a.pdf", "Formula sheet report"));
        assert!(!is_report_link("/files/a.pdf", "Assessment guide report"));
        assert!(!is_report_link("/files/transcript-report.pdf", "Report"));
    }

    #[test]
    fn test_is_report_link_requires_token_and_extension() {
        assert!(!is_report_link("/files/2023chem.pdf", "2023 Examination"));
        assert!(!is_report_link("/files/2023chem-report.html", "Report"));
        assert!(!is_report_link("/files/report.pdf?v=2", "Report"));
    }

    #[test]
    fn test_report_links_resolves_and_deduplicates() {
        let base = Url::parse("https://www.example.edu/").unwrap();
        let html = r#"
            <a href="/files/2023-chem-report.pdf">2023 report</a>
            <a href="/files/2023-chem-report.pdf#page=2">2023 report again</a>
            <a href="https://cdn.example.edu/2022-chem-report.docx">2022 Report</a>
            <a href="/files/2023-chem-exam.pdf">2023 exam</a>
        "#;
        let links = report_links(html, &base);
        assert_eq!(
            links.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec![
                "https://www.example.edu/files/2023-chem-report.pdf",
                "https://cdn.example.edu/2022-chem-report.docx",
            ]
        );
    }
}
