//! Subject discovery: scrapes the report index into a name → URL map.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};
use url::Url;

use super::client::HttpClient;
use super::error::DiscoveryError;
use super::links::{extract_anchors, resolve_link};
use crate::config::{REPORTS_PATH_PREFIX, SiteConfig, VET_PATH_EXCLUSION};

/// Subject display name → subject page URL, ordered by name.
pub type SubjectCatalog = BTreeMap<String, Url>;

/// Fetches the subject index and extracts subject links.
#[derive(Debug, Clone)]
pub struct SubjectDiscovery {
    client: HttpClient,
    site: SiteConfig,
}

impl SubjectDiscovery {
    /// Creates a discovery service for `site`.
    #[must_use]
    pub fn new(client: HttpClient, site: SiteConfig) -> Self {
        Self { client, site }
    }

    /// Fetches the index page and returns every subject link on it.
    ///
    /// The map is rebuilt on every call. When two links share display text the
    /// later one wins.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Fetch`] if the index cannot be fetched and
    /// [`DiscoveryError::NoSubjectsFound`] if no link survives filtering.
    #[instrument(skip(self), fields(index = %self.site.index_url))]
    pub async fn discover_subjects(&self) -> Result<SubjectCatalog, DiscoveryError> {
        let html = self.client.fetch_text(self.site.index_url.as_str()).await?;
        let subjects = subjects_from_index(&html, &self.site);

        if subjects.is_empty() {
            return Err(DiscoveryError::NoSubjectsFound {
                url: self.site.index_url.to_string(),
            });
        }

        info!(count = subjects.len(), "discovered subjects");
        Ok(subjects)
    }
}

/// Extracts subject links from index page HTML.
#[must_use]
pub fn subjects_from_index(html: &str, site: &SiteConfig) -> SubjectCatalog {
    let index_key = comparable(&site.index_url);
    let mut subjects = SubjectCatalog::new();

    for anchor in extract_anchors(html) {
        let Some(mut url) = resolve_link(&site.base_url, &anchor.href) else {
            continue;
        };
        url.set_fragment(None);

        let path = url.path().to_lowercase();
        if path.contains(VET_PATH_EXCLUSION) || !path.starts_with(REPORTS_PATH_PREFIX) {
            continue;
        }
        if comparable(&url) == index_key || anchor.text.is_empty() {
            continue;
        }

        debug!(subject = %anchor.text, url = %url, "subject link");
        subjects.insert(anchor.text, url);
    }

    subjects
}

fn comparable(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}
