//! Library layout and remote site configuration.
//!
//! Every component receives its directories and URLs explicitly at
//! construction; nothing reads process-wide globals. [`LibraryLayout::init`]
//! is the single initialization step that makes sure the upload root and the
//! converted-output directory exist before any component runs.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use url::Url;

use crate::catalog::CatalogError;
use crate::convert::expected_pdf;

/// Name of the directory under the upload root that holds converted PDFs.
pub const CONVERTED_DIR_NAME: &str = "converted";

/// Default upload root, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploaded_reports";

/// Site root used to resolve relative links.
pub const DEFAULT_BASE_URL: &str = "https://www.vcaa.vic.edu.au";

/// Index page listing one link per subject.
pub const DEFAULT_INDEX_URL: &str = "https://www.vcaa.vic.edu.au/assessment/vce/examination-specifications-past-examinations-and-examination-reports/examination-specifications-past-examinations-and-external-assessment-reports";

/// Path prefix every subject page lives under.
pub const REPORTS_PATH_PREFIX: &str =
    "/assessment/vce/examination-specifications-past-examinations-and-examination-reports/";

/// Path fragment identifying VET subjects, which are not part of the catalog.
pub const VET_PATH_EXCLUSION: &str = "/vce-vet-";

/// On-disk layout of the report library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    upload_root: PathBuf,
    converted_dir: PathBuf,
}

impl LibraryLayout {
    /// Creates a layout rooted at `upload_root`, with converted output in
    /// `<upload_root>/converted`.
    #[must_use]
    pub fn new(upload_root: impl Into<PathBuf>) -> Self {
        let upload_root = upload_root.into();
        let converted_dir = upload_root.join(CONVERTED_DIR_NAME);
        Self {
            upload_root,
            converted_dir,
        }
    }

    /// Creates both directories if they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if either directory cannot be created.
    #[instrument(skip(self), fields(root = %self.upload_root.display()))]
    pub fn init(&self) -> Result<(), CatalogError> {
        for dir in [&self.upload_root, &self.converted_dir] {
            std::fs::create_dir_all(dir).map_err(|e| CatalogError::io(dir.clone(), e))?;
        }
        debug!("library directories ready");
        Ok(())
    }

    /// Root directory holding one folder per subject.
    #[must_use]
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// Directory holding converted PDFs.
    #[must_use]
    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }

    /// Expected location of the converted PDF for `source`.
    #[must_use]
    pub fn converted_pdf_for(&self, source: &Path) -> PathBuf {
        expected_pdf(source, &self.converted_dir)
    }

    /// Folder for `subject_folder_name` under the upload root.
    #[must_use]
    pub fn subject_dir(&self, subject_folder_name: &str) -> PathBuf {
        self.upload_root.join(subject_folder_name)
    }
}

impl Default for LibraryLayout {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_DIR)
    }
}

/// Remote site locations used by discovery and downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Base URL for resolving relative links.
    pub base_url: Url,
    /// Subject index page.
    pub index_url: Url,
}

impl SiteConfig {
    /// Creates a site config from an index URL, using its origin as the base.
    ///
    /// # Errors
    ///
    /// Returns the URL parse error if `index_url` is not an absolute URL.
    pub fn from_index_url(index_url: &str) -> Result<Self, url::ParseError> {
        let index_url = Url::parse(index_url)?;
        let base_url = index_url.join("/")?;
        Ok(Self {
            base_url,
            index_url,
        })
    }
}

impl Default for SiteConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        // Static constants; covered by `test_site_config_default_parses`.
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            index_url: Url::parse(DEFAULT_INDEX_URL).expect("default index URL is valid"),
        }
    }
}
