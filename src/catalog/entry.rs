//! Catalog entry type.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convert::is_convertible;

/// Extensions the catalog lists (lower-case, without the dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Returns true for `.pdf`, `.doc` and `.docx` files, any case.
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// One report in the library. Identity is `source_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Canonical source file path; doubles as the entry id.
    pub source_path: PathBuf,
    /// Enclosing folder name.
    pub subject: String,
    /// Four-digit year or `Unknown`.
    pub year: String,
    /// `examN` or `Unknown`.
    pub exam_number: String,
    /// PDF to display: the source itself, or its converted copy once it exists.
    pub renderable_path: Option<PathBuf>,
    /// Conversion progress, 0..=100.
    pub conversion_progress: u8,
}

impl CatalogEntry {
    /// Display label, `{subject}_{year}_{exam}.pdf`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}_{}_{}.pdf", self.subject, self.year, self.exam_number)
    }

    /// True for Word documents without a converted PDF.
    #[must_use]
    pub fn needs_conversion(&self) -> bool {
        self.renderable_path.is_none() && is_convertible(&self.source_path)
    }

    /// Numeric year for ordering; non-numeric years sort as 0.
    #[must_use]
    pub fn year_value(&self) -> u32 {
        self.year.parse().unwrap_or(0)
    }
}
