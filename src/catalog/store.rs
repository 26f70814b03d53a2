//! In-memory catalog mirrored from the upload tree.

use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::entry::{CatalogEntry, is_supported};
use super::error::CatalogError;
use crate::config::LibraryLayout;
use crate::convert::is_convertible;
use crate::download::filename::{clean_subject_name, subject_folder_name};
use crate::metadata::{UNKNOWN, parse_filename};

/// Folder used for imports and edits without a usable subject.
pub const MISC_FOLDER: &str = "Misc";

/// New properties for [`CatalogStore::rename_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryProperties {
    /// Subject; also the target folder.
    pub subject: String,
    /// Year text.
    pub year: String,
    /// Exam number; lower-cased on rename.
    pub exam_number: String,
}

/// Result of importing a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The file was copied to this path.
    Imported(PathBuf),
    /// A file with the same name was already in the subject folder.
    AlreadyPresent(PathBuf),
}

impl ImportOutcome {
    /// Path inside the library.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Imported(path) | Self::AlreadyPresent(path) => path,
        }
    }
}

/// Catalog of every report under the upload root.
///
/// Entries are rebuilt from disk by [`scan`](Self::scan); conversion progress
/// is keyed by source path and survives rescans.
#[derive(Debug)]
pub struct CatalogStore {
    layout: LibraryLayout,
    entries: Vec<CatalogEntry>,
    progress_by_path: HashMap<PathBuf, u8>,
}

impl CatalogStore {
    /// Creates an empty store over `layout`.
    #[must_use]
    pub fn new(layout: LibraryLayout) -> Self {
        Self {
            layout,
            entries: Vec::new(),
            progress_by_path: HashMap::new(),
        }
    }

    /// Library layout.
    #[must_use]
    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    /// Rebuilds all entries from the subject folders under the upload root.
    ///
    /// Returns the Word documents that still need conversion, in catalog
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the upload root or a subject folder
    /// cannot be read.
    #[instrument(skip(self), fields(root = %self.layout.upload_root().display()))]
    pub fn scan(&mut self) -> Result<Vec<PathBuf>, CatalogError> {
        let mut entries = Vec::new();

        for subject_dir in sorted_children(self.layout.upload_root())? {
            if !subject_dir.is_dir() || subject_dir == self.layout.converted_dir() {
                continue;
            }
            let folder_subject = subject_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for file in sorted_children(&subject_dir)? {
                if !file.is_file() || !is_supported(&file) {
                    continue;
                }
                entries.push(self.build_entry(file, &folder_subject));
            }
        }

        sort_entries(&mut entries);
        self.entries = entries;

        let needing: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|e| e.needs_conversion())
            .map(|e| e.source_path.clone())
            .collect();
        debug!(
            entries = self.entries.len(),
            needing_conversion = needing.len(),
            "catalog rescanned"
        );
        Ok(needing)
    }

    fn build_entry(&self, file: PathBuf, folder_subject: &str) -> CatalogEntry {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = parse_filename(&file_name);
        let subject = if folder_subject.is_empty() {
            metadata.subject
        } else {
            folder_subject.to_string()
        };

        let (renderable_path, conversion_progress) = if is_convertible(&file) {
            let pdf = self.layout.converted_pdf_for(&file);
            let progress = self.progress(&file);
            (pdf.is_file().then_some(pdf), progress)
        } else {
            (Some(file.clone()), 0)
        };

        CatalogEntry {
            source_path: file,
            subject,
            year: metadata.year,
            exam_number: metadata.exam_number,
            renderable_path,
            conversion_progress,
        }
    }

    /// All entries, sorted by subject, year descending, exam number.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry with source path `path`.
    #[must_use]
    pub fn entry(&self, path: &Path) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.source_path == path)
    }

    /// Maps a user-supplied path onto an entry's source path.
    ///
    /// Exact matches win; otherwise both sides are canonicalized.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if let Some(entry) = self.entry(path) {
            return Some(entry.source_path.clone());
        }
        let wanted = std::fs::canonicalize(path).ok()?;
        self.entries
            .iter()
            .find(|e| std::fs::canonicalize(&e.source_path).is_ok_and(|p| p == wanted))
            .map(|e| e.source_path.clone())
    }

    /// Entries matching an optional subject and an optional year.
    #[must_use]
    pub fn filtered(&self, subject: Option<&str>, year: Option<&str>) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| subject.is_none_or(|s| e.subject == s))
            .filter(|e| year.is_none_or(|y| e.year == y))
            .collect()
    }

    /// Distinct subjects, sorted.
    #[must_use]
    pub fn subjects(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.subject.clone()).collect()
    }

    /// Distinct years, sorted.
    #[must_use]
    pub fn years(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.year.clone()).collect()
    }

    /// Conversion progress recorded for `path`.
    #[must_use]
    pub fn progress(&self, path: &Path) -> u8 {
        self.progress_by_path.get(path).copied().unwrap_or(0)
    }

    /// Records conversion progress, clamped to 100.
    pub fn set_progress(&mut self, path: &Path, percent: u8) {
        let percent = percent.min(100);
        self.progress_by_path.insert(path.to_path_buf(), percent);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.source_path == path) {
            entry.conversion_progress = percent;
        }
    }

    /// Copies `file` into `<upload_root>/<parsed subject or Misc>/`.
    ///
    /// An existing file of the same name is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unsupported`] for other file types and
    /// [`CatalogError::Io`] if the copy fails.
    #[instrument(skip(self), fields(file = %file.display()))]
    pub fn import_file(&self, file: &Path) -> Result<ImportOutcome, CatalogError> {
        if !is_supported(file) {
            return Err(CatalogError::Unsupported {
                path: file.to_path_buf(),
            });
        }
        let Some(file_name) = file.file_name() else {
            return Err(CatalogError::Unsupported {
                path: file.to_path_buf(),
            });
        };

        let metadata = parse_filename(&file_name.to_string_lossy());
        let folder = if metadata.subject == UNKNOWN {
            MISC_FOLDER.to_string()
        } else {
            subject_folder_name(&metadata.subject)
        };
        let folder_path = self.layout.subject_dir(&folder);
        std::fs::create_dir_all(&folder_path).map_err(|e| CatalogError::io(&folder_path, e))?;

        let destination = folder_path.join(file_name);
        if destination.exists() {
            debug!(destination = %destination.display(), "already in library");
            return Ok(ImportOutcome::AlreadyPresent(destination));
        }

        std::fs::copy(file, &destination).map_err(|e| CatalogError::io(&destination, e))?;
        info!(destination = %destination.display(), "imported report");
        Ok(ImportOutcome::Imported(destination))
    }

    /// Renames an entry to
    /// `<upload_root>/<subject or Misc>/<subject>_<year>_<exam><ext>`.
    ///
    /// A converted PDF is renamed alongside and recorded progress moves to
    /// the new path. Conversion queue bookkeeping is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EntryNotFound`] for unknown paths,
    /// [`CatalogError::TargetExists`] if the new source or PDF name is
    /// taken, and [`CatalogError::Io`] if a rename fails.
    #[instrument(skip(self, properties), fields(path = %path.display()))]
    pub fn rename_entry(
        &mut self,
        path: &Path,
        properties: &EntryProperties,
    ) -> Result<PathBuf, CatalogError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.source_path == path)
            .ok_or_else(|| CatalogError::not_found(path))?;

        let subject = clean_subject_name(&properties.subject);
        let folder = if subject.is_empty() {
            MISC_FOLDER.to_string()
        } else {
            subject_folder_name(&subject)
        };
        let year = clean_subject_name(&properties.year);
        let exam_number = clean_subject_name(&properties.exam_number).to_lowercase();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let folder_path = self.layout.subject_dir(&folder);
        let new_path = folder_path.join(format!("{folder}_{year}_{exam_number}{ext}"));
        if new_path == path {
            return Ok(new_path);
        }
        if new_path.exists() {
            return Err(CatalogError::TargetExists { path: new_path });
        }

        let converted = is_convertible(path).then(|| {
            (
                self.layout.converted_pdf_for(path),
                self.layout.converted_pdf_for(&new_path),
            )
        });
        if let Some((old_pdf, new_pdf)) = &converted
            && old_pdf.is_file()
            && old_pdf != new_pdf
            && new_pdf.exists()
        {
            return Err(CatalogError::TargetExists {
                path: new_pdf.clone(),
            });
        }

        std::fs::create_dir_all(&folder_path).map_err(|e| CatalogError::io(&folder_path, e))?;
        std::fs::rename(path, &new_path).map_err(|e| CatalogError::io(path, e))?;

        let renderable_path = match converted {
            Some((old_pdf, new_pdf)) if old_pdf.is_file() => {
                if let Err(e) = std::fs::rename(&old_pdf, &new_pdf) {
                    if let Err(undo) = std::fs::rename(&new_path, path) {
                        warn!(
                            path = %new_path.display(),
                            error = %undo,
                            "failed to restore source after converted PDF rename failed"
                        );
                    }
                    return Err(CatalogError::io(&old_pdf, e));
                }
                Some(new_pdf)
            }
            Some(_) => None,
            None => Some(new_path.clone()),
        };

        let progress = self.progress_by_path.remove(path).unwrap_or(0);
        self.progress_by_path.insert(new_path.clone(), progress);

        let entry = &mut self.entries[index];
        entry.source_path = new_path.clone();
        entry.subject = folder;
        entry.year = year;
        entry.exam_number = exam_number;
        entry.renderable_path = renderable_path;
        entry.conversion_progress = progress;
        sort_entries(&mut self.entries);

        info!(new_path = %new_path.display(), "renamed report");
        Ok(new_path)
    }

    /// Deletes an entry's source file and its distinct converted PDF.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EntryNotFound`] for unknown paths and
    /// [`CatalogError::Io`] if a file cannot be removed.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn delete_entry(&mut self, path: &Path) -> Result<(), CatalogError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.source_path == path)
            .ok_or_else(|| CatalogError::not_found(path))?;
        let entry = self.entries.remove(index);

        remove_if_present(&entry.source_path)?;
        if let Some(pdf) = &entry.renderable_path
            && pdf != &entry.source_path
        {
            remove_if_present(pdf)?;
        }
        self.progress_by_path.remove(path);

        info!("deleted report");
        Ok(())
    }
}

fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "directory missing during scan");
            return Ok(Vec::new());
        }
        Err(e) => return Err(CatalogError::io(dir, e)),
    };
    let mut children = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| CatalogError::io(dir, e))?;
        children.push(item.path());
    }
    children.sort();
    Ok(children)
}

fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| {
        a.subject
            .to_lowercase()
            .cmp(&b.subject.to_lowercase())
            .then_with(|| b.year_value().cmp(&a.year_value()))
            .then_with(|| a.exam_number.cmp(&b.exam_number))
    });
}

fn remove_if_present(path: &Path) -> Result<(), CatalogError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CatalogError::io(path, e)),
    }
}
