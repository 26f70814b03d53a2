//! The control context: owns the catalog and the conversion queue.
//!
//! [`Library`] is the only place catalog state changes. Background
//! conversion jobs report through a channel; the owner feeds every event
//! back through [`Library::handle_event`] (or lets
//! [`Library::drain_conversions`] do it), which updates progress, advances
//! the queue, and rescans after each successful conversion.
//!
//! Starting a conversion spawns a tokio task, so every method that may start
//! one must be called from within a tokio runtime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{CatalogError, CatalogStore, EntryProperties, ImportOutcome};
use crate::config::LibraryLayout;
use crate::convert::{ConversionQueue, DocumentConverter, spawn_conversion};
use crate::events::{ConversionEvent, DownloadEvent};

/// Catalog plus sequential conversion pipeline.
pub struct Library {
    store: CatalogStore,
    queue: ConversionQueue,
    converter: Arc<dyn DocumentConverter>,
    events_tx: UnboundedSender<ConversionEvent>,
    events_rx: UnboundedReceiver<ConversionEvent>,
    failed: HashMap<PathBuf, String>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("store", &self.store)
            .field("queue", &self.queue)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl Library {
    /// Creates the library directories, scans them, and starts converting
    /// whatever needs it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directories cannot be created or
    /// read.
    #[instrument(skip(converter), fields(root = %layout.upload_root().display()))]
    pub fn open(
        layout: LibraryLayout,
        converter: Arc<dyn DocumentConverter>,
    ) -> Result<Self, CatalogError> {
        layout.init()?;
        let (events_tx, events_rx) = unbounded_channel();
        let mut library = Self {
            store: CatalogStore::new(layout),
            queue: ConversionQueue::new(),
            converter,
            events_tx,
            events_rx,
            failed: HashMap::new(),
        };
        library.rescan()?;
        Ok(library)
    }

    /// Catalog snapshot.
    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Conversion queue state.
    #[must_use]
    pub fn queue(&self) -> &ConversionQueue {
        &self.queue
    }

    /// Failed conversions and their reasons. These are not re-queued by
    /// rescans until [`retry_conversion`](Self::retry_conversion).
    #[must_use]
    pub fn failures(&self) -> &HashMap<PathBuf, String> {
        &self.failed
    }

    /// Rebuilds the catalog, queues Word documents without a PDF, and starts
    /// the next conversion if idle.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the upload tree cannot be read.
    pub fn rescan(&mut self) -> Result<(), CatalogError> {
        let needing = self.store.scan()?;
        for path in needing {
            if self.failed.contains_key(&path) {
                continue;
            }
            self.queue.enqueue(&path);
        }
        self.start_next_if_idle();
        Ok(())
    }

    /// Queues `path` for conversion and starts it if idle.
    ///
    /// Returns false for non-Word files and paths already queued or active.
    pub fn enqueue_conversion(&mut self, path: &Path) -> bool {
        let added = self.queue.enqueue(path);
        if added {
            let progress = self.store.progress(path);
            self.store.set_progress(path, progress);
        }
        self.start_next_if_idle();
        added
    }

    fn start_next_if_idle(&mut self) {
        let Some(source) = self.queue.dequeue() else {
            return;
        };
        info!(source = %source.display(), pending = self.queue.pending_len(), "starting conversion");
        spawn_conversion(
            Arc::clone(&self.converter),
            source,
            self.store.layout().converted_dir().to_path_buf(),
            self.events_tx.clone(),
        );
    }

    /// Applies one conversion event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the rescan after a success fails.
    pub fn handle_event(&mut self, event: &ConversionEvent) -> Result<(), CatalogError> {
        match event {
            ConversionEvent::Progress { source, percent } => {
                self.store.set_progress(source, *percent);
            }
            ConversionEvent::Succeeded { source, pdf } => {
                debug!(source = %source.display(), pdf = %pdf.display(), "conversion succeeded");
                self.store.set_progress(source, 100);
                self.queue.mark_finished(source);
                self.failed.remove(source);
                self.rescan()?;
            }
            ConversionEvent::Failed { source, reason } => {
                warn!(source = %source.display(), reason = %reason, "conversion failed");
                self.store.set_progress(source, 0);
                self.queue.mark_finished(source);
                self.failed.insert(source.clone(), reason.clone());
                self.start_next_if_idle();
            }
        }
        Ok(())
    }

    /// Waits for the next conversion event. Returns `None` when no job is
    /// active.
    pub async fn next_event(&mut self) -> Option<ConversionEvent> {
        self.queue.active()?;
        self.events_rx.recv().await
    }

    /// Runs queued conversions until the queue is drained, applying every
    /// event. Returns the terminal events in completion order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if a rescan fails.
    pub async fn drain_conversions(&mut self) -> Result<Vec<ConversionEvent>, CatalogError> {
        let mut finished = Vec::new();
        while let Some(event) = self.next_event().await {
            self.handle_event(&event)?;
            if event.is_terminal() {
                finished.push(event);
            }
        }
        Ok(finished)
    }

    /// Imports a local file and rescans.
    ///
    /// # Errors
    ///
    /// See [`CatalogStore::import_file`].
    pub fn import(&mut self, file: &Path) -> Result<ImportOutcome, CatalogError> {
        let outcome = self.store.import_file(file)?;
        self.rescan()?;
        Ok(outcome)
    }

    /// Renames an entry from new properties.
    ///
    /// A pending conversion follows the file to its new path.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ConversionActive`] while the entry is being
    /// converted, plus the errors of [`CatalogStore::rename_entry`].
    pub fn rename_entry(
        &mut self,
        path: &Path,
        properties: &EntryProperties,
    ) -> Result<PathBuf, CatalogError> {
        self.reject_if_active(path)?;

        let was_queued = self.queue.remove(path);
        let new_path = match self.store.rename_entry(path, properties) {
            Ok(new_path) => new_path,
            Err(e) => {
                if was_queued {
                    self.queue.enqueue(path);
                }
                return Err(e);
            }
        };

        if let Some(reason) = self.failed.remove(path) {
            self.failed.insert(new_path.clone(), reason);
        }
        if was_queued {
            self.queue.enqueue(&new_path);
        }
        self.rescan()?;
        Ok(new_path)
    }

    /// Deletes an entry, its converted PDF, and any pending conversion.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ConversionActive`] while the entry is being
    /// converted, plus the errors of [`CatalogStore::delete_entry`].
    pub fn delete_entry(&mut self, path: &Path) -> Result<(), CatalogError> {
        self.reject_if_active(path)?;
        if self.store.entry(path).is_none() {
            return Err(CatalogError::not_found(path));
        }
        self.queue.remove(path);
        self.failed.remove(path);
        self.store.delete_entry(path)?;
        self.rescan()
    }

    /// Clears a recorded failure and queues the document again.
    ///
    /// Returns false when `path` had not failed.
    pub fn retry_conversion(&mut self, path: &Path) -> bool {
        if self.failed.remove(path).is_none() {
            return false;
        }
        self.enqueue_conversion(path)
    }

    /// Applies a download event: each saved file triggers a rescan.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the rescan fails.
    pub fn apply_download_event(&mut self, event: &DownloadEvent) -> Result<(), CatalogError> {
        if let DownloadEvent::FileSaved { path } = event {
            debug!(path = %path.display(), "download saved, rescanning");
            self.rescan()?;
        }
        Ok(())
    }

    fn reject_if_active(&self, path: &Path) -> Result<(), CatalogError> {
        if self.queue.active() == Some(path) {
            return Err(CatalogError::ConversionActive {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}
