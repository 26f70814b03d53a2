//! Concurrent download of every report for one subject.
//!
//! The orchestrator fetches the subject page, keeps the links that look like
//! examination reports, and downloads them with a bounded worker pool. Each
//! file lands in a reserved `.part` file first and is then linked into place as
//! `{subject}[_year][_examN]{ext}`, taking `_2`, `_3`, ... when the name is
//! already taken. Per-file failures are reported as events and never abort
//! the batch.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DownloadError;
use super::filename::{
    clean_subject_name, create_temp_file, extension_of, final_stem, persist_unique_path,
    subject_folder_name, url_file_name,
};
use super::filter::report_links;
use crate::config::{LibraryLayout, SiteConfig};
use crate::events::DownloadEvent;
use crate::metadata::parse_filename;
use crate::remote::HttpClient;

/// Number of files downloaded in parallel.
pub const DOWNLOAD_WORKERS: usize = 5;

/// Result of a subject batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Subject display name.
    pub subject: String,
    /// Folder the reports were saved in.
    pub folder: PathBuf,
    /// Report links found on the subject page.
    pub total: usize,
    /// Files saved.
    pub completed: usize,
    /// Files that failed.
    pub failed: usize,
    /// Final paths of saved files.
    pub saved: Vec<PathBuf>,
}

impl BatchSummary {
    /// True when the page had no report links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Default)]
struct BatchProgress {
    completed: usize,
    failed: usize,
}

struct BatchContext {
    client: HttpClient,
    folder: PathBuf,
    subject_stem: String,
    total: usize,
    progress: Mutex<BatchProgress>,
    events: UnboundedSender<DownloadEvent>,
}

impl BatchContext {
    fn emit(&self, event: DownloadEvent) {
        // A closed receiver only means nobody is listening any more.
        let _ = self.events.send(event);
    }

    fn record_success(&self, path: &Path, file_name: &str) {
        let Ok(mut progress) = self.progress.lock() else {
            warn!("batch progress lock poisoned");
            return;
        };
        progress.completed += 1;
        // Sent under the lock so `completed` arrives in increasing order.
        self.emit(DownloadEvent::FileSaved {
            path: path.to_path_buf(),
        });
        self.emit(DownloadEvent::Progress {
            message: format!("Finished downloading {file_name}"),
            completed: progress.completed,
            total: self.total,
        });
    }

    fn record_failure(&self, url: &Url, error: &DownloadError) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.failed += 1;
        } else {
            warn!("batch progress lock poisoned");
        }
        self.emit(DownloadEvent::FileFailed {
            url: url.to_string(),
            reason: error.to_string(),
        });
    }

    fn counts(&self) -> (usize, usize) {
        self.progress
            .lock()
            .map(|p| (p.completed, p.failed))
            .unwrap_or_default()
    }
}

/// Downloads subject reports into the library.
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    client: HttpClient,
    layout: LibraryLayout,
    site: SiteConfig,
    workers: usize,
}

impl DownloadOrchestrator {
    /// Creates an orchestrator with [`DOWNLOAD_WORKERS`] workers.
    #[must_use]
    pub fn new(client: HttpClient, layout: LibraryLayout, site: SiteConfig) -> Self {
        Self {
            client,
            layout,
            site,
            workers: DOWNLOAD_WORKERS,
        }
    }

    /// Overrides the worker count (minimum 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Downloads every report linked from `subject_url` into the subject's
    /// folder.
    ///
    /// Emits `Progress("Starting concurrent downloads...")` once, then one
    /// `FileSaved` + `Progress` pair per saved file and one `FileFailed` per
    /// failed file, and finally `Finished`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Fetch`] if the subject page cannot be
    /// fetched and [`DownloadError::Io`] if the subject folder cannot be
    /// created. Individual file failures do not error the batch.
    #[instrument(skip(self, events), fields(subject = %subject_name))]
    pub async fn download_subject(
        &self,
        subject_name: &str,
        subject_url: &str,
        events: &UnboundedSender<DownloadEvent>,
    ) -> Result<BatchSummary, DownloadError> {
        let html = self.client.fetch_text(subject_url).await?;
        let links = report_links(&html, &self.site.base_url);
        let folder = self.layout.subject_dir(&subject_folder_name(subject_name));

        if links.is_empty() {
            info!("no report links on subject page");
            let _ = events.send(DownloadEvent::Finished {
                subject: subject_name.to_string(),
                message: format!("No examination reports found for {subject_name}."),
                completed: 0,
                failed: 0,
                total: 0,
            });
            return Ok(BatchSummary {
                subject: subject_name.to_string(),
                folder,
                ..BatchSummary::default()
            });
        }

        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| DownloadError::io(&folder, e))?;

        let subject_stem = clean_subject_name(subject_name);
        let context = Arc::new(BatchContext {
            client: self.client.clone(),
            folder: folder.clone(),
            subject_stem: if subject_stem.is_empty() {
                subject_folder_name(subject_name)
            } else {
                subject_stem
            },
            total: links.len(),
            progress: Mutex::new(BatchProgress::default()),
            events: events.clone(),
        });

        info!(total = links.len(), workers = self.workers, "starting downloads");
        context.emit(DownloadEvent::Progress {
            message: "Starting concurrent downloads...".to_string(),
            completed: 0,
            total: links.len(),
        });

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(links.len());

        for url in links {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| DownloadError::PoolClosed)?;
            let context = Arc::clone(&context);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                match download_report(&context, &url).await {
                    Ok((path, file_name)) => {
                        debug!(path = %path.display(), "report saved");
                        context.record_success(&path, &file_name);
                        Some(path)
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "report download failed");
                        context.record_failure(&url, &e);
                        None
                    }
                }
            }));
        }

        let mut saved = Vec::new();
        let mut panicked = 0usize;
        for handle in handles {
            match handle.await {
                Ok(Some(path)) => saved.push(path),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "download task panicked");
                    panicked += 1;
                }
            }
        }

        let (completed, failed) = context.counts();
        let failed = failed + panicked;
        let total = context.total;
        let message = if failed == 0 {
            format!("All reports for {subject_name} downloaded.")
        } else {
            format!(
                "Downloaded {completed} of {total} reports for {subject_name} ({failed} failed)."
            )
        };
        info!(completed, failed, total, "subject batch complete");
        context.emit(DownloadEvent::Finished {
            subject: subject_name.to_string(),
            message,
            completed,
            failed,
            total,
        });

        saved.sort();
        Ok(BatchSummary {
            subject: subject_name.to_string(),
            folder,
            total,
            completed,
            failed,
            saved,
        })
    }
}

/// Downloads one report and moves it to its final name.
///
/// Returns the final path and the original file name.
async fn download_report(
    context: &BatchContext,
    url: &Url,
) -> Result<(PathBuf, String), DownloadError> {
    let file_name = url_file_name(url).ok_or_else(|| DownloadError::no_file_name(url.as_str()))?;

    let temp_path = create_temp_file(&context.folder, &file_name)
        .await
        .map_err(|e| DownloadError::io(&context.folder, e))?;

    if let Err(e) = context
        .client
        .download_to_file(url.as_str(), &temp_path)
        .await
    {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    let metadata = parse_filename(&file_name);
    let stem = final_stem(&context.subject_stem, &metadata);
    let ext = extension_of(&file_name);

    let final_path = match persist_unique_path(&temp_path, &context.folder, &stem, &ext).await {
        Ok(path) => path,
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(DownloadError::io(&context.folder, e));
        }
    };

    Ok((final_path, file_name))
}
