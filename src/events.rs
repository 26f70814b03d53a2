//! Events emitted by background work.
//!
//! Downloads and conversions run on tokio tasks and report back over
//! unbounded channels. Consumers apply every mutation of shared state
//! (catalog rows, progress, queue advancement) on their own task in
//! response to these events.

use std::path::{Path, PathBuf};

/// Progress of a document conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    /// The job for `source` reached `percent` (0..=100).
    Progress {
        /// Source document being converted.
        source: PathBuf,
        /// Percent complete.
        percent: u8,
    },
    /// The PDF was produced and verified on disk.
    Succeeded {
        /// Source document.
        source: PathBuf,
        /// Converted PDF.
        pdf: PathBuf,
    },
    /// The job failed; `reason` is user-presentable.
    Failed {
        /// Source document.
        source: PathBuf,
        /// Failure description.
        reason: String,
    },
}

impl ConversionEvent {
    /// Source document the event refers to.
    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Progress { source, .. }
            | Self::Succeeded { source, .. }
            | Self::Failed { source, .. } => source,
        }
    }

    /// True for `Succeeded` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Progress of a subject download batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Status message with the number of files finished so far.
    Progress {
        /// Human-readable status.
        message: String,
        /// Files saved so far.
        completed: usize,
        /// Files in the batch.
        total: usize,
    },
    /// A report was saved at its final path.
    FileSaved {
        /// Final path under the subject folder.
        path: PathBuf,
    },
    /// One file failed; the rest of the batch continues.
    FileFailed {
        /// Report URL.
        url: String,
        /// Failure description.
        reason: String,
    },
    /// The batch is over.
    Finished {
        /// Subject display name.
        subject: String,
        /// Summary message.
        message: String,
        /// Files saved.
        completed: usize,
        /// Files that failed.
        failed: usize,
        /// Files in the batch.
        total: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_event_terminal_states() {
        let source = PathBuf::from("Chemistry/a.docx");
        let progress = ConversionEvent::Progress {
            source: source.clone(),
            percent: 60,
        };
        let failed = ConversionEvent::Failed {
            source: source.clone(),
            reason: "boom".to_string(),
        };
        assert!(!progress.is_terminal());
        assert!(failed.is_terminal());
        assert_eq!(progress.source(), source.as_path());
    }
}
