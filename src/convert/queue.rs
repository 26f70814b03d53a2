//! FIFO of documents awaiting conversion, with at most one job active.
//!
//! Lifecycle of a path: pending → `in_progress` → finished (removed).
//! A path is never pending twice and never pending while it is active.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Extensions accepted for conversion (lower-case, without the dot).
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["doc", "docx"];

/// Returns true when `path` has a `.doc` or `.docx` extension, any case.
#[must_use]
pub fn is_convertible(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Where a path sits in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Waiting for its turn.
    Pending,
    /// Currently being converted.
    InProgress,
}

impl QueueStatus {
    /// Returns the status as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
        }
    }
}

/// Conversion queue state machine.
#[derive(Debug, Default)]
pub struct ConversionQueue {
    pending: VecDeque<PathBuf>,
    queued: HashSet<PathBuf>,
    active: Option<PathBuf>,
}

impl ConversionQueue {
    /// Creates an empty, idle queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` unless it is unsupported, already pending, or active.
    ///
    /// Returns true when the path was added.
    pub fn enqueue(&mut self, path: &Path) -> bool {
        if !is_convertible(path) {
            return false;
        }
        if self.active.as_deref() == Some(path) || self.queued.contains(path) {
            return false;
        }
        self.queued.insert(path.to_path_buf());
        self.pending.push_back(path.to_path_buf());
        debug!(path = %path.display(), pending = self.pending.len(), "queued for conversion");
        true
    }

    /// Starts the next pending path if no job is active.
    ///
    /// Returns the path that became active, or `None` when busy or empty.
    pub fn dequeue(&mut self) -> Option<PathBuf> {
        if self.active.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.queued.remove(&next);
        self.active = Some(next.clone());
        Some(next)
    }

    /// Clears the active job if it is `path`.
    ///
    /// Returns false when `path` was not the active job.
    pub fn mark_finished(&mut self, path: &Path) -> bool {
        if self.active.as_deref() == Some(path) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Drops a pending path. The active job cannot be removed.
    ///
    /// Returns true when the path was pending.
    pub fn remove(&mut self, path: &Path) -> bool {
        if !self.queued.remove(path) {
            return false;
        }
        self.pending.retain(|p| p != path);
        true
    }

    /// Queue status of `path`, if present.
    #[must_use]
    pub fn status(&self, path: &Path) -> Option<QueueStatus> {
        if self.active.as_deref() == Some(path) {
            Some(QueueStatus::InProgress)
        } else if self.queued.contains(path) {
            Some(QueueStatus::Pending)
        } else {
            None
        }
    }

    /// The active job, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    /// Pending paths in FIFO order.
    pub fn pending(&self) -> impl Iterator<Item = &Path> {
        self.pending.iter().map(PathBuf::as_path)
    }

    /// Number of pending paths.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is active and nothing is pending.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }
}
