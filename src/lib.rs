//! Exam Reports Library
//!
//! Ingests examination-report documents, either imported from disk or
//! downloaded from a public index site, infers subject/year/exam metadata
//! from their file names, converts Word documents to PDF with LibreOffice,
//! and keeps a catalog in sync with the upload tree.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`metadata`] - File name → subject, year, exam number
//! - [`config`] - Library layout and remote site locations
//! - [`remote`] - HTTP fetching and subject discovery
//! - [`download`] - Concurrent subject report downloads
//! - [`convert`] - Conversion queue, converter seam and job runner
//! - [`catalog`] - Catalog entries mirrored from the upload tree
//! - [`library`] - Control context tying the catalog to the conversion queue

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod convert;
pub mod download;
pub mod events;
pub mod library;
pub mod metadata;
pub mod remote;

// Re-export commonly used types
pub use catalog::{CatalogEntry, CatalogError, CatalogStore};
pub use config::{LibraryLayout, SiteConfig};
pub use convert::{ConversionQueue, ConvertError, DocumentConverter, SofficeConverter};
pub use download::{DownloadError, DownloadOrchestrator};
pub use events::{ConversionEvent, DownloadEvent};
pub use library::Library;
pub use metadata::{ReportMetadata, parse_filename};
pub use remote::{HttpClient, SubjectDiscovery};
