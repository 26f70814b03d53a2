//! Subject report downloads.
//!
//! # Example
//!
//! ```no_run
//! use exam_reports::config::{LibraryLayout, SiteConfig};
//! use exam_reports::download::DownloadOrchestrator;
//! use exam_reports::remote::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = DownloadOrchestrator::new(
//!     HttpClient::new(),
//!     LibraryLayout::default(),
//!     SiteConfig::default(),
//! );
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let summary = orchestrator
//!     .download_subject("Chemistry", "https://www.vcaa.vic.edu.au/chemistry", &tx)
//!     .await?;
//! drop(tx);
//! while let Some(event) = rx.recv().await {
//!     println!("{event:?}");
//! }
//! println!("saved {} of {}", summary.completed, summary.total);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod filename;
pub mod filter;
mod orchestrator;

pub use error::DownloadError;
pub use filter::{EXCLUDE_HINTS, REPORT_TOKEN, is_report_link};
pub use orchestrator::{BatchSummary, DOWNLOAD_WORKERS, DownloadOrchestrator};
