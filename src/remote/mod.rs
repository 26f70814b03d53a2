//! Remote site access: HTTP fetching, anchor extraction, and subject discovery.
//!
//! # Example
//!
//! ```no_run
//! use exam_reports::config::SiteConfig;
//! use exam_reports::remote::{HttpClient, SubjectDiscovery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let discovery = SubjectDiscovery::new(HttpClient::new(), SiteConfig::default());
//! for (name, url) in discovery.discover_subjects().await? {
//!     println!("{name}: {url}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod discovery;
mod error;
pub mod links;

pub use client::{BROWSER_USER_AGENT, CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use discovery::{SubjectCatalog, SubjectDiscovery, subjects_from_index};
pub use error::{DiscoveryError, FetchError};
