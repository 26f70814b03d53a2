//! Report catalog mirrored from the upload tree.
//!
//! The filesystem is the source of truth. [`CatalogStore::scan`] rebuilds the
//! entries from `<upload_root>/<Subject>/` folders; only per-path conversion
//! progress is carried across rebuilds.

mod entry;
mod error;
mod store;

pub use entry::{CatalogEntry, SUPPORTED_EXTENSIONS, is_supported};
pub use error::CatalogError;
pub use store::{CatalogStore, EntryProperties, ImportOutcome, MISC_FOLDER};
