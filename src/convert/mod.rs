//! Word-to-PDF conversion: the pending queue, the converter seam, and the
//! background job runner.
//!
//! Conversions are serialized. The owner of a [`ConversionQueue`] starts the
//! next job with [`spawn_conversion`] only after the previous job's terminal
//! event has been applied.

mod error;
mod job;
mod queue;
mod soffice;

pub use error::ConvertError;
pub use job::{
    PROGRESS_CONVERTING, PROGRESS_DONE, PROGRESS_STARTED, expected_pdf, run_conversion,
    spawn_conversion,
};
pub use queue::{CONVERTIBLE_EXTENSIONS, ConversionQueue, QueueStatus, is_convertible};
pub use soffice::{DocumentConverter, SofficeConverter};
