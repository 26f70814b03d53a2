//! Runs one conversion job on a background task.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use super::error::ConvertError;
use super::soffice::DocumentConverter;
use crate::events::ConversionEvent;

/// Progress reported when a job starts.
pub const PROGRESS_STARTED: u8 = 10;

/// Progress reported right before the converter runs.
pub const PROGRESS_CONVERTING: u8 = 60;

/// Progress reported once the PDF is verified.
pub const PROGRESS_DONE: u8 = 100;

/// Expected PDF path for `source` inside `output_dir`.
#[must_use]
pub fn expected_pdf(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}.pdf"))
}

/// Spawns [`run_conversion`] on the tokio runtime.
///
/// Exactly one terminal event is sent per job, including when the
/// converter panics.
pub fn spawn_conversion(
    converter: Arc<dyn DocumentConverter>,
    source: PathBuf,
    output_dir: PathBuf,
    events: UnboundedSender<ConversionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let job = {
            let source = source.clone();
            let events = events.clone();
            tokio::spawn(async move {
                run_conversion(converter.as_ref(), &source, &output_dir, &events).await
            })
        };
        let event = match job.await {
            Ok(Ok(pdf)) => ConversionEvent::Succeeded { source, pdf },
            Ok(Err(e)) => ConversionEvent::Failed {
                source,
                reason: e.to_string(),
            },
            Err(e) => {
                warn!(source = %source.display(), error = %e, "conversion task panicked");
                ConversionEvent::Failed {
                    source,
                    reason: format!("conversion task panicked: {e}"),
                }
            }
        };
        let _ = events.send(event);
    })
}

/// Converts `source` and verifies the PDF exists.
///
/// Sends `Progress` events for 10, 60 and (on success) 100; the terminal
/// event is left to the caller.
///
/// # Errors
///
/// Returns the converter's error, or [`ConvertError::OutputMissing`] when
/// the converter succeeded without writing the expected PDF.
#[instrument(skip(converter, events), fields(source = %source.display()))]
pub async fn run_conversion(
    converter: &dyn DocumentConverter,
    source: &Path,
    output_dir: &Path,
    events: &UnboundedSender<ConversionEvent>,
) -> Result<PathBuf, ConvertError> {
    let progress = |percent: u8| {
        let _ = events.send(ConversionEvent::Progress {
            source: source.to_path_buf(),
            percent,
        });
    };

    progress(PROGRESS_STARTED);
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ConvertError::io(output_dir, e))?;

    progress(PROGRESS_CONVERTING);
    if let Err(e) = converter.convert(source, output_dir).await {
        warn!(error = %e, "conversion failed");
        return Err(e);
    }

    let pdf = expected_pdf(source, output_dir);
    if !tokio::fs::try_exists(&pdf).await.unwrap_or(false) {
        warn!(expected = %pdf.display(), "converter produced no output");
        return Err(ConvertError::output_missing(source, pdf));
    }

    progress(PROGRESS_DONE);
    info!(pdf = %pdf.display(), "conversion complete");
    Ok(pdf)
}
