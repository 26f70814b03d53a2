//! Convert command handler: drain the conversion queue.

use std::sync::Arc;

use anyhow::{Context, Result};
use exam_reports::Library;
use exam_reports::events::ConversionEvent;
use tracing::info;

use super::AppContext;

pub async fn run_convert_command(ctx: &AppContext) -> Result<()> {
    let mut library = Library::open(ctx.layout.clone(), Arc::clone(&ctx.converter))
        .context("Failed to open report library")?;

    let pending = library.queue().pending_len() + usize::from(library.queue().active().is_some());
    if pending == 0 {
        println!("Nothing to convert.");
        return Ok(());
    }
    info!(pending, "converting documents");

    let failed = drain_and_report(&mut library).await?;
    if failed > 0 {
        println!("{failed} conversion(s) failed.");
    }
    Ok(())
}

/// Drains the conversion queue, printing one line per finished job.
///
/// Returns the number of failed jobs.
pub(super) async fn drain_and_report(library: &mut Library) -> Result<usize> {
    let finished = library
        .drain_conversions()
        .await
        .context("Failed to rescan library after conversion")?;

    let mut failed = 0usize;
    for event in &finished {
        match event {
            ConversionEvent::Succeeded { source, pdf } => {
                println!("Converted {} -> {}", source.display(), pdf.display());
            }
            ConversionEvent::Failed { source, reason } => {
                failed += 1;
                eprintln!("Failed to convert {}: {reason}", source.display());
            }
            ConversionEvent::Progress { .. } => {}
        }
    }
    Ok(failed)
}
