//! Remote command handlers: list subjects and download a subject's reports.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use exam_reports::Library;
use exam_reports::download::DownloadOrchestrator;
use exam_reports::events::DownloadEvent;
use exam_reports::remote::{DiscoveryError, SubjectCatalog, SubjectDiscovery};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::unbounded_channel;
use tracing::warn;
use url::Url;

use super::AppContext;
use super::convert::drain_and_report;
use crate::cli::DownloadArgs;

pub async fn run_subjects_command(ctx: &AppContext) -> Result<()> {
    let Some(subjects) = discover(ctx).await? else {
        return Ok(());
    };
    for (name, url) in &subjects {
        println!("{name}\t{url}");
    }
    Ok(())
}

pub async fn run_download_command(ctx: &AppContext, args: &DownloadArgs) -> Result<()> {
    let Some(subjects) = discover(ctx).await? else {
        return Ok(());
    };
    let (name, url) = find_subject(&subjects, &args.subject).ok_or_else(|| {
        anyhow!(
            "Unknown subject '{}'. Run `exam-reports subjects` to list them.",
            args.subject
        )
    })?;

    ctx.layout.init().context("Failed to create library directories")?;
    let mut library = if args.no_convert {
        None
    } else {
        Some(
            Library::open(ctx.layout.clone(), Arc::clone(&ctx.converter))
                .context("Failed to open report library")?,
        )
    };

    let orchestrator =
        DownloadOrchestrator::new(ctx.client.clone(), ctx.layout.clone(), ctx.site.clone());
    let bar = progress_bar(ctx.quiet);

    let (tx, mut rx) = unbounded_channel();
    let orchestrator = &orchestrator;
    let download = async move { orchestrator.download_subject(&name, url.as_str(), &tx).await };

    let render_bar = bar.clone();
    let library_ref = library.as_mut();
    let render = async move {
        let mut library = library_ref;
        let mut finished_message = None;
        while let Some(event) = rx.recv().await {
            if let Some(library) = library.as_deref_mut()
                && let Err(e) = library.apply_download_event(&event)
            {
                warn!(error = %e, "rescan after download failed");
            }
            match event {
                DownloadEvent::Progress {
                    message,
                    completed,
                    total,
                } => {
                    render_bar.set_length(total as u64);
                    render_bar.set_position(completed as u64);
                    render_bar.set_message(message);
                }
                DownloadEvent::FileFailed { url, reason } => {
                    render_bar.println(format!("Failed {url}: {reason}"));
                }
                DownloadEvent::FileSaved { .. } => {}
                DownloadEvent::Finished { message, .. } => {
                    finished_message = Some(message);
                }
            }
        }
        finished_message
    };

    let (summary, finished_message) = tokio::join!(download, render);
    bar.finish_and_clear();
    let summary = summary.context("Subject download failed")?;

    if let Some(message) = finished_message {
        println!("{message}");
    }
    if summary.failed > 0 {
        warn!(failed = summary.failed, "some reports failed to download");
    }

    if let Some(library) = library.as_mut() {
        library.rescan().context("Failed to rescan report library")?;
        drain_and_report(library).await?;
    }
    Ok(())
}

async fn discover(ctx: &AppContext) -> Result<Option<SubjectCatalog>> {
    let discovery = SubjectDiscovery::new(ctx.client.clone(), ctx.site.clone());
    match discovery.discover_subjects().await {
        Ok(subjects) => Ok(Some(subjects)),
        Err(e) if e.is_informational() => {
            println!("{e}");
            Ok(None)
        }
        Err(DiscoveryError::Fetch(e)) => bail!("Failed to fetch subject index: {e}"),
        Err(e) => Err(e.into()),
    }
}

fn find_subject(subjects: &SubjectCatalog, wanted: &str) -> Option<(String, Url)> {
    let wanted = wanted.trim();
    subjects
        .get_key_value(wanted)
        .or_else(|| {
            subjects
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        })
        .map(|(name, url)| (name.clone(), url.clone()))
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_subject_is_case_insensitive() {
        let mut subjects = SubjectCatalog::new();
        subjects.insert(
            "Chemistry".to_string(),
            Url::parse("https://example.edu/chemistry").unwrap(),
        );
        let (name, url) = find_subject(&subjects, " chemistry ").unwrap();
        assert_eq!(name, "Chemistry");
        assert_eq!(url.path(), "/chemistry");
        assert!(find_subject(&subjects, "Physics").is_none());
    }
}
