//! Catalog command handlers: list, import, edit and delete entries.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use exam_reports::Library;
use exam_reports::catalog::{CatalogEntry, CatalogStore, EntryProperties, ImportOutcome};

use super::AppContext;
use super::convert::drain_and_report;
use crate::cli::{DeleteArgs, EditArgs, ImportArgs, ListArgs};

pub fn run_list_command(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let store = scanned_store(ctx)?;
    let entries = store.filtered(args.subject.as_deref(), args.year.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No reports found in {}.", ctx.layout.upload_root().display());
        return Ok(());
    }
    for entry in entries {
        println!(
            "{:<40} {:<14} {}",
            entry.label(),
            status_label(entry),
            entry.source_path.display()
        );
    }
    Ok(())
}

fn status_label(entry: &CatalogEntry) -> String {
    if entry.renderable_path.is_some() {
        "ready".to_string()
    } else if entry.conversion_progress > 0 {
        format!("converting {}%", entry.conversion_progress)
    } else {
        "needs convert".to_string()
    }
}

pub async fn run_import_command(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    if args.no_convert {
        ctx.layout.init().context("Failed to create library directories")?;
        let store = CatalogStore::new(ctx.layout.clone());
        for file in &args.files {
            print_import(file, &store.import_file(file))?;
        }
        return Ok(());
    }

    let mut library = Library::open(ctx.layout.clone(), Arc::clone(&ctx.converter))
        .context("Failed to open report library")?;
    for file in &args.files {
        let outcome = library.import(file);
        print_import(file, &outcome)?;
    }
    drain_and_report(&mut library).await?;
    Ok(())
}

fn print_import(
    file: &Path,
    outcome: &Result<ImportOutcome, exam_reports::catalog::CatalogError>,
) -> Result<()> {
    match outcome {
        Ok(ImportOutcome::Imported(path)) => {
            println!("Imported {} -> {}", file.display(), path.display());
        }
        Ok(ImportOutcome::AlreadyPresent(path)) => {
            println!("Already in library: {}", path.display());
        }
        Err(e) => {
            return Err(anyhow!("Failed to import {}: {e}", file.display()));
        }
    }
    Ok(())
}

pub fn run_edit_command(ctx: &AppContext, args: &EditArgs) -> Result<()> {
    let mut store = scanned_store(ctx)?;
    let path = store
        .resolve(&args.path)
        .ok_or_else(|| anyhow!("No report at {}", args.path.display()))?;
    let Some(entry) = store.entry(&path) else {
        return Err(anyhow!("No report at {}", args.path.display()));
    };

    let properties = EntryProperties {
        subject: args.subject.clone().unwrap_or_else(|| entry.subject.clone()),
        year: args.year.clone().unwrap_or_else(|| entry.year.clone()),
        exam_number: args
            .exam
            .clone()
            .unwrap_or_else(|| entry.exam_number.clone()),
    };
    let new_path = store
        .rename_entry(&path, &properties)
        .with_context(|| format!("Failed to rename {}", path.display()))?;
    println!("Renamed {} -> {}", path.display(), new_path.display());
    Ok(())
}

pub fn run_delete_command(ctx: &AppContext, args: &DeleteArgs) -> Result<()> {
    let mut store = scanned_store(ctx)?;
    let path = store
        .resolve(&args.path)
        .ok_or_else(|| anyhow!("No report at {}", args.path.display()))?;
    store
        .delete_entry(&path)
        .with_context(|| format!("Failed to delete {}", path.display()))?;
    println!("Deleted {}", path.display());
    Ok(())
}

fn scanned_store(ctx: &AppContext) -> Result<CatalogStore> {
    ctx.layout.init().context("Failed to create library directories")?;
    let mut store = CatalogStore::new(ctx.layout.clone());
    store.scan().context("Failed to scan report library")?;
    Ok(store)
}
