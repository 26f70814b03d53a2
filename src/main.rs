//! CLI entry point for the exam report library.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

mod app_config;
mod cli;
mod commands;

use cli::{Cli, Command};
use commands::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let file_config =
        app_config::load_default_file_config().context("Failed to load configuration")?;
    let ctx = AppContext::resolve(&cli, &file_config)?;
    info!(upload_root = %ctx.layout.upload_root().display(), "library");

    match &cli.command {
        Command::List(args) => commands::run_list_command(&ctx, args),
        Command::Convert => commands::run_convert_command(&ctx).await,
        Command::Subjects => commands::run_subjects_command(&ctx).await,
        Command::Download(args) => commands::run_download_command(&ctx, args).await,
        Command::Import(args) => commands::run_import_command(&ctx, args).await,
        Command::Edit(args) => commands::run_edit_command(&ctx, args),
        Command::Delete(args) => commands::run_delete_command(&ctx, args),
    }
}
