//! CLI command handlers.

mod catalog;
mod convert;
mod remote;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use exam_reports::config::{DEFAULT_UPLOAD_DIR, LibraryLayout, SiteConfig};
use exam_reports::convert::{DocumentConverter, SofficeConverter};
use exam_reports::remote::{CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};

use crate::app_config::FileConfig;
use crate::cli::Cli;

pub use catalog::{run_delete_command, run_edit_command, run_import_command, run_list_command};
pub use convert::run_convert_command;
pub use remote::{run_download_command, run_subjects_command};

/// Everything a command needs, resolved from CLI flags and the config file.
pub struct AppContext {
    pub layout: LibraryLayout,
    pub site: SiteConfig,
    pub client: HttpClient,
    pub converter: Arc<dyn DocumentConverter>,
    pub quiet: bool,
}

impl AppContext {
    /// Resolves settings; CLI flags win over file values, which win over
    /// built-in defaults.
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Result<Self> {
        let upload_root = cli
            .upload_dir
            .clone()
            .or_else(|| file.upload_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let site = match &file.index_url {
            Some(index_url) => SiteConfig::from_index_url(index_url)
                .with_context(|| format!("Invalid index URL '{index_url}'"))?,
            None => SiteConfig::default(),
        };

        let client = HttpClient::new_with_timeouts(
            file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
        );

        let converter: Arc<dyn DocumentConverter> = match &file.converter_path {
            Some(path) => Arc::new(SofficeConverter::with_binary(path)),
            None => Arc::new(SofficeConverter::new()),
        };

        Ok(Self {
            layout: LibraryLayout::new(upload_root),
            site,
            client,
            converter,
            quiet: cli.quiet,
        })
    }
}
