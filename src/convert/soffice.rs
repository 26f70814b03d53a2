//! LibreOffice headless conversion of Word documents to PDF.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::error::ConvertError;

#[cfg(windows)]
const SOFFICE_CANDIDATES: &[&str] = &[
    r"C:\Program Files\LibreOffice\program\soffice.exe",
    r"C:\Program Files (x86)\LibreOffice\program\soffice.exe",
    r"C:\LibreOffice\program\soffice.exe",
    r"D:\LibreOffice\program\soffice.exe",
    "soffice.exe",
];

#[cfg(not(windows))]
const SOFFICE_CANDIDATES: &[&str] = &[
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    "/usr/local/bin/soffice",
    "/opt/local/bin/soffice",
    "/usr/bin/soffice",
    "soffice",
    "libreoffice",
];

/// Converts one document to PDF inside `output_dir`.
///
/// Implementations only run the tool; callers verify that
/// `<output_dir>/<stem>.pdf` exists afterwards.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Converts `source`, writing the PDF into `output_dir`.
    async fn convert(&self, source: &Path, output_dir: &Path) -> Result<(), ConvertError>;
}

/// [`DocumentConverter`] backed by the LibreOffice `soffice` binary.
#[derive(Debug, Clone, Default)]
pub struct SofficeConverter {
    binary: Option<PathBuf>,
}

impl SofficeConverter {
    /// Locates `soffice` from the well-known install locations and `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `binary` instead of searching.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(binary.into()),
        }
    }

    /// Resolves the executable to run, if any.
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(binary) = &self.binary {
            return binary.is_file().then(|| binary.clone());
        }
        let path_var = std::env::var_os("PATH");
        SOFFICE_CANDIDATES
            .iter()
            .find_map(|candidate| resolve_candidate(candidate, path_var.as_ref()))
    }
}

fn resolve_candidate(candidate: &str, path_var: Option<&OsString>) -> Option<PathBuf> {
    let candidate_path = Path::new(candidate);
    if candidate_path.is_absolute() {
        return candidate_path.is_file().then(|| candidate_path.to_path_buf());
    }
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(candidate))
        .find(|full| full.is_file())
}

#[async_trait]
impl DocumentConverter for SofficeConverter {
    #[instrument(skip(self), fields(source = %source.display()))]
    async fn convert(&self, source: &Path, output_dir: &Path) -> Result<(), ConvertError> {
        let binary = self.locate().ok_or(ConvertError::ToolUnavailable)?;
        debug!(binary = %binary.display(), "running converter");

        let output = Command::new(&binary)
            .args(["--headless", "--nologo", "--norestore", "--convert-to", "pdf"])
            .arg("--outdir")
            .arg(output_dir)
            .arg(source)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConvertError::ToolUnavailable
                } else {
                    ConvertError::io(&binary, e)
                }
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let message = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            format!("converter exited with {}", output.status)
        };
        warn!(status = %output.status, "converter reported failure");
        Err(ConvertError::failed(source, message))
    }
}
