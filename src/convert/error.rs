//! Error types for document conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a conversion job.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No LibreOffice `soffice` executable could be found.
    #[error(
        "LibreOffice (soffice) not found. Install LibreOffice or set converter_path in the config file to convert .doc/.docx reports."
    )]
    ToolUnavailable,

    /// The converter ran but reported failure.
    #[error("conversion of {path} failed: {message}")]
    ConversionFailed {
        /// Source document.
        path: PathBuf,
        /// Converter diagnostic output.
        message: String,
    },

    /// The converter reported success but the PDF is not on disk.
    #[error("PDF not created for {path}: expected {expected}")]
    OutputMissing {
        /// Source document.
        path: PathBuf,
        /// Where the PDF should have been written.
        expected: PathBuf,
    },

    /// Only `.doc` and `.docx` files are converted.
    #[error("unsupported document type: {path}")]
    Unsupported {
        /// Offending file.
        path: PathBuf,
    },

    /// Spawning the converter or touching the output directory failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Creates a conversion failure with the converter's diagnostic output.
    #[must_use]
    pub fn failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConversionFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-output error.
    #[must_use]
    pub fn output_missing(path: impl Into<PathBuf>, expected: impl Into<PathBuf>) -> Self {
        Self::OutputMissing {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
