//! Filename derivation, sanitization, and collision-safe publishing of
//! downloaded reports.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs::OpenOptions;
use tracing::warn;
use url::Url;

use crate::metadata::ReportMetadata;

static UNSAFE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/:*?"<>|]"#).unwrap_or_else(|e| panic!("invalid static regex: {e}"))
});

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|e| panic!("invalid static regex: {e}")));

/// Folder name used when a subject name cleans down to nothing.
pub const FALLBACK_SUBJECT_FOLDER: &str = "Subject";

/// Replaces filesystem-unsafe characters with `_` and collapses whitespace
/// runs into a single `_`.
#[must_use]
pub fn clean_subject_name(name: &str) -> String {
    let cleaned = UNSAFE_CHARS_RE.replace_all(name, "_");
    WHITESPACE_RUN_RE
        .replace_all(cleaned.trim(), "_")
        .into_owned()
}

/// Folder name for a subject under the upload root.
#[must_use]
pub fn subject_folder_name(name: &str) -> String {
    let cleaned = clean_subject_name(name);
    if cleaned.is_empty() || !is_safe_filename_segment(&cleaned) {
        FALLBACK_SUBJECT_FOLDER.to_string()
    } else {
        cleaned
    }
}

/// Builds `{subject}[_year][_examN]`, omitting unknown segments.
#[must_use]
pub fn final_stem(cleaned_subject: &str, metadata: &ReportMetadata) -> String {
    let mut parts = vec![cleaned_subject.to_string()];
    if metadata.has_year() {
        parts.push(metadata.year.clone());
    }
    if metadata.has_exam_number() {
        parts.push(metadata.exam_number.clone());
    }
    parts.join("_")
}

/// Lower-cased extension of `file_name` including the dot, or empty.
#[must_use]
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Decoded, sanitized last path segment of `url`.
#[must_use]
pub fn url_file_name(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    let sanitized = sanitize_filename(&decoded);
    (!sanitized.trim_matches('_').is_empty()).then_some(sanitized)
}

/// Sanitizes a file name for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Atomically reserves a temporary download file for `file_name` in `dir`.
///
/// The first candidate is `{file_name}.part`; concurrent workers sharing a
/// segment get `{file_name}.2.part`, `{file_name}.3.part`, ...
///
/// # Errors
///
/// Returns the IO error if the directory cannot be written.
pub async fn create_temp_file(dir: &Path, file_name: &str) -> std::io::Result<PathBuf> {
    let mut counter = 1usize;
    loop {
        let candidate = if counter == 1 {
            dir.join(format!("{file_name}.part"))
        } else {
            dir.join(format!("{file_name}.{counter}.part"))
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Publishes the finished `temp` file under the first free `{stem}{ext}`
/// in `dir` and removes `temp`.
///
/// Candidates are `file.pdf`, then `file_2.pdf`, `file_3.pdf`, ... Each
/// candidate is created as a hard link to `temp`, which fails if the name is
/// taken. A name therefore only appears once its content is complete, and
/// existing files are never replaced.
///
/// # Errors
///
/// Returns the IO error if the link cannot be created.
pub async fn persist_unique_path(
    temp: &Path,
    dir: &Path,
    stem: &str,
    ext: &str,
) -> std::io::Result<PathBuf> {
    let mut counter = 1usize;
    loop {
        let candidate = if counter == 1 {
            dir.join(format!("{stem}{ext}"))
        } else {
            dir.join(format!("{stem}_{counter}{ext}"))
        };
        match tokio::fs::hard_link(temp, &candidate).await {
            Ok(()) => {
                if let Err(e) = tokio::fs::remove_file(temp).await {
                    warn!(temp = %temp.display(), error = %e, "failed to remove temp file");
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e),
        }
    }
}
