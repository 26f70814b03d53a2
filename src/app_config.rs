//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use url::Url;

const APP_DIR_NAME: &str = "exam-reports";

/// `key = value` file configuration for CLI defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default upload root.
    pub upload_dir: Option<PathBuf>,
    /// Explicit `soffice` executable.
    pub converter_path: Option<PathBuf>,
    /// Subject index page.
    pub index_url: Option<String>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(index_url) = &self.index_url {
            let parsed = Url::parse(index_url)
                .with_context(|| format!("Invalid config value for `index_url`: {index_url}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("Invalid config value for `index_url`: {index_url}. Expected an http(s) URL");
            }
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/exam-reports/config.toml`
/// 2. `$HOME/.config/exam-reports/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(APP_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path, or defaults when no file exists.
pub fn load_default_file_config() -> Result<FileConfig> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "upload_dir" | "converter_path" | "index_url" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                match key {
                    "upload_dir" => cfg.upload_dir = Some(PathBuf::from(parsed)),
                    "converter_path" => cfg.converter_path = Some(PathBuf::from(parsed)),
                    _ => cfg.index_url = Some(parsed),
                }
            }
            "connect_timeout_secs" | "read_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                if key == "connect_timeout_secs" {
                    cfg.connect_timeout_secs = Some(parsed);
                } else {
                    cfg.read_timeout_secs = Some(parsed);
                }
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
