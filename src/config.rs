//! Config module - Loads the backup configuration file.
//!
//! The file is TOML with a single `[default]` table:
//!
//! ```toml
//! [default]
//! secrets_dir = "secrets"
//! file_to_backup = "/var/lib/app/report.csv"
//! gdrive_backup_dir = "Backups"
//! compress = "true"
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Client secret file expected inside `secrets_dir`.
pub const CLIENT_SECRETS_FILE: &str = "gdrive.json";

/// Cached OAuth credential inside `secrets_dir`.
pub const TOKEN_FILE: &str = "token.json";

const SECTION: &str = "default";

/// Raw `[default]` table. Every key is optional here so a missing one can be
/// reported by name instead of as a generic parse error.
#[derive(Debug, Default, Deserialize)]
struct RawSection {
    secrets_dir: Option<PathBuf>,
    file_to_backup: Option<PathBuf>,
    gdrive_backup_dir: Option<String>,
    compress: Option<toml::Value>,
    staging_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    default: Option<RawSection>,
}

/// Backup configuration, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `gdrive.json` and `token.json`
    pub secrets_dir: PathBuf,
    /// Local file to back up
    pub file_to_backup: PathBuf,
    /// Name of the destination folder on Drive
    pub gdrive_backup_dir: String,
    /// Gzip the file before upload
    pub compress: bool,
    /// Where the compressed/copied artifact is written before upload
    pub staging_dir: PathBuf,
}

/// Default staging directory (~/.cache/gdrive-backup/).
pub fn default_staging_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("gdrive-backup"))
        .unwrap_or_else(std::env::temp_dir)
}

impl Config {
    /// Load config from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        Self::parse(&content, base_dir).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse config text, resolving relative paths against `base_dir`.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        let section = raw
            .default
            .ok_or_else(|| Error::Config(format!("missing [{}] section", SECTION)))?;

        let secrets_dir = section.secrets_dir.ok_or_else(|| missing("secrets_dir"))?;
        let file_to_backup = section
            .file_to_backup
            .ok_or_else(|| missing("file_to_backup"))?;
        let gdrive_backup_dir = section
            .gdrive_backup_dir
            .ok_or_else(|| missing("gdrive_backup_dir"))?;
        let compress = section.compress.ok_or_else(|| missing("compress"))?;

        Ok(Self {
            secrets_dir: resolve(base_dir, secrets_dir),
            file_to_backup: resolve(base_dir, file_to_backup),
            gdrive_backup_dir,
            compress: compress_enabled(&compress),
            staging_dir: section
                .staging_dir
                .map(|p| resolve(base_dir, p))
                .unwrap_or_else(default_staging_dir),
        })
    }

    /// Path to the OAuth client secret file.
    pub fn client_secrets_path(&self) -> PathBuf {
        self.secrets_dir.join(CLIENT_SECRETS_FILE)
    }

    /// Path to the cached credential.
    pub fn token_path(&self) -> PathBuf {
        self.secrets_dir.join(TOKEN_FILE)
    }
}

fn missing(key: &str) -> Error {
    Error::Config(format!("missing key '{}' in [{}]", key, SECTION))
}

fn resolve(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Only the exact string "true" (or a TOML boolean `true`) turns compression on.
fn compress_enabled(value: &toml::Value) -> bool {
    match value {
        toml::Value::String(s) => s == "true",
        toml::Value::Boolean(b) => *b,
        _ => false,
    }
}
