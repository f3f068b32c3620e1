//! Backup pipeline: stage the file, find the destination, create or update.

use crate::archive;
use crate::config::Config;
use crate::drive::{find_existing_file, resolve_folder, DriveApi};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Suffix appended to the file name when compressing
pub const GZIP_SUFFIX: &str = ".gz";
pub const GZIP_MIME_TYPE: &str = "application/gzip";
/// MIME type declared for uncompressed uploads
pub const GENERIC_MIME_TYPE: &str = "application/unknown";

/// Remote name and declared type of the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub file_name: String,
    pub mime_type: &'static str,
    pub compress: bool,
}

impl UploadPlan {
    pub fn for_source(source: &Path, compress: bool) -> Result<Self> {
        let base_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Config(format!(
                    "cannot derive a file name from '{}'",
                    source.display()
                ))
            })?;

        Ok(if compress {
            Self {
                file_name: format!("{}{}", base_name, GZIP_SUFFIX),
                mime_type: GZIP_MIME_TYPE,
                compress,
            }
        } else {
            Self {
                file_name: base_name.to_string(),
                mime_type: GENERIC_MIME_TYPE,
                compress,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// No prior file; a new one was uploaded
    Created { id: String },
    /// Existing file's content replaced, same id
    Updated { id: String },
}

impl BackupOutcome {
    pub fn file_id(&self) -> &str {
        match self {
            BackupOutcome::Created { id } | BackupOutcome::Updated { id } => id,
        }
    }
}

/// Run one backup against `api`.
///
/// The staged file is removed only when the upload succeeded; on any earlier
/// error it stays in `config.staging_dir`.
pub fn run_backup(config: &Config, api: &dyn DriveApi) -> Result<BackupOutcome> {
    let plan = UploadPlan::for_source(&config.file_to_backup, config.compress)?;

    if plan.compress {
        info!("Compressing {} before upload", config.file_to_backup.display());
    } else {
        info!("Copying {} for upload", config.file_to_backup.display());
    }
    let staged = archive::stage(
        &config.file_to_backup,
        &config.staging_dir,
        &plan.file_name,
        plan.compress,
    )?;

    let folder_id = resolve_folder(api, &config.gdrive_backup_dir)?;
    let existing = find_existing_file(api, &plan.file_name, &folder_id, plan.mime_type)?;

    let outcome = match existing {
        None => {
            info!("Creating '{}' in folder {}", plan.file_name, folder_id);
            let id = api.create_file(&plan.file_name, &folder_id, plan.mime_type, &staged)?;
            BackupOutcome::Created { id }
        }
        Some(file_id) => {
            info!("Updating existing file {}", file_id);
            api.update_file(&file_id, plan.mime_type, &staged)?;
            BackupOutcome::Updated { id: file_id }
        }
    };

    fs::remove_file(&staged).map_err(|e| Error::io(&staged, e))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plan_with_compression() {
        let plan = UploadPlan::for_source(Path::new("/data/report.csv"), true).unwrap();
        assert_eq!(plan.file_name, "report.csv.gz");
        assert_eq!(plan.mime_type, "application/gzip");
    }

    #[test]
    fn test_plan_without_compression() {
        let plan = UploadPlan::for_source(Path::new("/data/report.csv"), false).unwrap();
        assert_eq!(plan.file_name, "report.csv");
        assert_eq!(plan.mime_type, "application/unknown");
    }

    #[test]
    fn test_plan_rejects_pathless_source() {
        let err = UploadPlan::for_source(&PathBuf::from("/"), true).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_outcome_file_id() {
        assert_eq!(BackupOutcome::Created { id: "a".into() }.file_id(), "a");
        assert_eq!(BackupOutcome::Updated { id: "b".into() }.file_id(), "b");
    }
}
