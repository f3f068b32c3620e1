//! The backup command: config → credential → upload.

use anyhow::{Context, Result};
use colored::Colorize;
use gdrive_backup::{
    run_backup, BackupOutcome, Config, CredentialProvider, GoogleDrive, InstalledAppProvider,
};
use std::path::Path;
use tracing::info;

pub fn backup(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("{}", "Fetching credentials to access Drive API".cyan());
    let provider = InstalledAppProvider::new(config.client_secrets_path(), config.token_path());
    let credential = provider
        .obtain_credential()
        .context("Cannot obtain Drive credential")?;

    let drive = GoogleDrive::new(credential);
    let outcome = run_backup(&config, &drive).with_context(|| {
        format!(
            "Backup of {} to '{}' failed",
            config.file_to_backup.display(),
            config.gdrive_backup_dir
        )
    })?;

    match &outcome {
        BackupOutcome::Created { id } => info!("Created file {}", id),
        BackupOutcome::Updated { id } => info!("Updated file {}", id),
    }
    println!("{} File uploaded successfully!", "✓".green());

    Ok(())
}
