//! gdrive-backup - back up one local file to a Google Drive folder.
//!
//! Pipeline:
//! - Load the TOML config (`config`)
//! - Obtain an OAuth credential, refreshing or re-authorizing as needed (`auth`)
//! - Gzip or copy the file into a staging directory (`archive`)
//! - Resolve the destination folder and any existing copy (`drive`)
//! - Create or update the remote file, then drop the staged copy (`backup`)

pub mod archive;
pub mod auth;
pub mod backup;
pub mod config;
pub mod drive;
pub mod error;
pub mod utils;

// Re-export main types
pub use auth::{Credential, CredentialProvider, InstalledAppProvider};
pub use backup::{run_backup, BackupOutcome, UploadPlan};
pub use config::Config;
pub use drive::{DriveApi, GoogleDrive, RemoteFile};
pub use error::{Error, ResolutionError, Result};
