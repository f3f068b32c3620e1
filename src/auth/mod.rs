//! Auth module - OAuth 2.0 credentials for the Drive API.
//!
//! This module contains:
//! - `Credential` and its JSON cache (`token.json`)
//! - `ClientSecrets` read from the Google client secret file (`gdrive.json`)
//! - Loopback redirect listener for the installed-app consent flow
//! - `InstalledAppProvider`: reuse, refresh or re-authorize

pub mod credentials;
pub mod flow;
pub mod loopback;
pub mod secrets;

pub use credentials::{load_credential, save_credential, Credential, CredentialAction};
pub use flow::InstalledAppProvider;
pub use secrets::ClientSecrets;

use crate::error::Result;

/// Scopes requested during consent. Changing them requires deleting `token.json`.
pub const DRIVE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.metadata.readonly",
    "https://www.googleapis.com/auth/drive.file",
];

/// Source of a valid, non-expired credential.
///
/// Implementations may block on user interaction or network calls.
pub trait CredentialProvider {
    fn obtain_credential(&self) -> Result<Credential>;
}
