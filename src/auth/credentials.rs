//! Cached OAuth credential and the reuse/refresh/authorize decision.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A token is treated as expired this long before its actual expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth credential persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Absent when the token endpoint did not report a lifetime
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|at| at - Duration::seconds(EXPIRY_SKEW_SECS) <= now)
            .unwrap_or(false)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now)
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// What to do with whatever was found in the credential cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialAction {
    /// Cached credential is still valid
    Reuse(Credential),
    /// Expired, but holds a refresh token
    Refresh(Credential),
    /// Nothing usable, run the consent flow
    Authorize,
}

impl CredentialAction {
    pub fn for_cached(cached: Option<Credential>, now: DateTime<Utc>) -> Self {
        match cached {
            Some(credential) if credential.is_valid(now) => CredentialAction::Reuse(credential),
            Some(credential) if credential.is_expired(now) && credential.refresh_token.is_some() => {
                CredentialAction::Refresh(credential)
            }
            _ => CredentialAction::Authorize,
        }
    }
}

/// Load the cached credential. A missing file yields `None`; so does an
/// unreadable or corrupt one, which then gets replaced on the next save.
pub fn load_credential(path: &Path) -> Result<Option<Credential>> {
    if !path.exists() {
        debug!("No cached credential at {}", path.display());
        return Ok(None);
    }

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            warn!("Cannot read cached credential {}: {}", path.display(), e);
            return Ok(None);
        }
    };

    match serde_json::from_str(&json) {
        Ok(credential) => Ok(Some(credential)),
        Err(e) => {
            warn!("Ignoring corrupt credential cache {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Write the credential cache, creating the parent directory if needed.
pub fn save_credential(credential: &Credential, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(credential)?;
    std::fs::write(path, json).map_err(|e| Error::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| Error::io(path, e))?;
    }

    debug!("Saved credential to {}", path.display());
    Ok(())
}
