//! Google OAuth client secret file (`gdrive.json`), as downloaded from the
//! Cloud Console for a desktop ("installed") or web client.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Auth(format!(
                "cannot read client secret file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&json).map_err(|e| match e {
            Error::Auth(msg) => Error::Auth(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(json)
            .map_err(|e| Error::Auth(format!("malformed client secret file: {}", e)))?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::Auth("expected an 'installed' or 'web' client entry".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_installed_client() {
        let json = r#"{
            "installed": {
                "client_id": "123.apps.googleusercontent.com",
                "project_id": "backup",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "s3cret",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let secrets = ClientSecrets::from_json(json).unwrap();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "s3cret");
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_web_client_and_default_uris() {
        let json = r#"{"web": {"client_id": "id", "client_secret": "secret"}}"#;
        let secrets = ClientSecrets::from_json(json).unwrap();
        assert_eq!(secrets.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_unknown_client_type() {
        let err = ClientSecrets::from_json(r#"{"service_account": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("installed"));
    }

    #[test]
    fn test_malformed_json_is_auth_error() {
        let err = ClientSecrets::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_missing_file_is_auth_error() {
        let err = ClientSecrets::load(Path::new("/nonexistent/gdrive.json")).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
