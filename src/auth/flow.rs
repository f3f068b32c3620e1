//! Installed-app OAuth flow against Google's token endpoint.
//!
//! Flow:
//! 1. Reuse `token.json` if it is still valid
//! 2. Refresh it if it expired and carries a refresh token
//! 3. Otherwise open the consent page, catch the redirect on a loopback port
//!    and exchange the code for tokens
//!
//! Whatever comes out of 2 or 3 is written back to `token.json`.

use super::credentials::{load_credential, save_credential, Credential, CredentialAction};
use super::loopback::LoopbackServer;
use super::secrets::ClientSecrets;
use super::{CredentialProvider, DRIVE_SCOPES};
use crate::error::{Error, Result};
use crate::utils::browser::open_browser;
use chrono::{DateTime, Duration, Utc};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Response from the token endpoint (code exchange or refresh).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Build a credential. Refresh responses usually omit `refresh_token`, in
    /// which case `previous_refresh` is carried over.
    pub fn into_credential(
        self,
        previous_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Credential> {
        if let Some(error) = self.error {
            let desc = self.error_description.as_deref().unwrap_or("Unknown error");
            return Err(Error::Auth(format!("OAuth error: {} - {}", error, desc)));
        }

        let access_token = self
            .access_token
            .ok_or_else(|| Error::Auth("token response without access_token".to_string()))?;

        Ok(Credential {
            access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

/// Credential provider backed by `gdrive.json` + `token.json`.
pub struct InstalledAppProvider {
    secrets_path: PathBuf,
    token_path: PathBuf,
    client: reqwest::blocking::Client,
}

impl InstalledAppProvider {
    pub fn new(secrets_path: PathBuf, token_path: PathBuf) -> Self {
        Self {
            secrets_path,
            token_path,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn refresh(&self, secrets: &ClientSecrets, expired: Credential) -> Result<Credential> {
        let refresh_token = expired
            .refresh_token
            .ok_or_else(|| Error::Auth("no refresh token available".to_string()))?;

        info!("Refreshing expired access token");
        let response = self.token_request(
            &secrets.token_uri,
            &[
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )?;

        response.into_credential(Some(refresh_token), Utc::now())
    }

    fn authorize(&self, secrets: &ClientSecrets) -> Result<Credential> {
        let server = LoopbackServer::bind()?;
        let redirect_uri = server.redirect_uri()?;
        let state = uuid::Uuid::new_v4().to_string();
        let consent_url = consent_url(secrets, &redirect_uri, DRIVE_SCOPES, &state)?;

        println!("Please open the following URL in your browser:");
        println!("{}", consent_url.as_str().blue().underline());
        println!();
        if !open_browser(consent_url.as_str()) {
            debug!("Could not launch a browser, waiting for manual visit");
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Waiting for authorization in browser...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        let redirect = server.wait_for_redirect();
        spinner.finish_and_clear();
        let code = redirect?.into_code(&state)?;

        info!("Exchanging authorization code for tokens");
        let response = self.token_request(
            &secrets.token_uri,
            &[
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )?;

        response.into_credential(None, Utc::now())
    }

    fn token_request(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .client
            .post(token_uri)
            .form(form)
            .send()
            .map_err(|e| Error::Auth(format!("cannot reach token endpoint: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Auth(format!("cannot read token response: {}", e)))?;
        debug!("Token endpoint returned {}", status);

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) if token.error.is_some() || status.is_success() => Ok(token),
            _ => Err(Error::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            ))),
        }
    }
}

impl CredentialProvider for InstalledAppProvider {
    fn obtain_credential(&self) -> Result<Credential> {
        let cached = load_credential(&self.token_path)?;

        let credential = match CredentialAction::for_cached(cached, Utc::now()) {
            CredentialAction::Reuse(credential) => {
                info!("Using cached credential");
                return Ok(credential);
            }
            CredentialAction::Refresh(expired) => {
                let secrets = ClientSecrets::load(&self.secrets_path)?;
                self.refresh(&secrets, expired)?
            }
            CredentialAction::Authorize => {
                let secrets = ClientSecrets::load(&self.secrets_path)?;
                self.authorize(&secrets)?
            }
        };

        save_credential(&credential, &self.token_path)?;
        Ok(credential)
    }
}

/// Consent page URL with offline access so a refresh token is issued.
pub fn consent_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
) -> Result<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Auth(format!("invalid auth_uri '{}': {}", secrets.auth_uri, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> ClientSecrets {
        ClientSecrets {
            client_id: "id.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn test_consent_url_params() {
        let url =
            consent_url(&secrets(), "http://127.0.0.1:4567/", DRIVE_SCOPES, "st4te").unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "id.apps.googleusercontent.com");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:4567/");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["state"], "st4te");
        assert_eq!(params["scope"], DRIVE_SCOPES.join(" "));
        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/auth?"));
    }

    #[test]
    fn test_refresh_response_keeps_refresh_token() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "new", "expires_in": 3599, "token_type": "Bearer",
                "scope": "https://www.googleapis.com/auth/drive.file"}"#,
        )
        .unwrap();

        let now = Utc::now();
        let credential = response
            .into_credential(Some("1//old-refresh".to_string()), now)
            .unwrap();

        assert_eq!(credential.access_token, "new");
        assert_eq!(credential.refresh_token.as_deref(), Some("1//old-refresh"));
        assert_eq!(credential.expires_at, Some(now + Duration::seconds(3599)));
        assert_eq!(
            credential.scopes,
            vec!["https://www.googleapis.com/auth/drive.file".to_string()]
        );
        assert!(credential.is_valid(now));
    }

    #[test]
    fn test_code_exchange_response() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "a", "refresh_token": "r", "expires_in": 3599}"#,
        )
        .unwrap();
        let credential = response.into_credential(None, Utc::now()).unwrap();
        assert_eq!(credential.refresh_token.as_deref(), Some("r"));
        assert_eq!(credential.token_type, "Bearer");
    }

    #[test]
    fn test_error_response() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#,
        )
        .unwrap();
        let err = response.into_credential(None, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_valid_cache_skips_client_secrets() -> anyhow::Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let token_path = temp_dir.path().join("token.json");
        let cached = Credential {
            access_token: "cached".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            scopes: vec![],
        };
        save_credential(&cached, &token_path)?;

        // gdrive.json does not exist; a reused credential must not need it.
        let provider =
            InstalledAppProvider::new(temp_dir.path().join("gdrive.json"), token_path);
        assert_eq!(provider.obtain_credential()?, cached);
        Ok(())
    }

    #[test]
    fn test_expired_cache_without_secrets_fails_with_auth_error() -> anyhow::Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let token_path = temp_dir.path().join("token.json");
        let expired = Credential {
            access_token: "old".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_type: "Bearer".to_string(),
            expires_at: Some(Utc::now() - Duration::hours(1)),
            scopes: vec![],
        };
        save_credential(&expired, &token_path)?;

        let provider =
            InstalledAppProvider::new(temp_dir.path().join("gdrive.json"), token_path);
        let err = provider.obtain_credential().unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        Ok(())
    }
}
