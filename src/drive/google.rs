//! Google Drive REST client (Drive API v3) over blocking reqwest.

use super::api::{DriveApi, RemoteFile};
use crate::auth::Credential;
use crate::error::{Error, Result};
use reqwest::blocking::Response;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Google Drive API endpoints
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const PAGE_SIZE: &str = "1000";

const MULTIPART_BOUNDARY: &str = "----GdriveBackupBoundary";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    parents: Vec<&'a str>,
    mime_type: &'a str,
}

pub struct GoogleDrive {
    credential: Credential,
    client: reqwest::blocking::Client,
}

impl GoogleDrive {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn list_page(&self, query: &str, page_token: Option<&str>) -> Result<DriveFileList> {
        let mut params = vec![("q", query), ("fields", LIST_FIELDS), ("pageSize", PAGE_SIZE)];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .get(DRIVE_FILES_URL)
            .query(&params)
            .header("Authorization", self.credential.authorization_header())
            .send()?;

        Ok(check(response)?.json()?)
    }
}

// Uploads read the whole staged file into memory and send it in one request
// (`multipart` / `media`). Google recommends these for files up to 5 MB;
// larger artifacts would need the resumable protocol.
impl DriveApi for GoogleDrive {
    fn list_files(&self, query: &str) -> Result<Vec<RemoteFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(query, page_token.as_deref())?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Query matched {} item(s)", files.len());
        Ok(files)
    }

    fn create_file(
        &self,
        name: &str,
        parent_id: &str,
        mime_type: &str,
        content: &Path,
    ) -> Result<String> {
        let bytes = fs::read(content).map_err(|e| Error::io(content, e))?;
        let metadata = FileMetadata {
            name,
            parents: vec![parent_id],
            mime_type,
        };
        let body = multipart_body(&serde_json::to_string(&metadata)?, mime_type, &bytes);

        let url = format!("{}?uploadType=multipart&fields=id", DRIVE_UPLOAD_URL);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.credential.authorization_header())
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(body)
            .send()?;

        let file: CreatedFile = check(response)?.json()?;
        Ok(file.id)
    }

    fn update_file(&self, file_id: &str, mime_type: &str, content: &Path) -> Result<()> {
        let bytes = fs::read(content).map_err(|e| Error::io(content, e))?;

        let url = format!("{}/{}?uploadType=media", DRIVE_UPLOAD_URL, file_id);
        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.credential.authorization_header())
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()?;

        check(response)?;
        Ok(())
    }
}

/// Turn a non-success status into `Error::Api`.
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    debug!("Drive API {} {}", status, response.url().path());
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text()?;
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

/// `multipart/related` body: JSON metadata part, then the file content.
fn multipart_body(metadata_json: &str, mime_type: &str, content: &[u8]) -> Vec<u8> {
    let head = format!(
        "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{boundary}\r\nContent-Type: {mime}\r\n\r\n",
        boundary = MULTIPART_BOUNDARY,
        metadata = metadata_json,
        mime = mime_type
    );

    let mut body = head.into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--", MULTIPART_BOUNDARY).as_bytes());
    body
}
