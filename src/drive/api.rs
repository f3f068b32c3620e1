//! `DriveApi` trait - the slice of the Drive API used by the backup.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// File metadata as returned by `files.list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

pub trait DriveApi {
    /// All files matching a Drive query (every page).
    fn list_files(&self, query: &str) -> Result<Vec<RemoteFile>>;

    /// Upload `content` as a new file in `parent_id`. Returns the new file id.
    fn create_file(
        &self,
        name: &str,
        parent_id: &str,
        mime_type: &str,
        content: &Path,
    ) -> Result<String>;

    /// Replace the content of an existing file, keeping id and name.
    fn update_file(&self, file_id: &str, mime_type: &str, content: &Path) -> Result<()>;
}
