//! Name → id resolution for the destination folder and the backup file.

use super::api::DriveApi;
use super::query;
use crate::error::{ResolutionError, Result};
use tracing::{debug, info};

/// Resolve a folder name to exactly one folder id.
///
/// The lookup is a substring match (`name contains`), so "Backups" also hits
/// "Old Backups"; both count toward ambiguity.
pub fn resolve_folder(api: &dyn DriveApi, name: &str) -> Result<String> {
    let query = query::folders_named(name);
    debug!("Folder query: {}", query);

    let mut folders = api.list_files(&query)?;
    match folders.len() {
        0 => Err(ResolutionError::FolderNotFound {
            name: name.to_string(),
        }
        .into()),
        1 => {
            let folder = folders.remove(0);
            info!("Folder '{}' found with ID: {}", name, folder.id);
            Ok(folder.id)
        }
        count => Err(ResolutionError::AmbiguousFolder {
            name: name.to_string(),
            count,
        }
        .into()),
    }
}

/// Look up an existing file by name and exact MIME type under `folder_id`.
///
/// `Ok(None)` when there is none, `Ok(Some(id))` for exactly one; more than
/// one is an error.
pub fn find_existing_file(
    api: &dyn DriveApi,
    file_name: &str,
    folder_id: &str,
    mime_type: &str,
) -> Result<Option<String>> {
    let query = query::files_in_folder(file_name, folder_id, mime_type);
    debug!("File query: {}", query);

    let mut matches: Vec<String> = api
        .list_files(&query)?
        .into_iter()
        .filter(|f| f.mime_type == mime_type)
        .map(|f| f.id)
        .collect();

    match matches.len() {
        0 => {
            info!("File '{}' not found in folder {}", file_name, folder_id);
            Ok(None)
        }
        1 => {
            let id = matches.remove(0);
            info!("File '{}' found with ID: {}", file_name, id);
            Ok(Some(id))
        }
        count => Err(ResolutionError::AmbiguousFile {
            folder_id: folder_id.to_string(),
            count,
        }
        .into()),
    }
}
