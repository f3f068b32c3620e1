//! Drive module - Google Drive v3 access.
//!
//! This module contains:
//! - `DriveApi` trait: the three calls the backup needs (list, create, update)
//! - `GoogleDrive`: REST implementation over blocking reqwest
//! - Query builders for the Drive query language
//! - Folder/file resolution on top of `list_files`

pub mod api;
pub mod google;
pub mod locator;
pub mod query;

pub use api::{DriveApi, RemoteFile, FOLDER_MIME_TYPE};
pub use google::GoogleDrive;
pub use locator::{find_existing_file, resolve_folder};
