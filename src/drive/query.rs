//! Drive query language builders.
//!
//! Terms are ANDed; string literals are single-quoted with `\` and `'`
//! backslash-escaped.

use super::api::FOLDER_MIME_TYPE;

/// Quote a string literal for a Drive query.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Folders whose name contains `name`.
pub fn folders_named(name: &str) -> String {
    format!(
        "mimeType = {} and name contains {} and trashed = false",
        quote(FOLDER_MIME_TYPE),
        quote(name)
    )
}

/// Files of `mime_type` whose name contains `name`, directly under `folder_id`.
pub fn files_in_folder(name: &str, folder_id: &str, mime_type: &str) -> String {
    format!(
        "mimeType = {} and name contains {} and {} in parents and trashed = false",
        quote(mime_type),
        quote(name),
        quote(folder_id)
    )
}
