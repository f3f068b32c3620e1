//! Staging of the local artifact that gets uploaded.
//!
//! Workflow: source → gzip (or plain copy) → `<staging_dir>/<file name>`

use crate::error::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write the upload artifact for `source` into `staging_dir` under
/// `file_name`. Returns the path of the staged file.
///
/// Fails with `Error::Config` when the staged path resolves to `source`
/// itself; the staged file is deleted after upload.
pub fn stage(source: &Path, staging_dir: &Path, file_name: &str, compress: bool) -> Result<PathBuf> {
    fs::create_dir_all(staging_dir).map_err(|e| Error::io(staging_dir, e))?;
    let dest = staging_dir.join(file_name);

    if same_file(source, &dest)? {
        return Err(Error::Config(format!(
            "staging path {} is the file being backed up; set staging_dir elsewhere",
            dest.display()
        )));
    }

    if compress {
        gzip_file(source, &dest)?;
    } else {
        fs::copy(source, &dest).map_err(|e| Error::io(source, e))?;
    }

    Ok(dest)
}

/// Whether `dest` already exists and resolves to the same path as `source`.
fn same_file(source: &Path, dest: &Path) -> Result<bool> {
    let source = fs::canonicalize(source).map_err(|e| Error::io(source, e))?;
    match fs::canonicalize(dest) {
        Ok(dest) => Ok(dest == source),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(dest, e)),
    }
}

/// Stream `source` through a gzip encoder into `dest`.
pub fn gzip_file(source: &Path, dest: &Path) -> Result<()> {
    let input = File::open(source).map_err(|e| Error::io(source, e))?;
    let output = File::create(dest).map_err(|e| Error::io(dest, e))?;

    let mut reader = BufReader::new(input);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    io::copy(&mut reader, &mut encoder).map_err(|e| Error::io(source, e))?;

    encoder
        .finish()
        .and_then(|mut writer| writer.flush())
        .map_err(|e| Error::io(dest, e))?;

    Ok(())
}
