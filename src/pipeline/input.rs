//! Input resolution: normalise user-supplied paths to named, sized files.
//!
//! A browser file picker hands the page a list of named `File` objects
//! and cannot produce a missing or unreadable entry. Paths on a command
//! line can be anything, so this stage re-creates the picker's guarantee:
//! every [`SelectedFile`] that comes out of here existed, was a regular
//! file, and was readable at resolution time. Later stages only deal in
//! names and sizes until the upload actually reads the bytes.

use crate::error::BookpostError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file in the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name without directory components, as the server will see it.
    pub name: String,
    /// Full path for reading the payload at upload time.
    pub path: PathBuf,
    /// Size in bytes at resolution time.
    pub size: u64,
}

/// Resolve paths to selected files, preserving order.
///
/// Fails on the first path that does not exist, is not a regular file,
/// or cannot be read. An empty `paths` slice resolves to an empty
/// selection; whether that is an error is the caller's concern.
pub fn resolve_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SelectedFile>, BookpostError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(resolve_one(path.as_ref())?);
    }
    debug!("resolved {} selected file(s)", files.len());
    Ok(files)
}

fn resolve_one(path: &Path) -> Result<SelectedFile, BookpostError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(BookpostError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(BookpostError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };
    if !metadata.is_file() {
        return Err(BookpostError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    // Directories were caught above; a regular file always has a name.
    let Some(name) = path.file_name() else {
        return Err(BookpostError::NotAFile {
            path: path.to_path_buf(),
        });
    };
    Ok(SelectedFile {
        name: name.to_string_lossy().into_owned(),
        path: path.to_path_buf(),
        size: metadata.len(),
    })
}
