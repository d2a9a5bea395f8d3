//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|source| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Write bytes to a file, creating parent directories
pub fn write_bytes(path: &Path, content: &[u8]) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|source| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole file
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, FilesystemError> {
    std::fs::read(path).map_err(|source| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove a file if it exists
pub fn remove_file(path: &Path) -> Result<(), FilesystemError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FilesystemError::RemoveFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
