//! Write operations for mounted backends.

use std::path::Path;

use crate::VfsError;

/// Write operations for a mounted backend.
///
/// Read-only backends still implement this trait and reject every call with
/// [`VfsError::ReadOnly`]. Callers gate on [`Capabilities`](crate::Capabilities)
/// first; the rejection is the backstop.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsWrite`.
pub trait FsWrite: Send + Sync {
    /// Write data to a file (creates if not exists, truncates if exists).
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if parent directory does not exist
    /// - [`VfsError::NotAFile`] if the path is a directory
    /// - [`VfsError::ReadOnly`] on read-only backends
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), VfsError>;

    /// Append data to a file (creates if not exists).
    fn append(&self, path: &Path, data: &[u8]) -> Result<(), VfsError>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the file does not exist
    /// - [`VfsError::NotAFile`] if the path is a directory (use [`FsDir::remove_dir`](super::FsDir::remove_dir))
    fn remove_file(&self, path: &Path) -> Result<(), VfsError>;

    /// Rename/move a file or directory within the same mount.
    ///
    /// Atomic when the mount advertises `atomic_move`.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), VfsError>;

    /// Copy a file within the same mount.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the source file does not exist
    /// - [`VfsError::NotAFile`] if the source is a directory
    fn copy(&self, from: &Path, to: &Path) -> Result<(), VfsError>;
}
