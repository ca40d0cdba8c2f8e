//! Read operations for mounted backends.

use std::io::Read;
use std::path::Path;

use crate::{Metadata, VfsError};

/// Read operations for a mounted backend.
///
/// Every backend supports these; they back [`Operation::Read`](crate::Operation::Read).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access. Backends should use interior mutability (`RwLock`, `Mutex`)
/// for thread-safe state management.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsRead`.
pub trait FsRead: Send + Sync {
    /// Read entire file contents as bytes.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotAFile`] if the path is a directory
    /// - [`VfsError::Closed`] if the backend handle was released
    fn read(&self, path: &Path) -> Result<Vec<u8>, VfsError>;

    /// Read a range of bytes from a file.
    ///
    /// Reading past the end yields a shorter (possibly empty) buffer.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotAFile`] if the path is a directory
    fn read_range(&self, path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, VfsError>;

    /// Check if a path exists.
    ///
    /// Returns `Ok(false)` for missing paths; errors are reserved for
    /// unexpected failures.
    fn exists(&self, path: &Path) -> Result<bool, VfsError>;

    /// Get metadata for a path (follows symlinks).
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    fn metadata(&self, path: &Path) -> Result<Metadata, VfsError>;

    /// Open a file for streaming reads.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotAFile`] if the path is a directory
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError>;
}
