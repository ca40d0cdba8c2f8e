//! Directory operations for mounted backends.

use std::path::Path;

use crate::{DirEntry, VfsError};

/// Directory operations for a mounted backend.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsDir`.
pub trait FsDir: Send + Sync {
    /// List directory contents.
    ///
    /// The outer `Result` indicates whether the directory could be opened;
    /// each item's `Result` indicates whether that specific entry could be read.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotADirectory`] if the path is not a directory
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, VfsError>;

    /// Create a directory (parent must exist).
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if parent directory does not exist
    /// - [`VfsError::AlreadyExists`] if the path already exists
    fn create_dir(&self, path: &Path) -> Result<(), VfsError>;

    /// Create a directory and all parent directories.
    ///
    /// Succeeds if the directory already exists.
    fn create_dir_all(&self, path: &Path) -> Result<(), VfsError>;

    /// Remove an empty directory.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::DirectoryNotEmpty`] if the directory is not empty
    fn remove_dir(&self, path: &Path) -> Result<(), VfsError>;

    /// Remove a directory and all its contents recursively.
    fn remove_dir_all(&self, path: &Path) -> Result<(), VfsError>;
}

/// Iterator over directory entries.
///
/// - Outer `Result` (from [`FsDir::read_dir`]) = "can I open this directory?"
/// - Inner `Result` (per item) = "can I read this entry?"
///
/// # Example
///
/// ```rust
/// use vfs_mounts::{Fs, VfsError};
/// use std::path::Path;
///
/// fn list_names(backend: &dyn Fs) -> Result<Vec<String>, VfsError> {
///     let mut names = Vec::new();
///     for entry in backend.read_dir(Path::new("/"))? {
///         names.push(entry?.name);
///     }
///     Ok(names)
/// }
/// ```
pub struct ReadDirIter(Box<dyn Iterator<Item = Result<DirEntry, VfsError>> + Send + 'static>);

impl ReadDirIter {
    /// Create from any compatible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<DirEntry, VfsError>> + Send + 'static,
    {
        Self(Box::new(iter))
    }

    /// Create from a pre-collected vector.
    pub fn from_vec(entries: Vec<Result<DirEntry, VfsError>>) -> Self {
        Self(Box::new(entries.into_iter()))
    }

    /// Collect all entries, short-circuiting on first error.
    pub fn collect_all(self) -> Result<Vec<DirEntry>, VfsError> {
        self.collect()
    }
}

impl Iterator for ReadDirIter {
    type Item = Result<DirEntry, VfsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}
