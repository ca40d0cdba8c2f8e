//! # Extension Traits
//!
//! Convenience methods on any backend.
//!
//! [`FsExt`] is implemented for every [`Fs`], including `dyn Backend`, so
//! code holding a [`Location`](crate::Location) can write
//! `location.backend().is_dir(location.path())`.
//!
//! With the `serde` feature, `FsExtJson::read_json` reads and deserializes a
//! JSON document, which is how plugin manifests are read straight out of an
//! archive mount.

use std::cmp::Ordering;
use std::path::Path;

use crate::{DirEntry, FileType, Fs, VfsError};

/// Extension methods for any mounted backend.
///
/// # Example
///
/// ```rust
/// use vfs_mounts::{Fs, FsExt, VfsError};
/// use std::path::Path;
///
/// fn describe(fs: &dyn Fs, path: &Path) -> Result<&'static str, VfsError> {
///     Ok(if fs.is_dir(path)? {
///         "directory"
///     } else if fs.is_file(path)? {
///         "file"
///     } else {
///         "missing"
///     })
/// }
/// ```
pub trait FsExt: Fs {
    /// Check if the path points to a regular file.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_file(&self, path: &Path) -> Result<bool, VfsError> {
        match self.metadata(path) {
            Ok(m) => Ok(m.is_file()),
            Err(VfsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if the path points to a directory.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_dir(&self, path: &Path) -> Result<bool, VfsError> {
        match self.metadata(path) {
            Ok(m) => Ok(m.is_dir()),
            Err(VfsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Size of the file in bytes.
    fn file_size(&self, path: &Path) -> Result<u64, VfsError> {
        Ok(self.metadata(path)?.size)
    }

    /// Read file contents as UTF-8.
    ///
    /// # Errors
    ///
    /// - [`VfsError::InvalidData`] if the file contains invalid UTF-8
    fn read_to_string(&self, path: &Path) -> Result<String, VfsError> {
        String::from_utf8(self.read(path)?).map_err(|_| VfsError::InvalidData {
            path: path.to_path_buf(),
            details: "not valid UTF-8".into(),
        })
    }

    /// Directory listing in panel order: directories first, then by name.
    fn read_dir_sorted(&self, path: &Path) -> Result<Vec<DirEntry>, VfsError> {
        let mut entries = self.read_dir(path)?.collect_all()?;
        entries.sort_by(|a, b| match (a.file_type, b.file_type) {
            (FileType::Directory, FileType::Directory) => a.name.cmp(&b.name),
            (FileType::Directory, _) => Ordering::Less,
            (_, FileType::Directory) => Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });
        Ok(entries)
    }
}

impl<B: Fs + ?Sized> FsExt for B {}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::de::DeserializeOwned;

    /// JSON helpers for any backend.
    pub trait FsExtJson: Fs {
        /// Read and deserialize a JSON file.
        ///
        /// # Errors
        ///
        /// - [`VfsError::Deserialization`] if the content is not valid JSON for `T`
        fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, VfsError> {
            let data = self.read_to_string(path)?;
            serde_json::from_str(&data).map_err(|e| VfsError::Deserialization(e.to_string()))
        }
    }

    impl<B: Fs + ?Sized> FsExtJson for B {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;
