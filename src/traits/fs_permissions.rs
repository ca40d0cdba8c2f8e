//! Permission management operations.

use std::path::Path;

use crate::{Permissions, VfsError};

/// Permission management operations.
///
/// Reading permissions is done via [`FsRead::metadata`](super::FsRead::metadata).
/// Only meaningful on mounts advertising `posix_permissions`; other backends
/// return [`VfsError::NotSupported`] or [`VfsError::ReadOnly`].
pub trait FsPermissions: Send + Sync {
    /// Set permissions on a file or directory.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotSupported`] if the backend has no permission model
    fn set_permissions(&self, path: &Path, perm: Permissions) -> Result<(), VfsError>;
}
