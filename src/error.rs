//! Error types for the mount layer.

use std::io;
use std::path::{Path, PathBuf};

/// Error type shared by providers, mounts and backends.
///
/// Variants carry the offending address or path so the host UI can show a
/// meaningful dialog without extra bookkeeping.
///
/// # Examples
///
/// ```rust
/// use vfs_mounts::VfsError;
///
/// let err = VfsError::NoProvider { address: "sftp://host/".into() };
/// assert_eq!(err.to_string(), "no mount provider for address: sftp://host/");
/// assert_eq!(err.address(), Some("sftp://host/"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    // Address/Mount Errors
    /// No registered provider claims the address.
    #[error("no mount provider for address: {address}")]
    NoProvider {
        /// The unclaimed address.
        address: String,
    },

    /// The address cannot be parsed or used.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress {
        /// The offending address text.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The backend refused to open (corrupt archive, unreachable host, ...).
    #[error("cannot mount {address}: {reason}")]
    MountFailed {
        /// The address that failed to mount.
        address: String,
        /// Backend-specific reason.
        reason: String,
    },

    /// The backend handle has already been released.
    #[error("mount is closed: {mount}")]
    Closed {
        /// Id of the released mount.
        mount: String,
    },

    // Path/File Errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: PathBuf,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PathBuf,
    },

    /// Directory is not empty when it should be.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: PathBuf,
    },

    // Permission/Access Errors
    /// Permission denied for operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PathBuf,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// Filesystem is read-only.
    #[error("read-only filesystem: {operation}")]
    ReadOnly {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Operation is not supported by the backend.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    // Data Errors
    /// Invalid data encountered.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: PathBuf,
        /// Details about the invalid data.
        details: String,
    },

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl VfsError {
    /// Map an I/O error to the most specific variant, keeping path and operation.
    pub fn from_io(operation: &'static str, path: impl AsRef<Path>, error: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match error.kind() {
            io::ErrorKind::NotFound => VfsError::NotFound { path },
            io::ErrorKind::PermissionDenied => VfsError::PermissionDenied { path, operation },
            io::ErrorKind::AlreadyExists => VfsError::AlreadyExists { path, operation },
            io::ErrorKind::NotADirectory => VfsError::NotADirectory { path },
            io::ErrorKind::IsADirectory => VfsError::NotAFile { path },
            io::ErrorKind::DirectoryNotEmpty => VfsError::DirectoryNotEmpty { path },
            _ => VfsError::Io {
                operation,
                path,
                source: error,
            },
        }
    }

    /// The address this error is about, for variants raised during resolution.
    pub fn address(&self) -> Option<&str> {
        match self {
            VfsError::NoProvider { address }
            | VfsError::InvalidAddress { address, .. }
            | VfsError::MountFailed { address, .. } => Some(address),
            _ => None,
        }
    }
}

impl From<io::Error> for VfsError {
    fn from(error: io::Error) -> Self {
        VfsError::from_io("io", PathBuf::new(), error)
    }
}
