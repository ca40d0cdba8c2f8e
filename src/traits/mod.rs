//! # Backend Traits
//!
//! The I/O contract every mounted backend implements.
//!
//! ```text
//! FsRead + FsWrite + FsDir + FsPermissions = Fs
//!                                            ↓
//!                         Fs + identity/roots = Backend
//!                                            ↓
//!                    Backend + Close (releasable handles only)
//! ```
//!
//! The component traits mirror the [`Operation`](crate::Operation) vocabulary.
//! A backend always implements all of them; read-only backends answer the
//! mutating calls with [`VfsError::ReadOnly`](crate::VfsError::ReadOnly).
//! What a mount *advertises* lives in its [`Capabilities`](crate::Capabilities).
//!
//! All traits require `Send + Sync` and are object-safe: mounts hold their
//! backend as `Arc<dyn Backend>`.

mod backend;
mod fs_dir;
mod fs_permissions;
mod fs_read;
mod fs_write;

pub use backend::{Backend, BackendId, Close};
pub use fs_dir::{FsDir, ReadDirIter};
pub use fs_permissions::FsPermissions;
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// Full backend I/O surface.
///
/// Automatically implemented for any type that implements all four component
/// traits.
///
/// # Example
///
/// ```rust
/// use vfs_mounts::{Fs, VfsError};
/// use std::path::Path;
///
/// fn duplicate(fs: &dyn Fs, src: &Path, dst: &Path) -> Result<(), VfsError> {
///     let data = fs.read(src)?;
///     if let Some(parent) = dst.parent() {
///         fs.create_dir_all(parent)?;
///     }
///     fs.write(dst, &data)
/// }
/// ```
pub trait Fs: FsRead + FsWrite + FsDir + FsPermissions {}

impl<T: FsRead + FsWrite + FsDir + FsPermissions> Fs for T {}
