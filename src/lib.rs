//! # vfs-mounts
//!
//! Pluggable mounting layer for a virtual filesystem: turns addresses
//! (`/home/me`, `file:///C:/x`, `jar:file:///a.zip!/docs`) into locations on
//! a mounted backend, and tells callers which operations each mount allows.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use vfs_mounts::{Address, FsDir, Operation, Registry};
//!
//! let registry = Registry::with_defaults();
//!
//! let address = Address::parse("/").unwrap();
//! let location = registry.path_for(&address).unwrap();
//!
//! if registry.capabilities_for(&location).supports(Operation::List) {
//!     for entry in location.backend().read_dir(location.path()).unwrap() {
//!         let _ = entry.unwrap().name;
//!     }
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Registry`] | Priority-ordered providers, address resolution, reverse index |
//! | [`Provider`] | Factory contributing mounts for a class of addresses |
//! | [`Mount`] | A live backend with its identity and [`Capabilities`] |
//! | [`Location`] | A path bound to the backend that owns it |
//! | [`Capabilities`] | Which [`Operation`]s a mount permits, plus feature flags |
//! | [`Address`] | Parsed address text, including the `!/` entry convention |
//! | [`VfsError`] | Error type carrying the offending address or path |
//!
//! ---
//!
//! ## Built-in Providers
//!
//! | Provider | Claims | Priority | Capabilities |
//! |----------|--------|----------|--------------|
//! | [`LocalProvider`] | bare paths, `file:` | [`LOCAL_PRIORITY`] | [`Capabilities::host`] |
//! | [`ArchiveProvider`] | `jar:`, `zip:` | [`ARCHIVE_PRIORITY`] | [`Capabilities::read_only`] |
//!
//! Plugins register their own through [`Registry::register_provider`]; a
//! lower priority number overrides a built-in for the same scheme.
//!
//! ---
//!
//! ## Backend Traits
//!
//! ```text
//! FsRead + FsWrite + FsDir + FsPermissions = Fs
//!                                            ↓
//!                           Fs + id/is_open/roots = Backend
//! ```
//!
//! [`Fs`] has a blanket implementation. Mount handles that can be released
//! also implement [`Close`].
//!
//! ---
//!
//! ## Error Handling
//!
//! ```rust
//! use vfs_mounts::VfsError;
//! use std::path::PathBuf;
//!
//! let err = VfsError::NotFound { path: PathBuf::from("/missing.txt") };
//! assert_eq!(err.to_string(), "not found: /missing.txt");
//!
//! let err = VfsError::ReadOnly { operation: "write" };
//! assert_eq!(err.to_string(), "read-only filesystem: write");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! Every type here is `Send + Sync` and every method takes `&self`. Share one
//! [`Registry`] behind an `Arc`. Concurrent mounts of the same archive open
//! it once; mounts of different archives do not wait on each other.
//!
//! ---
//!
//! ## Logging
//!
//! Emits [`tracing`](https://docs.rs/tracing) events: provider registration
//! and archive mount/close at `info`, resolution and cache hits at `debug`,
//! unclaimed addresses at `warn`. Install any subscriber to see them.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Operation`], [`Capabilities`], [`Metadata`], [`ArchiveConfig`], etc., plus `FsExtJson` |

// Private modules
mod address;
mod archive;
mod capabilities;
mod error;
mod ext;
mod local;
mod mount;
mod operation;
mod provider;
mod registry;
mod traits;
mod types;

// Public re-exports - error types
pub use error::VfsError;

// Public re-exports - core types
pub use types::{DirEntry, FileType, Metadata, Permissions};

// Public re-exports - backend traits
pub use traits::{
    Backend, BackendId, Close, Fs, FsDir, FsPermissions, FsRead, FsWrite, ReadDirIter,
};

// Public re-exports - capability model
pub use capabilities::Capabilities;
pub use operation::Operation;

// Public re-exports - addressing and mounts
pub use address::{Address, ENTRY_SEPARATOR};
pub use mount::{Location, Mount, MountHandle};
pub use provider::{ARCHIVE_PRIORITY, DEFAULT_PRIORITY, LOCAL_PRIORITY, MountOptions, Provider};

// Public re-exports - providers
pub use archive::{ArchiveConfig, ArchiveOpener, ArchiveProvider, ZipFs, ZipOpener};
pub use local::{LOCAL_MOUNT_ID, LocalProvider, NativeFs};

// Public re-exports - infrastructure
pub use ext::FsExt;
pub use registry::Registry;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;
