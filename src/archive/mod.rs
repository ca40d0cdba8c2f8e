//! Archive contents as a read-only filesystem.
//!
//! ## Flow
//!
//! ```text
//! jar:file:///a.zip!/docs/x ──archive_root()──▶ jar:file:///a.zip!/ ──cache──▶ Mount
//!                                                        │ miss / closed
//!                                                        ▼
//!                                              ArchiveOpener::open
//! ```
//!
//! Every entry of one archive shares one cache key, so one archive is backed
//! by at most one open handle. The check-then-open sequence runs under a lock
//! owned by that key alone: concurrent requests for the same archive wait for
//! the first open, requests for other archives proceed.

mod zip;

pub use self::zip::{ZipFs, ZipOpener};

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::{
    ARCHIVE_PRIORITY, Address, Backend, Capabilities, Close, Location, Mount, MountHandle,
    MountOptions, Provider, VfsError,
};

/// The archive codec seam.
///
/// Receives the normalized archive address (`jar:file:///a.zip!/`) and opens
/// a backend over it. [`ZipOpener`] is the built-in implementation.
pub trait ArchiveOpener: Send + Sync + 'static {
    /// Backend produced for an opened archive.
    type Archive: Backend + Close + 'static;

    /// Open the archive named by `address`.
    ///
    /// # Errors
    ///
    /// [`VfsError::MountFailed`] carrying `address` when the archive is
    /// missing, unreadable or malformed.
    fn open(&self, address: &Address, options: &MountOptions) -> Result<Self::Archive, VfsError>;
}

/// Which addresses and files the archive provider handles.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArchiveConfig {
    /// Address schemes claimed, compared ignoring ASCII case.
    pub schemes: Vec<String>,
    /// File extensions (without dot) browsable as archives.
    pub extensions: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            schemes: vec!["jar".into(), "zip".into()],
            extensions: vec!["zip".into(), "jar".into(), "war".into(), "ear".into()],
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<Mount>>>>;

/// [`Provider`] exposing archives as read-only mounts.
///
/// Mounts always carry [`Capabilities::read_only`], whatever the codec could
/// technically do.
pub struct ArchiveProvider<O: ArchiveOpener = ZipOpener> {
    opener: O,
    config: ArchiveConfig,
    cache: DashMap<Address, Slot>,
}

impl ArchiveProvider<ZipOpener> {
    /// Zip-backed provider with the default configuration.
    pub fn new() -> Self {
        Self::with_opener(ZipOpener)
    }
}

impl Default for ArchiveProvider<ZipOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ArchiveOpener> ArchiveProvider<O> {
    /// Provider over a custom codec, default configuration.
    pub fn with_opener(opener: O) -> Self {
        Self::with_config(opener, ArchiveConfig::default())
    }

    /// Provider over a custom codec and configuration.
    pub fn with_config(opener: O, config: ArchiveConfig) -> Self {
        Self {
            opener,
            config,
            cache: DashMap::new(),
        }
    }

    /// Schemes and extensions this provider handles.
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// The codec.
    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Whether a native file should be entered as an archive, judged by its
    /// extension.
    pub fn is_archive_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Mount the archive stored at the native path `archive_file` and return
    /// its root location.
    pub fn mount_and_get_root(&self, archive_file: &Path) -> Result<Location, VfsError> {
        let address = Address::archive(archive_file)?;
        Ok(self.mount(&address, &MountOptions::new())?.root())
    }

    /// Cached mounts whose handles are still open.
    pub fn open_mounts(&self) -> Vec<Arc<Mount>> {
        // Slot locks are never taken while a shard guard is held.
        let slots: Vec<Slot> = self.cache.iter().map(|e| e.value().clone()).collect();
        slots
            .iter()
            .filter_map(|slot| slot.lock().clone())
            .filter(|mount| mount.is_open())
            .collect()
    }

    /// Close every cached archive, e.g. at shutdown. Returns the first error
    /// after attempting all of them.
    pub fn close_all(&self) -> Result<(), VfsError> {
        let mut first_error = None;
        for mount in self.open_mounts() {
            if let Err(e) = mount.close() {
                tracing::warn!(mount = %mount.id(), error = %e, "failed to close archive");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<O: ArchiveOpener> Provider for ArchiveProvider<O> {
    fn supports(&self, address: &Address) -> bool {
        self.config
            .schemes
            .iter()
            .any(|scheme| address.has_scheme(scheme))
    }

    fn mount(&self, address: &Address, options: &MountOptions) -> Result<Arc<Mount>, VfsError> {
        let root = address.archive_root();
        let slot: Slot = self.cache.entry(root.clone()).or_default().value().clone();

        let mut cached = slot.lock();
        if let Some(mount) = cached.as_ref().filter(|mount| mount.is_open()) {
            tracing::debug!(archive = %root, "archive cache hit");
            return Ok(mount.clone());
        }

        let archive = self.opener.open(&root, options)?;
        let mount = Arc::new(Mount::new(
            root.as_str(),
            root.clone(),
            MountHandle::closable(Arc::new(archive)),
            Capabilities::read_only(),
        ));
        tracing::info!(archive = %root, backend = %mount.backend_id(), "mounted archive");
        *cached = Some(mount.clone());
        Ok(mount)
    }

    fn priority(&self) -> i32 {
        ARCHIVE_PRIORITY
    }

    fn name(&self) -> &str {
        "archive"
    }
}
