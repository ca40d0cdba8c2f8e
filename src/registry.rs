//! # Mount Registry
//!
//! The single entry point through which addresses become locations.
//!
//! ```text
//! resolve(address)
//!     │
//!     ├─▶ providers, ascending priority ──first supports()──▶ Provider::mount
//!     │                                                            │
//!     └─▶ reverse index  BackendId ──▶ Mount  ◀─────insert if absent┘
//! ```
//!
//! The local mount is seeded into the reverse index at construction, so
//! every native location has capabilities before anything is resolved.
//! The index only grows: a closed archive keeps its entry, and its
//! locations keep reporting read-only capabilities.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::{
    Address, ArchiveProvider, BackendId, Capabilities, LocalProvider, Location, Mount,
    MountOptions, Provider, VfsError,
};

/// Priority-ordered providers plus the backend-to-mount reverse index.
///
/// Constructed once at startup and shared by reference (usually behind an
/// `Arc`). All methods take `&self`.
///
/// # Example
///
/// ```rust
/// use vfs_mounts::{Address, Operation, Registry};
///
/// let registry = Registry::with_defaults();
/// let home = registry.path_for(&Address::parse("/").unwrap()).unwrap();
/// assert!(registry.capabilities_for(&home).supports(Operation::Write));
/// ```
pub struct Registry {
    providers: RwLock<Vec<Arc<dyn Provider>>>,
    mounts: DashMap<BackendId, Arc<Mount>>,
    local: Arc<Mount>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<String> = self
            .providers
            .read()
            .iter()
            .map(|p| format!("{}@{}", p.name(), p.priority()))
            .collect();
        f.debug_struct("Registry")
            .field("providers", &providers)
            .field("mounts", &self.mounts.len())
            .finish()
    }
}

impl Registry {
    /// Registry holding only `local`, with its mount already indexed.
    pub fn new(local: LocalProvider) -> Self {
        let mount = local.local_mount().clone();
        let mounts = DashMap::new();
        mounts.insert(mount.backend_id(), mount.clone());
        tracing::debug!(backend = %mount.backend_id(), "seeded local mount");
        Self {
            providers: RwLock::new(vec![Arc::new(local) as Arc<dyn Provider>]),
            mounts,
            local: mount,
        }
    }

    /// Local provider for the host OS plus the zip archive provider.
    pub fn with_defaults() -> Self {
        let registry = Self::new(LocalProvider::new());
        registry.register_provider(Arc::new(ArchiveProvider::new()));
        registry
    }

    /// Add a provider. Visible to the next resolution.
    ///
    /// Equal priorities keep registration order, so an earlier provider wins
    /// ties.
    pub fn register_provider(&self, provider: Arc<dyn Provider>) {
        tracing::info!(
            provider = provider.name(),
            priority = provider.priority(),
            "registered mount provider"
        );
        let mut providers = self.providers.write();
        providers.push(provider);
        providers.sort_by_key(|p| p.priority());
    }

    /// Snapshot of the providers in probe order.
    pub fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers.read().clone()
    }

    /// The local filesystem mount.
    pub fn local_mount(&self) -> &Arc<Mount> {
        &self.local
    }

    /// Mount serving `address`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NoProvider`] if no provider claims the address
    /// - whatever the claiming provider's mount returns, unchanged
    pub fn resolve(&self, address: &Address) -> Result<Arc<Mount>, VfsError> {
        self.resolve_with(address, &MountOptions::new())
    }

    /// [`resolve`](Self::resolve) with provider-specific options.
    pub fn resolve_with(
        &self,
        address: &Address,
        options: &MountOptions,
    ) -> Result<Arc<Mount>, VfsError> {
        // Snapshot so a slow mount never holds the provider lock.
        let provider = self
            .providers
            .read()
            .iter()
            .find(|p| p.supports(address))
            .cloned();
        let Some(provider) = provider else {
            tracing::warn!(%address, "no mount provider");
            return Err(VfsError::NoProvider {
                address: address.to_string(),
            });
        };

        tracing::debug!(%address, provider = provider.name(), "resolving");
        let mount = provider.mount(address, options)?;
        self.mounts
            .entry(mount.backend_id())
            .or_insert_with(|| mount.clone());
        Ok(mount)
    }

    /// Resolve `address` and return the location it names inside its mount.
    ///
    /// Local addresses keep their native path verbatim. Everything else uses
    /// the text after the first `!/`, or `/` when that is empty.
    pub fn path_for(&self, address: &Address) -> Result<Location, VfsError> {
        let mount = self.resolve(address)?;
        if mount.backend_id() == self.local.backend_id() {
            let path = address
                .native_path()
                .ok_or_else(|| VfsError::InvalidAddress {
                    address: address.to_string(),
                    reason: "not a native path".into(),
                })?;
            return Ok(mount.location(path));
        }
        Ok(mount.location(address.entry_path()))
    }

    /// Mount owning `location`'s backend, if it was resolved through this
    /// registry.
    pub fn for_path(&self, location: &Location) -> Option<Arc<Mount>> {
        self.mounts
            .get(&location.backend_id())
            .map(|entry| entry.value().clone())
    }

    /// Capabilities of the mount owning `location`.
    ///
    /// Never-resolved backends get [`Capabilities::local_non_posix`].
    pub fn capabilities_for(&self, location: &Location) -> Capabilities {
        self.for_path(location)
            .map_or_else(Capabilities::local_non_posix, |mount| mount.capabilities())
    }

    /// Native roots of the local filesystem (drive letters on Windows, `/`
    /// elsewhere). Other mounts are never consulted.
    pub fn list_local_roots(&self) -> Vec<Location> {
        self.local
            .backend()
            .roots()
            .into_iter()
            .map(|root| self.local.location(root))
            .collect()
    }

    /// Root of the archive stored at the native path `archive_file`.
    pub fn open_archive(&self, archive_file: &Path) -> Result<Location, VfsError> {
        let address = Address::archive(archive_file)?;
        Ok(self.resolve(&address)?.root())
    }

    /// Native location of the archive file backing `location`, for leaving
    /// an archive back to the directory that contains it.
    ///
    /// `None` for local locations and unknown backends.
    pub fn archive_origin(&self, location: &Location) -> Option<Location> {
        let mount = self.for_path(location)?;
        mount.address().split_entry()?;
        let file = mount.address().archive_file()?;
        Some(self.local.location(file))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
