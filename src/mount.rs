//! Live mounts and locations inside them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Address, Backend, BackendId, Capabilities, Close, VfsError};

/// How a mount holds its backend, and whether it can ever be released.
#[derive(Clone)]
pub enum MountHandle {
    /// Lives for the whole process. Closing is a no-op.
    Pinned(Arc<dyn Backend>),
    /// Released through its [`Close`] implementation.
    Closable {
        /// The backend serving I/O.
        backend: Arc<dyn Backend>,
        /// Release hook of the same resource.
        closer: Arc<dyn Close>,
    },
}

impl MountHandle {
    /// Handle that is never released.
    pub fn pinned<B: Backend + 'static>(backend: Arc<B>) -> Self {
        Self::Pinned(backend)
    }

    /// Handle released by `backend`'s own [`Close`].
    pub fn closable<B: Backend + Close + 'static>(backend: Arc<B>) -> Self {
        Self::Closable {
            backend: backend.clone(),
            closer: backend,
        }
    }

    /// The backend serving I/O.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        match self {
            Self::Pinned(backend) | Self::Closable { backend, .. } => backend,
        }
    }
}

impl fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pinned(backend) => f.debug_tuple("Pinned").field(backend).finish(),
            Self::Closable { backend, .. } => f.debug_tuple("Closable").field(backend).finish(),
        }
    }
}

/// A live, mounted backend with its metadata.
///
/// Produced by a [`Provider`](crate::Provider). Release is explicit through
/// [`Mount::close`]; dropping a mount never releases its backend.
#[derive(Debug)]
pub struct Mount {
    id: String,
    address: Address,
    handle: MountHandle,
    capabilities: Capabilities,
}

impl Mount {
    /// Assemble a mount.
    ///
    /// * `id` - stable identifier (e.g. `"local"` or the archive address)
    /// * `address` - the address the mount was opened for
    pub fn new(
        id: impl Into<String>,
        address: Address,
        handle: MountHandle,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            id: id.into(),
            address,
            handle,
            capabilities,
        }
    }

    /// Stable identifier: `"local"` or the archive root address.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The (normalized) address this mount was opened for.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Pinned or closable handle.
    pub fn handle(&self) -> &MountHandle {
        &self.handle
    }

    /// The backend serving I/O for this mount.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        self.handle.backend()
    }

    /// Identity of the backend, the reverse-index key.
    pub fn backend_id(&self) -> BackendId {
        self.backend().id()
    }

    /// Fixed for the lifetime of the mount.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether the backend is still usable.
    pub fn is_open(&self) -> bool {
        self.backend().is_open()
    }

    /// Whether [`close`](Self::close) actually releases anything.
    pub fn is_closable(&self) -> bool {
        matches!(self.handle, MountHandle::Closable { .. })
    }

    /// Location of `path` inside this mount.
    pub fn location(&self, path: impl Into<PathBuf>) -> Location {
        Location::new(self.backend().clone(), path)
    }

    /// Root location (`/`) of this mount.
    pub fn root(&self) -> Location {
        self.location("/")
    }

    /// Release the backend. Pinned mounts ignore the call.
    pub fn close(&self) -> Result<(), VfsError> {
        match &self.handle {
            MountHandle::Pinned(_) => Ok(()),
            MountHandle::Closable { closer, .. } => {
                tracing::info!(mount = %self.id, "closing mount");
                closer.close()
            }
        }
    }
}

/// A path bound to the backend that owns it.
///
/// Two locations are equal when they share backend identity and path. The
/// string form is the path alone, so a local location formats as a bare
/// path address.
#[derive(Clone)]
pub struct Location {
    backend: Arc<dyn Backend>,
    path: PathBuf,
}

impl Location {
    /// Bind `path` to `backend`.
    pub fn new(backend: Arc<dyn Backend>, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: path.into(),
        }
    }

    /// Backend to run I/O against.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Identity of the owning backend.
    pub fn backend_id(&self) -> BackendId {
        self.backend.id()
    }

    /// Path inside the backend.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Child location in the same backend.
    pub fn join(&self, name: impl AsRef<Path>) -> Location {
        Location::new(self.backend.clone(), self.path.join(name))
    }

    /// Parent location, `None` at a root.
    pub fn parent(&self) -> Option<Location> {
        self.path
            .parent()
            .map(|parent| Location::new(self.backend.clone(), parent))
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.backend_id() == other.backend_id() && self.path == other.path
    }
}

impl Eq for Location {}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("backend", &self.backend_id())
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
