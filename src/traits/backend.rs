//! Backend identity and release.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Fs, VfsError};

static NEXT_BACKEND_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a backend handle.
///
/// One handle backs many locations, so the registry's reverse index is keyed
/// by this id rather than by address text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(u64);

impl BackendId {
    /// Allocate a fresh id. Never returns the same value twice in one process.
    pub fn next() -> Self {
        Self(NEXT_BACKEND_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend#{}", self.0)
    }
}

/// A live backend resource owned by a [`Mount`](crate::Mount).
pub trait Backend: Fs + fmt::Debug {
    /// Identity used by the registry's reverse index.
    fn id(&self) -> BackendId;

    /// Whether the handle can still serve requests.
    fn is_open(&self) -> bool {
        true
    }

    /// Root directories of this backend.
    fn roots(&self) -> Vec<PathBuf> {
        vec![PathBuf::from("/")]
    }
}

/// Explicit release of a backend resource.
///
/// Only backends that own something worth releasing implement this; the
/// native filesystem does not.
pub trait Close: Send + Sync {
    /// Release the resource. Closing twice is not an error.
    fn close(&self) -> Result<(), VfsError>;
}
