//! What a mounted backend can do.

use strum::IntoEnumIterator;

use crate::Operation;

/// Compact set of [`Operation`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OperationSet(u16);

impl OperationSet {
    const fn of(ops: &[Operation]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < ops.len() {
            bits |= ops[i].bit();
            i += 1;
        }
        Self(bits)
    }

    const fn contains(self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }
}

/// Describes what a mounted filesystem can do.
///
/// Attached 1:1 to a [`Mount`](crate::Mount). This is a contract, not a
/// hint: callers gate destructive operations on it. Values only come from
/// the three presets, so inconsistent combinations cannot be built.
///
/// ```rust
/// use vfs_mounts::{Capabilities, Operation};
///
/// let caps = Capabilities::read_only();
/// assert!(caps.supports(Operation::List));
/// assert!(!caps.supports(Operation::Delete));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    ops: OperationSet,
    atomic_move: bool,
    server_side_copy: bool,
    posix_permissions: bool,
    watch_supported: bool,
}

impl Capabilities {
    /// Read-only backend (archives, anonymous remotes).
    ///
    /// Browsing is the minimum useful capability, so `List` is included
    /// alongside `Read`.
    pub const fn read_only() -> Self {
        Self {
            ops: OperationSet::of(&[Operation::List, Operation::Read]),
            atomic_move: false,
            server_side_copy: false,
            posix_permissions: false,
            watch_supported: false,
        }
    }

    /// Native filesystem without POSIX permissions (Windows, FAT volumes).
    pub const fn local_non_posix() -> Self {
        Self {
            ops: OperationSet::of(&[
                Operation::List,
                Operation::Read,
                Operation::Write,
                Operation::Delete,
                Operation::Move,
                Operation::Rename,
                Operation::Copy,
                Operation::CreateDirectory,
                Operation::Watch,
            ]),
            atomic_move: true,
            server_side_copy: false,
            posix_permissions: false,
            watch_supported: true,
        }
    }

    /// Native POSIX filesystem (Linux, macOS): every operation.
    pub const fn local_posix() -> Self {
        Self {
            ops: OperationSet::of(&[
                Operation::List,
                Operation::Read,
                Operation::Write,
                Operation::Delete,
                Operation::Move,
                Operation::Rename,
                Operation::Copy,
                Operation::CreateDirectory,
                Operation::Watch,
                Operation::SetPermissions,
            ]),
            atomic_move: true,
            server_side_copy: false,
            posix_permissions: true,
            watch_supported: true,
        }
    }

    /// Preset for the filesystem of the host this process runs on.
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::local_non_posix()
        } else {
            Self::local_posix()
        }
    }

    /// Whether `op` is advertised.
    #[inline]
    pub const fn supports(&self, op: Operation) -> bool {
        self.ops.contains(op)
    }

    /// Advertised operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::iter().filter(|op| self.supports(*op))
    }

    /// Whether moves within the mount are atomic.
    #[inline]
    pub const fn atomic_move(&self) -> bool {
        self.atomic_move
    }

    /// Whether copies run on the backend without streaming through the client.
    #[inline]
    pub const fn server_side_copy(&self) -> bool {
        self.server_side_copy
    }

    /// Whether POSIX permission bits are meaningful.
    #[inline]
    pub const fn posix_permissions(&self) -> bool {
        self.posix_permissions
    }

    /// Whether directories can be watched for changes.
    #[inline]
    pub const fn watch_supported(&self) -> bool {
        self.watch_supported
    }

    /// Shorthand for "any mutating operation is advertised".
    pub fn is_writable(&self) -> bool {
        self.operations()
            .any(|op| !matches!(op, Operation::List | Operation::Read))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Capabilities {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let ops: Vec<Operation> = self.operations().collect();
        let mut state = serializer.serialize_struct("Capabilities", 5)?;
        state.serialize_field("ops", &ops)?;
        state.serialize_field("atomic_move", &self.atomic_move)?;
        state.serialize_field("server_side_copy", &self.server_side_copy)?;
        state.serialize_field("posix_permissions", &self.posix_permissions)?;
        state.serialize_field("watch_supported", &self.watch_supported)?;
        state.end()
    }
}
