//! File operations a mount may or may not support.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// A file operation a mounted backend may support.
///
/// Used by [`Capabilities`](crate::Capabilities) to advertise what a backend
/// can do, so the UI can enable or disable actions accordingly.
///
/// ```rust
/// use vfs_mounts::Operation;
///
/// assert_eq!(Operation::CreateDirectory.to_string(), "create_directory");
/// assert_eq!("DELETE".parse::<Operation>().unwrap(), Operation::Delete);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operation {
    /// Browse / iterate directory contents.
    List,
    /// Read file contents.
    Read,
    /// Create or overwrite files.
    Write,
    /// Remove files and directories.
    Delete,
    /// Move entries to another directory.
    Move,
    /// Rename in place.
    Rename,
    /// Duplicate entries.
    Copy,
    /// Create directories.
    CreateDirectory,
    /// Receive change notifications for a directory.
    Watch,
    /// Change permission bits.
    SetPermissions,
}

impl Operation {
    /// Bit used by the compact operation set inside `Capabilities`.
    #[inline]
    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}
