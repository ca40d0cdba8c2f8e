//! The pluggable backend factory contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Address, Mount, VfsError};

/// Priority of the local provider; the global minimum.
pub const LOCAL_PRIORITY: i32 = 0;

/// Priority of the built-in archive provider.
pub const ARCHIVE_PRIORITY: i32 = 10;

/// Default priority of plugin-contributed providers.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Factory contributing mounts for a class of addresses.
///
/// The [`Registry`](crate::Registry) probes providers in ascending
/// [`priority`](Self::priority) order and mounts through the first one whose
/// [`supports`](Self::supports) returns `true`.
///
/// # Example
///
/// A plugin overriding the built-in archive handler registers a provider for
/// the same schemes with a lower priority number:
///
/// ```rust
/// use std::sync::Arc;
/// use vfs_mounts::{Address, Mount, MountOptions, Provider, VfsError};
///
/// struct EncryptedZipProvider;
///
/// impl Provider for EncryptedZipProvider {
///     fn supports(&self, address: &Address) -> bool {
///         address.has_scheme("zip")
///     }
///
///     fn mount(&self, address: &Address, options: &MountOptions) -> Result<Arc<Mount>, VfsError> {
///         let _password = options.get("password");
///         Err(VfsError::MountFailed {
///             address: address.to_string(),
///             reason: "not implemented in this example".into(),
///         })
///     }
///
///     fn priority(&self) -> i32 {
///         5
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Whether this provider claims `address`. Must not perform I/O.
    fn supports(&self, address: &Address) -> bool;

    /// Open, or return a cached, mount for `address`.
    ///
    /// # Errors
    ///
    /// Backend failures (permission denied, malformed archive, unreachable
    /// host), reported with the offending address.
    fn mount(&self, address: &Address, options: &MountOptions) -> Result<Arc<Mount>, VfsError>;

    /// Lower numbers are tried first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Name for diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Provider-specific mount parameters (e.g. remote credentials).
///
/// Providers read the keys they understand and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MountOptions(BTreeMap<String, String>);

impl MountOptions {
    /// Empty option bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether no options are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MountOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl Provider for Nothing {
        fn supports(&self, _: &Address) -> bool {
            false
        }

        fn mount(&self, address: &Address, _: &MountOptions) -> Result<Arc<Mount>, VfsError> {
            Err(VfsError::NoProvider {
                address: address.to_string(),
            })
        }
    }

    #[test]
    fn defaults() {
        let p = Nothing;
        assert_eq!(p.priority(), DEFAULT_PRIORITY);
        assert!(p.name().ends_with("Nothing"));
    }

    #[test]
    fn provider_is_object_safe() {
        let p: Arc<dyn Provider> = Arc::new(Nothing);
        assert!(p.name().ends_with("Nothing"));
    }

    #[test]
    fn priorities_are_ordered() {
        assert!(LOCAL_PRIORITY < ARCHIVE_PRIORITY);
        assert!(ARCHIVE_PRIORITY < DEFAULT_PRIORITY);
    }

    #[test]
    fn options_ignore_unknown_keys() {
        let options = MountOptions::new()
            .with("user", "amy")
            .with("region", "eu");
        assert_eq!(options.get("user"), Some("amy"));
        assert_eq!(options.get("password"), None);
        assert_eq!(options.iter().count(), 2);
    }

    #[test]
    fn options_from_pairs() {
        let options: MountOptions = [("a", "1"), ("b", "2")].into_iter().collect();
        assert!(!options.is_empty());
        assert_eq!(options.get("b"), Some("2"));
    }
}
