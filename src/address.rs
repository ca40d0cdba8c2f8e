//! Scheme-qualified locators.
//!
//! ## Syntax
//!
//! | Form | Example | Handled by |
//! |------|---------|------------|
//! | bare path | `/home/amy`, `C:\Users` | local provider |
//! | hierarchical | `file:///home/amy` | local provider |
//! | opaque, nested | `jar:file:///tmp/a.zip!/docs/readme.txt` | archive provider |
//! | hierarchical, remote | `sftp://host/srv` | plugin providers |
//!
//! A scheme must be at least two characters long, so `C:\` is a path and not
//! a scheme named `C`.
//!
//! ## Entry separator
//!
//! Opaque addresses carry no structured path. The inner entry path follows the
//! first [`ENTRY_SEPARATOR`] in the scheme-specific part; everything before it
//! names the container (the archive file). [`Address::split_entry`] is the one
//! place that convention is applied, shared by path resolution and archive
//! normalization.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::VfsError;

/// Token separating a container address from the entry path inside it.
pub const ENTRY_SEPARATOR: &str = "!/";

/// An address as handed to [`Registry::resolve`](crate::Registry::resolve).
///
/// ```rust
/// use vfs_mounts::Address;
///
/// let addr = Address::parse("jar:file:///tmp/a.zip!/docs/readme.txt").unwrap();
/// assert_eq!(addr.scheme(), Some("jar"));
/// assert!(addr.is_opaque());
/// assert_eq!(addr.entry_path(), "/docs/readme.txt");
/// assert_eq!(addr.archive_root().as_str(), "jar:file:///tmp/a.zip!/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    raw: String,
    /// Byte length of the scheme, excluding the `:`.
    scheme_len: Option<usize>,
}

impl Address {
    /// Parse an address. Only the empty string is rejected.
    pub fn parse(text: &str) -> Result<Self, VfsError> {
        if text.trim().is_empty() {
            return Err(VfsError::InvalidAddress {
                address: text.to_string(),
                reason: "empty address".into(),
            });
        }
        Ok(Self {
            raw: text.to_string(),
            scheme_len: scheme_len(text),
        })
    }

    /// `file:///`, the address of the local mount.
    pub(crate) fn local_root() -> Self {
        Self {
            raw: "file:///".to_string(),
            scheme_len: Some("file".len()),
        }
    }

    /// `file:` address for a native path. Relative paths are made absolute
    /// against the current directory.
    pub fn from_native_path(path: &Path) -> Result<Self, VfsError> {
        let absolute =
            std::path::absolute(path).map_err(|e| VfsError::from_io("absolute", path, e))?;
        let mut text = absolute
            .to_str()
            .ok_or_else(|| VfsError::InvalidAddress {
                address: absolute.display().to_string(),
                reason: "path is not valid UTF-8".into(),
            })?
            .to_string();
        if cfg!(windows) {
            text = text.replace('\\', "/");
        }
        if !text.starts_with('/') {
            text.insert(0, '/');
        }
        Self::parse(&format!("file://{}", percent_encode(&text)))
    }

    /// Root address of the archive stored at `archive_file`:
    /// `jar:file:///path/to/archive.zip!/`.
    pub fn archive(archive_file: &Path) -> Result<Self, VfsError> {
        let file = Self::from_native_path(archive_file)?;
        Self::parse(&format!("jar:{}{}", file.raw, ENTRY_SEPARATOR))
    }

    /// Full address text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Scheme, as written.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme_len.map(|len| &self.raw[..len])
    }

    /// Whether the scheme equals `scheme`, ignoring ASCII case.
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.scheme()
            .is_some_and(|own| own.eq_ignore_ascii_case(scheme))
    }

    /// Text after `scheme:`, or the whole address when there is no scheme.
    pub fn scheme_specific_part(&self) -> &str {
        match self.scheme_len {
            Some(len) => &self.raw[len + 1..],
            None => &self.raw,
        }
    }

    /// Opaque addresses have a scheme but no hierarchical path.
    pub fn is_opaque(&self) -> bool {
        self.scheme_len.is_some() && !self.scheme_specific_part().starts_with('/')
    }

    /// Path component of a hierarchical address (`scheme://authority/path`),
    /// percent-decoded.
    pub fn hierarchical_path(&self) -> Option<String> {
        if self.is_opaque() {
            return None;
        }
        let ssp = self.scheme_specific_part();
        if self.scheme_len.is_none() {
            return Some(ssp.to_string());
        }
        let path = match ssp.strip_prefix("//") {
            Some(rest) => rest.find('/').map_or("", |slash| &rest[slash..]),
            None => ssp,
        };
        let path = path.split(['?', '#']).next().unwrap_or(path);
        Some(percent_decode(path))
    }

    /// Native path for local addresses: bare paths verbatim, `file:` URLs
    /// decoded. `None` for every other scheme.
    pub fn native_path(&self) -> Option<PathBuf> {
        match self.scheme_len {
            None => Some(PathBuf::from(&self.raw)),
            Some(_) if self.has_scheme("file") => file_url_path(self.scheme_specific_part()),
            Some(_) => None,
        }
    }

    /// Split on the first [`ENTRY_SEPARATOR`] of the scheme-specific part.
    ///
    /// Returns the container text and the entry path, which keeps its
    /// leading `/`.
    pub fn split_entry(&self) -> Option<(&str, &str)> {
        let ssp = self.scheme_specific_part();
        ssp.find(ENTRY_SEPARATOR)
            .map(|bang| (&ssp[..bang], &ssp[bang + 1..]))
    }

    /// Path inside the mount this address points into.
    ///
    /// After the separator when there is one; otherwise the hierarchical path,
    /// or the whole scheme-specific part for opaque addresses. Percent-decoded.
    /// Never empty: falls back to `/`.
    pub fn entry_path(&self) -> String {
        let path = match self.split_entry() {
            Some((_, entry)) => percent_decode(entry),
            None => self
                .hierarchical_path()
                .unwrap_or_else(|| percent_decode(self.scheme_specific_part())),
        };
        if path.is_empty() { "/".to_string() } else { path }
    }

    /// Address with the entry path stripped, keeping the separator, and the
    /// scheme lowercased: `JAR:file:///a.zip!/x/y` becomes
    /// `jar:file:///a.zip!/`.
    ///
    /// Addresses without a separator only have their scheme lowercased.
    pub fn archive_root(&self) -> Address {
        let end = self
            .raw
            .find(ENTRY_SEPARATOR)
            .map_or(self.raw.len(), |bang| bang + ENTRY_SEPARATOR.len());
        let mut raw = self.raw[..end].to_string();
        if let Some(len) = self.scheme_len {
            raw[..len].make_ascii_lowercase();
        }
        Address {
            raw,
            scheme_len: self.scheme_len,
        }
    }

    /// Native path of the archive file a nested address points into.
    pub fn archive_file(&self) -> Option<PathBuf> {
        let container = match self.split_entry() {
            Some((container, _)) => container,
            None => self.scheme_specific_part(),
        };
        Address::parse(container).ok()?.native_path()
    }
}

impl FromStr for Address {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ), then `:`.
fn scheme_len(text: &str) -> Option<usize> {
    let colon = text.find(':')?;
    let scheme = &text[..colon];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    // Single letters are drive names.
    (valid && scheme.len() > 1).then_some(colon)
}

/// Path of a `file:` scheme-specific part: `///p`, `//localhost/p`, `/p`.
fn file_url_path(ssp: &str) -> Option<PathBuf> {
    let path = match ssp.strip_prefix("//") {
        Some(rest) => {
            let slash = rest.find('/').unwrap_or(rest.len());
            let (authority, path) = rest.split_at(slash);
            if authority.is_empty() || authority.eq_ignore_ascii_case("localhost") {
                path.to_string()
            } else {
                // UNC share
                format!("//{authority}{path}")
            }
        }
        None => ssp.to_string(),
    };
    let mut path = percent_decode(&path);
    if path.is_empty() {
        path.push('/');
    }
    if cfg!(windows) && has_drive_prefix(&path) {
        path.remove(0);
    }
    Some(PathBuf::from(path))
}

/// `/C:` or `/C:/...`
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':'
        && (bytes.len() == 3 || bytes[3] == b'/')
}

fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'/'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b':'
            | b'@'
            | b'+'
            | b',' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
