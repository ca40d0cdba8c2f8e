//! The native filesystem: backend and always-on provider.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    Address, Backend, BackendId, Capabilities, DirEntry, FileType, FsDir, FsPermissions, FsRead,
    FsWrite, LOCAL_PRIORITY, Metadata, Mount, MountHandle, MountOptions, Permissions, Provider,
    ReadDirIter, VfsError,
};

/// Id of the local mount.
pub const LOCAL_MOUNT_ID: &str = "local";

/// Backend over `std::fs`.
///
/// Paths are passed to the OS unchanged; the OS resolves them.
#[derive(Debug)]
pub struct NativeFs {
    id: BackendId,
}

impl NativeFs {
    /// Backend with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: BackendId::next(),
        }
    }
}

impl Default for NativeFs {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_metadata(meta: &fs::Metadata) -> Metadata {
    let file_type = if meta.is_dir() {
        FileType::Directory
    } else if meta.is_symlink() {
        FileType::Symlink
    } else {
        FileType::File
    };
    Metadata {
        file_type,
        size: meta.len(),
        permissions: native_permissions(meta),
        modified: meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
    }
}

#[cfg(unix)]
fn native_permissions(meta: &fs::Metadata) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    Permissions::from_mode(meta.permissions().mode())
}

#[cfg(not(unix))]
fn native_permissions(meta: &fs::Metadata) -> Permissions {
    match (meta.permissions().readonly(), meta.is_dir()) {
        (true, _) => Permissions::read_only(),
        (false, true) => Permissions::default_dir(),
        (false, false) => Permissions::default_file(),
    }
}

impl FsRead for NativeFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>, VfsError> {
        fs::read(path).map_err(|e| VfsError::from_io("read", path, e))
    }

    fn read_range(&self, path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, VfsError> {
        let mut file = fs::File::open(path).map_err(|e| VfsError::from_io("read", path, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| VfsError::from_io("seek", path, e))?;
        let mut buf = Vec::with_capacity(len);
        file.take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| VfsError::from_io("read", path, e))?;
        Ok(buf)
    }

    fn exists(&self, path: &Path) -> Result<bool, VfsError> {
        path.try_exists()
            .map_err(|e| VfsError::from_io("exists", path, e))
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, VfsError> {
        fs::metadata(path)
            .map(|meta| convert_metadata(&meta))
            .map_err(|e| VfsError::from_io("metadata", path, e))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
        let file = fs::File::open(path).map_err(|e| VfsError::from_io("open", path, e))?;
        Ok(Box::new(file))
    }
}

impl FsWrite for NativeFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), VfsError> {
        fs::write(path, data).map_err(|e| VfsError::from_io("write", path, e))
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), VfsError> {
        use std::io::Write;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| VfsError::from_io("append", path, e))?;
        file.write_all(data)
            .map_err(|e| VfsError::from_io("append", path, e))
    }

    fn remove_file(&self, path: &Path) -> Result<(), VfsError> {
        fs::remove_file(path).map_err(|e| VfsError::from_io("remove_file", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        fs::rename(from, to).map_err(|e| VfsError::from_io("rename", from, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        if fs::metadata(from)
            .map_err(|e| VfsError::from_io("copy", from, e))?
            .is_dir()
        {
            return Err(VfsError::NotAFile {
                path: from.to_path_buf(),
            });
        }
        fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| VfsError::from_io("copy", from, e))
    }
}

impl FsDir for NativeFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, VfsError> {
        let entries = fs::read_dir(path).map_err(|e| VfsError::from_io("read_dir", path, e))?;
        Ok(ReadDirIter::new(entries.map(|entry| -> Result<DirEntry, VfsError> {
            let entry = entry?;
            let path = entry.path();
            let meta = fs::symlink_metadata(&path)
                .map_err(|e| VfsError::from_io("read_dir", &path, e))?;
            let converted = convert_metadata(&meta);
            Ok(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                file_type: converted.file_type,
                size: converted.size,
            })
        })))
    }

    fn create_dir(&self, path: &Path) -> Result<(), VfsError> {
        fs::create_dir(path).map_err(|e| VfsError::from_io("create_dir", path, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), VfsError> {
        fs::create_dir_all(path).map_err(|e| VfsError::from_io("create_dir_all", path, e))
    }

    fn remove_dir(&self, path: &Path) -> Result<(), VfsError> {
        fs::remove_dir(path).map_err(|e| VfsError::from_io("remove_dir", path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), VfsError> {
        fs::remove_dir_all(path).map_err(|e| VfsError::from_io("remove_dir_all", path, e))
    }
}

impl FsPermissions for NativeFs {
    #[cfg(unix)]
    fn set_permissions(&self, path: &Path, perm: Permissions) -> Result<(), VfsError> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(perm.mode()))
            .map_err(|e| VfsError::from_io("set_permissions", path, e))
    }

    #[cfg(not(unix))]
    fn set_permissions(&self, _path: &Path, _perm: Permissions) -> Result<(), VfsError> {
        Err(VfsError::NotSupported {
            operation: "set_permissions",
        })
    }
}

impl Backend for NativeFs {
    fn id(&self) -> BackendId {
        self.id
    }

    /// `/` on Unix; every present drive letter on Windows.
    fn roots(&self) -> Vec<PathBuf> {
        if cfg!(windows) {
            (b'A'..=b'Z')
                .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
                .filter(|root| root.exists())
                .collect()
        } else {
            vec![PathBuf::from("/")]
        }
    }
}

/// [`Provider`] for the native filesystem.
///
/// Claims bare paths and `file:` addresses and always answers with the same
/// pinned mount, so the registry can index it before the first resolution.
#[derive(Debug)]
pub struct LocalProvider {
    mount: Arc<Mount>,
}

impl LocalProvider {
    /// Provider whose capabilities match the host OS.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::host())
    }

    /// Provider advertising a specific preset, for hosts that know the native
    /// volume better than the OS default (e.g. a FAT-formatted drive).
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let mount = Mount::new(
            LOCAL_MOUNT_ID,
            Address::local_root(),
            MountHandle::pinned(Arc::new(NativeFs::new())),
            capabilities,
        );
        Self {
            mount: Arc::new(mount),
        }
    }

    /// The singleton local mount.
    pub fn local_mount(&self) -> &Arc<Mount> {
        &self.mount
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for LocalProvider {
    fn supports(&self, address: &Address) -> bool {
        address.scheme().is_none() || address.has_scheme("file")
    }

    fn mount(&self, _address: &Address, _options: &MountOptions) -> Result<Arc<Mount>, VfsError> {
        Ok(self.mount.clone())
    }

    fn priority(&self) -> i32 {
        LOCAL_PRIORITY
    }

    fn name(&self) -> &str {
        "local"
    }
}
