//! Zip archives through the `zip` crate.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;
use zip::ZipArchive;

use super::ArchiveOpener;
use crate::{
    Address, Backend, BackendId, Close, DirEntry, FileType, FsDir, FsPermissions, FsRead,
    FsWrite, Metadata, MountOptions, Permissions, ReadDirIter, VfsError,
};

/// Opens zip-family archives (`.zip`, `.jar`, `.war`, `.ear`) stored on the
/// native filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    type Archive = ZipFs;

    fn open(&self, address: &Address, _options: &MountOptions) -> Result<ZipFs, VfsError> {
        let file = address
            .archive_file()
            .ok_or_else(|| VfsError::MountFailed {
                address: address.to_string(),
                reason: "archive is not on the local filesystem".into(),
            })?;
        ZipFs::open(&file).map_err(|e| VfsError::MountFailed {
            address: address.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    file_type: FileType,
    size: u64,
    /// Position in the central directory; `None` for implied directories.
    index: Option<usize>,
}

impl IndexEntry {
    const DIR: Self = Self {
        file_type: FileType::Directory,
        size: 0,
        index: None,
    };
}

/// Read-only view of one zip archive.
///
/// The central directory is indexed once at open time. Directories that are
/// only implied by entry names (`docs/guide.md` without a `docs/` record)
/// are synthesized.
pub struct ZipFs {
    id: BackendId,
    source: PathBuf,
    entries: BTreeMap<PathBuf, IndexEntry>,
    archive: Mutex<Option<ZipArchive<File>>>,
}

impl std::fmt::Debug for ZipFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipFs")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("entries", &self.entries.len())
            .field("open", &self.is_open())
            .finish()
    }
}

impl ZipFs {
    /// Open and index the archive at `path`.
    pub fn open(path: &Path) -> Result<Self, VfsError> {
        let file = File::open(path).map_err(|e| VfsError::from_io("open_archive", path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| VfsError::InvalidData {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("/"), IndexEntry::DIR);
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(|e| VfsError::InvalidData {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
            // Names escaping the archive root are skipped.
            let Some(name) = entry.enclosed_name() else {
                continue;
            };
            let key = normalize(&name);
            for ancestor in key.ancestors().skip(1) {
                entries
                    .entry(ancestor.to_path_buf())
                    .or_insert(IndexEntry::DIR);
            }
            let indexed = if entry.is_dir() {
                IndexEntry {
                    index: Some(i),
                    ..IndexEntry::DIR
                }
            } else {
                IndexEntry {
                    file_type: FileType::File,
                    size: entry.size(),
                    index: Some(i),
                }
            };
            entries.insert(key, indexed);
        }

        Ok(Self {
            id: BackendId::next(),
            source: path.to_path_buf(),
            entries,
            archive: Mutex::new(Some(archive)),
        })
    }

    /// Native path of the archive file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    fn closed(&self) -> VfsError {
        VfsError::Closed {
            mount: self.source.display().to_string(),
        }
    }

    fn ensure_open(&self) -> Result<(), VfsError> {
        if self.is_open() { Ok(()) } else { Err(self.closed()) }
    }

    fn lookup(&self, path: &Path) -> Result<IndexEntry, VfsError> {
        self.ensure_open()?;
        self.entries
            .get(&normalize(path))
            .copied()
            .ok_or_else(|| VfsError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn file_index(&self, path: &Path) -> Result<usize, VfsError> {
        match self.lookup(path)? {
            IndexEntry {
                file_type: FileType::File,
                index: Some(i),
                ..
            } => Ok(i),
            _ => Err(VfsError::NotAFile {
                path: path.to_path_buf(),
            }),
        }
    }

    fn read_entry(&self, path: &Path, index: usize) -> Result<Vec<u8>, VfsError> {
        let mut guard = self.archive.lock();
        let archive = guard.as_mut().ok_or_else(|| self.closed())?;
        let mut entry = archive.by_index(index).map_err(|e| VfsError::InvalidData {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        let mut data = Vec::with_capacity(initial_capacity(entry.size()));
        entry
            .read_to_end(&mut data)
            .map_err(|e| VfsError::from_io("read", path, e))?;
        Ok(data)
    }
}

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

/// Buffer to reserve for an entry declaring `declared` bytes. The header is
/// untrusted; larger entries grow while reading.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Absolute, lexically normalized key: `a/./b/../c/` becomes `/a/c`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

impl FsRead for ZipFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>, VfsError> {
        let index = self.file_index(path)?;
        self.read_entry(path, index)
    }

    fn read_range(&self, path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, VfsError> {
        // Compressed entries are not seekable; read and slice.
        let data = self.read(path)?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn exists(&self, path: &Path) -> Result<bool, VfsError> {
        self.ensure_open()?;
        Ok(self.entries.contains_key(&normalize(path)))
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, VfsError> {
        let entry = self.lookup(path)?;
        Ok(Metadata {
            file_type: entry.file_type,
            size: entry.size,
            permissions: Permissions::read_only(),
            modified: SystemTime::UNIX_EPOCH,
        })
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
        Ok(Box::new(Cursor::new(self.read(path)?)))
    }
}

impl FsDir for ZipFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, VfsError> {
        if self.lookup(path)?.file_type != FileType::Directory {
            return Err(VfsError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        let dir = normalize(path);
        let children: Vec<_> = self
            .entries
            .iter()
            .filter(|(key, _)| key.parent() == Some(dir.as_path()))
            .map(|(key, entry)| {
                Ok(DirEntry {
                    name: key
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: key.clone(),
                    file_type: entry.file_type,
                    size: entry.size,
                })
            })
            .collect();
        Ok(ReadDirIter::from_vec(children))
    }

    fn create_dir(&self, _path: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "create_dir",
        })
    }

    fn create_dir_all(&self, _path: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "create_dir_all",
        })
    }

    fn remove_dir(&self, _path: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "remove_dir",
        })
    }

    fn remove_dir_all(&self, _path: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "remove_dir_all",
        })
    }
}

impl FsWrite for ZipFs {
    fn write(&self, _path: &Path, _data: &[u8]) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly { operation: "write" })
    }

    fn append(&self, _path: &Path, _data: &[u8]) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly { operation: "append" })
    }

    fn remove_file(&self, _path: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "remove_file",
        })
    }

    fn rename(&self, _from: &Path, _to: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "rename",
        })
    }

    fn copy(&self, _from: &Path, _to: &Path) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly { operation: "copy" })
    }
}

impl FsPermissions for ZipFs {
    fn set_permissions(&self, _path: &Path, _perm: Permissions) -> Result<(), VfsError> {
        Err(VfsError::ReadOnly {
            operation: "set_permissions",
        })
    }
}

impl Backend for ZipFs {
    fn id(&self) -> BackendId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.archive.lock().is_some()
    }
}

impl Close for ZipFs {
    fn close(&self) -> Result<(), VfsError> {
        if self.archive.lock().take().is_some() {
            tracing::debug!(archive = %self.source.display(), "released zip handle");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsExt;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn sample() -> (tempfile::TempDir, ZipFs) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.zip");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        zip.add_directory("empty/", options).unwrap();
        zip.start_file("readme.txt", options).unwrap();
        zip.write_all(b"hello archive").unwrap();
        zip.start_file("src/lib/mod.rs", options).unwrap();
        zip.write_all(b"pub mod x;").unwrap();
        zip.finish().unwrap();
        let fs = ZipFs::open(&path).unwrap();
        (dir, fs)
    }

    fn names(fs: &ZipFs, path: &str) -> Vec<String> {
        fs.read_dir(Path::new(path))
            .unwrap()
            .collect_all()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn lists_root_with_implied_directories() {
        let (_dir, fs) = sample();
        assert_eq!(names(&fs, "/"), vec!["empty", "readme.txt", "src"]);
        assert_eq!(names(&fs, "/src"), vec!["lib"]);
        assert_eq!(names(&fs, "/src/lib/"), vec!["mod.rs"]);
        assert!(names(&fs, "/empty").is_empty());
    }

    #[test]
    fn reads_entries() {
        let (_dir, fs) = sample();
        assert_eq!(fs.read(Path::new("/readme.txt")).unwrap(), b"hello archive");
        assert_eq!(fs.read(Path::new("src/lib/mod.rs")).unwrap(), b"pub mod x;");
        assert_eq!(fs.read_range(Path::new("/readme.txt"), 6, 4).unwrap(), b"arch");
        assert!(fs.read_range(Path::new("/readme.txt"), 99, 4).unwrap().is_empty());
        assert_eq!(fs.read_to_string(Path::new("/readme.txt")).unwrap(), "hello archive");

        let mut reader = fs.open_read(Path::new("/readme.txt")).unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello archive");
    }

    #[test]
    fn metadata_and_kinds() {
        let (_dir, fs) = sample();
        let meta = fs.metadata(Path::new("/readme.txt")).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.size, 13);
        assert!(meta.permissions.readonly());
        assert!(fs.is_dir(Path::new("/src")).unwrap());
        assert!(fs.exists(Path::new("/src/./lib/../lib/mod.rs")).unwrap());
        assert!(!fs.exists(Path::new("/nope")).unwrap());
    }

    #[test]
    fn wrong_kinds_are_rejected() {
        let (_dir, fs) = sample();
        assert!(matches!(
            fs.read(Path::new("/src")),
            Err(VfsError::NotAFile { .. })
        ));
        assert!(matches!(
            fs.read_dir(Path::new("/readme.txt")),
            Err(VfsError::NotADirectory { .. })
        ));
        assert!(matches!(
            fs.read(Path::new("/missing.txt")),
            Err(VfsError::NotFound { .. })
        ));
    }

    #[test]
    fn every_mutation_is_read_only() {
        let (_dir, fs) = sample();
        let p = Path::new("/readme.txt");
        let results = [
            fs.write(p, b""),
            fs.append(p, b""),
            fs.remove_file(p),
            fs.rename(p, Path::new("/x")),
            fs.copy(p, Path::new("/x")),
            fs.create_dir(Path::new("/d")),
            fs.create_dir_all(Path::new("/d/e")),
            fs.remove_dir(Path::new("/empty")),
            fs.remove_dir_all(Path::new("/src")),
            fs.set_permissions(p, Permissions::default_file()),
        ];
        for result in results {
            assert!(matches!(result, Err(VfsError::ReadOnly { .. })));
        }
    }

    #[test]
    fn close_releases_handle() {
        let (_dir, fs) = sample();
        assert!(fs.is_open());
        fs.close().unwrap();
        fs.close().unwrap();
        assert!(!fs.is_open());
        assert!(matches!(
            fs.exists(Path::new("/readme.txt")),
            Err(VfsError::Closed { .. })
        ));
    }

    #[test]
    fn declared_size_does_not_drive_allocation() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(13), 13);
        assert_eq!(initial_capacity(1 << 63), MAX_PREALLOC as usize);
        assert_eq!(initial_capacity(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn entries_larger_than_the_reservation_read_fully() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.zip");
        let payload = vec![7u8; (MAX_PREALLOC as usize) * 2 + 3];
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("big.bin", SimpleFileOptions::default()).unwrap();
        zip.write_all(&payload).unwrap();
        zip.finish().unwrap();

        let fs = ZipFs::open(&path).unwrap();
        assert_eq!(fs.read(Path::new("/big.bin")).unwrap(), payload);
    }

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("a/./b/../c/")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("")), PathBuf::from("/"));
    }
}
