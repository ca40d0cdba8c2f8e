//! End-to-end tests through the public API.
//!
//! These tests verify that:
//! 1. Local and archive addresses resolve to the right mounts
//! 2. Capability lookups go through the reverse index
//! 3. One archive is opened once, even under concurrent resolution
//! 4. Plugin providers override built-ins by priority
//! 5. Errors carry the offending address

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use vfs_mounts::*;

// =============================================================================
// Fixtures
// =============================================================================

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

struct Fixture {
    _dir: tempfile::TempDir,
    zip: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let zip = dir.path().join("bundle.jar");
    write_zip(
        &zip,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("docs/readme.txt", b"inside the archive"),
        ],
    );
    Fixture { _dir: dir, zip }
}

fn entry(zip: &Path, path: &str) -> Address {
    let root = Address::archive(zip).unwrap();
    Address::parse(&format!("{}{}", root, path.trim_start_matches('/'))).unwrap()
}

/// Zip opener that counts opens and holds each one long enough for racing
/// callers to pile up.
#[derive(Default)]
struct CountingOpener {
    opens: Arc<AtomicUsize>,
}

impl ArchiveOpener for CountingOpener {
    type Archive = ZipFs;

    fn open(&self, address: &Address, options: &MountOptions) -> Result<ZipFs, VfsError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        ZipOpener.open(address, options)
    }
}

fn counting_registry() -> (Registry, Arc<AtomicUsize>) {
    let opens = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new(LocalProvider::new());
    registry.register_provider(Arc::new(ArchiveProvider::with_opener(CountingOpener {
        opens: opens.clone(),
    })));
    (registry, opens)
}

// =============================================================================
// Local resolution
// =============================================================================

#[test]
fn local_addresses_resolve_to_the_seeded_mount() {
    let registry = Registry::with_defaults();
    let bare = registry.resolve(&Address::parse("/").unwrap()).unwrap();
    let file = registry
        .resolve(&Address::parse("file:///tmp").unwrap())
        .unwrap();

    assert!(Arc::ptr_eq(&bare, &file));
    assert!(Arc::ptr_eq(&bare, registry.local_mount()));
    assert_eq!(bare.id(), LOCAL_MOUNT_ID);
    assert_eq!(bare.capabilities(), Capabilities::host());
}

#[test]
fn local_path_is_used_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::with_defaults();

    let address = Address::from_native_path(dir.path()).unwrap();
    let location = registry.path_for(&address).unwrap();
    assert_eq!(location.path(), std::path::absolute(dir.path()).unwrap());
    assert!(location.backend().is_dir(location.path()).unwrap());

    let again = registry
        .path_for(&Address::parse(&location.to_string()).unwrap())
        .unwrap();
    assert_eq!(again, location);

    let bare = registry.path_for(&Address::parse("/").unwrap()).unwrap();
    assert_eq!(bare.path(), Path::new("/"));
    assert_eq!(registry.capabilities_for(&bare), Capabilities::host());
}

#[test]
fn local_roots_are_listed() {
    let registry = Registry::with_defaults();
    let roots = registry.list_local_roots();
    assert!(!roots.is_empty());
    assert!(roots.iter().all(|root| {
        registry
            .for_path(root)
            .is_some_and(|m| Arc::ptr_eq(&m, registry.local_mount()))
    }));
}

#[test]
fn local_mount_survives_close() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::with_defaults();
    let mount = registry.local_mount().clone();
    mount.close().unwrap();

    let location = registry
        .path_for(&Address::from_native_path(dir.path()).unwrap())
        .unwrap();
    location
        .backend()
        .write(&location.path().join("still.txt"), b"writable")
        .unwrap();
    assert!(mount.is_open());
}

// =============================================================================
// Archive resolution
// =============================================================================

#[test]
fn entries_of_one_archive_share_a_mount() {
    let fx = fixture();
    let registry = Registry::with_defaults();

    let a = registry.resolve(&entry(&fx.zip, "/docs/readme.txt")).unwrap();
    let b = registry.resolve(&entry(&fx.zip, "/META-INF/")).unwrap();
    let root = registry.resolve(&Address::archive(&fx.zip).unwrap()).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &root));
    assert_eq!(a.capabilities(), Capabilities::read_only());
}

#[test]
fn path_for_reads_archive_entries() {
    let fx = fixture();
    let registry = Registry::with_defaults();

    let location = registry
        .path_for(&entry(&fx.zip, "/docs/readme.txt"))
        .unwrap();
    assert_eq!(location.path(), Path::new("/docs/readme.txt"));
    assert_eq!(
        location.backend().read_to_string(location.path()).unwrap(),
        "inside the archive"
    );

    let caps = registry.capabilities_for(&location);
    assert!(caps.supports(Operation::Read));
    assert!(caps.supports(Operation::List));
    assert!(!caps.supports(Operation::Write));
    assert!(!caps.supports(Operation::Delete));

    let root = registry.path_for(&Address::archive(&fx.zip).unwrap()).unwrap();
    assert_eq!(root.path(), Path::new("/"));
    let names: Vec<_> = root
        .backend()
        .read_dir_sorted(root.path())
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["META-INF", "docs"]);
}

#[test]
fn encoded_entry_names_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let zip = dir.path().join("spaced.zip");
    write_zip(&zip, &[("my file.txt", b"with a space")]);
    let registry = Registry::with_defaults();

    let location = registry.path_for(&entry(&zip, "/my%20file.txt")).unwrap();
    assert_eq!(location.path(), Path::new("/my file.txt"));
    assert!(location.backend().exists(location.path()).unwrap());
    assert_eq!(
        location.backend().read(location.path()).unwrap(),
        b"with a space"
    );
}

#[test]
fn scheme_case_does_not_split_the_cache() {
    let fx = fixture();
    let (registry, opens) = counting_registry();
    let lower = entry(&fx.zip, "/docs/readme.txt");
    let upper = Address::parse(&lower.as_str().replacen("jar:", "JAR:", 1)).unwrap();

    let a = registry.resolve(&lower).unwrap();
    let b = registry.resolve(&upper).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(opens.load(Ordering::SeqCst), 1);
}

#[test]
fn archive_writes_are_refused() {
    let fx = fixture();
    let registry = Registry::with_defaults();
    let root = registry.open_archive(&fx.zip).unwrap();

    let err = root
        .backend()
        .write(&root.path().join("new.txt"), b"nope")
        .unwrap_err();
    assert!(matches!(err, VfsError::ReadOnly { .. }));
}

#[test]
fn open_archive_is_indexed_and_leads_back_out() {
    let fx = fixture();
    let registry = Registry::with_defaults();

    let root = registry.open_archive(&fx.zip).unwrap();
    assert!(registry.for_path(&root).is_some());
    assert_eq!(registry.capabilities_for(&root), Capabilities::read_only());

    let origin = registry.archive_origin(&root.join("docs")).unwrap();
    assert_eq!(origin.path(), std::path::absolute(&fx.zip).unwrap());
    assert_eq!(origin.backend_id(), registry.local_mount().backend_id());
    assert!(origin.backend().is_file(origin.path()).unwrap());
}

#[test]
fn concurrent_resolution_opens_once() {
    let fx = fixture();
    let (registry, opens) = counting_registry();
    let barrier = Barrier::new(2);
    let first = entry(&fx.zip, "/docs/readme.txt");
    let second = entry(&fx.zip, "/META-INF/MANIFEST.MF");

    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| {
            barrier.wait();
            registry.resolve(&first).unwrap()
        });
        let b = s.spawn(|| {
            barrier.wait();
            registry.resolve(&second).unwrap()
        });
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_eq!(opens.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn closed_archive_is_reopened() {
    let fx = fixture();
    let (registry, opens) = counting_registry();
    let address = Address::archive(&fx.zip).unwrap();

    let first = registry.path_for(&address).unwrap();
    registry.for_path(&first).unwrap().close().unwrap();
    assert!(matches!(
        first.backend().read(Path::new("/docs/readme.txt")),
        Err(VfsError::Closed { .. })
    ));
    // Stale locations keep their mount, and with it read-only capabilities.
    assert_eq!(registry.capabilities_for(&first), Capabilities::read_only());

    let second = registry.path_for(&address).unwrap();
    assert_ne!(first.backend_id(), second.backend_id());
    assert!(second.backend().exists(Path::new("/docs")).unwrap());
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Reverse index
// =============================================================================

#[test]
fn unknown_backend_falls_back_to_permissive_preset() {
    let registry = Registry::with_defaults();
    let stray = Location::new(Arc::new(NativeFs::new()), "/");

    assert!(registry.for_path(&stray).is_none());
    let caps = registry.capabilities_for(&stray);
    assert_eq!(caps, Capabilities::local_non_posix());
    assert!(caps.supports(Operation::Write));
    assert!(!caps.supports(Operation::SetPermissions));
}

#[test]
fn failed_mount_is_reported_then_retried() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.zip");
    std::fs::write(&broken, b"PK but not really").unwrap();
    let registry = Registry::with_defaults();
    let address = Address::archive(&broken).unwrap();

    let err = registry.resolve(&address).unwrap_err();
    assert!(matches!(err, VfsError::MountFailed { .. }));
    assert_eq!(err.address(), Some(address.as_str()));
    assert!(err.to_string().contains("broken.zip"));

    write_zip(&broken, &[("fixed.txt", b"repaired")]);
    let location = registry.path_for(&entry(&broken, "/fixed.txt")).unwrap();
    let mount = registry.for_path(&location).unwrap();
    assert!(mount.is_open());
    assert_eq!(mount.backend_id(), location.backend_id());
    assert_eq!(registry.capabilities_for(&location), Capabilities::read_only());
    assert_eq!(location.backend().read(location.path()).unwrap(), b"repaired");
}

// =============================================================================
// Provider registration
// =============================================================================

/// Plugin provider answering with a fixed, pinned mount.
struct PluginProvider {
    schemes: &'static [&'static str],
    priority: i32,
    mount: Arc<Mount>,
}

impl PluginProvider {
    fn new(id: &str, schemes: &'static [&'static str], priority: i32) -> Self {
        let mount = Mount::new(
            id,
            Address::parse(&format!("{}:/", schemes[0])).unwrap(),
            MountHandle::pinned(Arc::new(NativeFs::new())),
            Capabilities::read_only(),
        );
        Self {
            schemes,
            priority,
            mount: Arc::new(mount),
        }
    }
}

impl Provider for PluginProvider {
    fn supports(&self, address: &Address) -> bool {
        self.schemes.iter().any(|s| address.has_scheme(s))
    }

    fn mount(&self, _address: &Address, _options: &MountOptions) -> Result<Arc<Mount>, VfsError> {
        Ok(self.mount.clone())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[test]
fn lower_priority_plugin_overrides_archive_provider() {
    let fx = fixture();
    let registry = Registry::with_defaults();
    let address = entry(&fx.zip, "/docs/readme.txt");
    assert_ne!(registry.resolve(&address).unwrap().id(), "enhanced");

    registry.register_provider(Arc::new(PluginProvider::new("enhanced", &["jar"], 5)));
    assert_eq!(registry.resolve(&address).unwrap().id(), "enhanced");
    assert_eq!(
        registry.path_for(&address).unwrap().path(),
        Path::new("/docs/readme.txt")
    );
}

#[test]
fn equal_priority_keeps_registration_order() {
    let registry = Registry::with_defaults();
    registry.register_provider(Arc::new(PluginProvider::new("first", &["s3"], 50)));
    registry.register_provider(Arc::new(PluginProvider::new("second", &["s3"], 50)));

    let mount = registry
        .resolve(&Address::parse("s3://bucket/key").unwrap())
        .unwrap();
    assert_eq!(mount.id(), "first");
}

#[test]
fn unclaimed_scheme_reports_the_address() {
    let registry = Registry::with_defaults();
    let address = Address::parse("sftp://host/home").unwrap();

    let err = registry.path_for(&address).unwrap_err();
    assert!(matches!(err, VfsError::NoProvider { .. }));
    assert_eq!(err.address(), Some("sftp://host/home"));

    registry.register_provider(Arc::new(PluginProvider::new("sftp", &["sftp"], 100)));
    let location = registry.path_for(&address).unwrap();
    assert_eq!(location.path(), Path::new("/home"));
    assert_eq!(registry.capabilities_for(&location), Capabilities::read_only());
}

#[test]
fn mount_options_reach_the_provider() {
    struct EchoProvider;

    impl Provider for EchoProvider {
        fn supports(&self, address: &Address) -> bool {
            address.has_scheme("echo")
        }

        fn mount(&self, address: &Address, options: &MountOptions) -> Result<Arc<Mount>, VfsError> {
            let id = options.get("id").ok_or_else(|| VfsError::MountFailed {
                address: address.to_string(),
                reason: "missing id".into(),
            })?;
            Ok(Arc::new(Mount::new(
                id,
                address.clone(),
                MountHandle::pinned(Arc::new(NativeFs::new())),
                Capabilities::read_only(),
            )))
        }
    }

    let registry = Registry::with_defaults();
    registry.register_provider(Arc::new(EchoProvider));
    let address = Address::parse("echo:hello").unwrap();

    assert!(registry.resolve(&address).is_err());
    let mount = registry
        .resolve_with(&address, &MountOptions::new().with("id", "greeting").with("extra", "x"))
        .unwrap();
    assert_eq!(mount.id(), "greeting");
    assert!(registry.for_path(&mount.root()).is_some());
}
