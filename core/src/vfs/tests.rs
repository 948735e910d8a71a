//! Tests for the VFS facade: results, error mapping and path handling

use super::*;
use crate::host::{DirEntry, HostError, HostFuture, MemoryStorage};
use std::time::Duration;

/// Storage that rejects every call
struct DenyingStorage;

impl Storage for DenyingStorage {
    fn read_file(&self, _path: &str) -> HostFuture<String> {
        Box::pin(async { Err(HostError::new("permission denied")) })
    }

    fn write_file(&self, _path: &str, _content: &str) -> HostFuture<()> {
        Box::pin(async { Err(HostError::new("permission denied")) })
    }

    fn read_directory(&self, _path: &str) -> HostFuture<Vec<DirEntry>> {
        Box::pin(async { Err(HostError::new("permission denied")) })
    }
}

/// Storage whose futures never settle
struct StalledStorage;

impl Storage for StalledStorage {
    fn read_file(&self, _path: &str) -> HostFuture<String> {
        Box::pin(std::future::pending())
    }

    fn write_file(&self, _path: &str, _content: &str) -> HostFuture<()> {
        Box::pin(std::future::pending())
    }

    fn read_directory(&self, _path: &str) -> HostFuture<Vec<DirEntry>> {
        Box::pin(std::future::pending())
    }
}

const TIMEOUT_ATTEMPTS: u32 = 5;

/// Facade plus the runtime that drives its host futures
struct Fixture {
    vfs: VfsFacade,
    _runtime: tokio::runtime::Runtime,
}

fn fixture(storage: Arc<dyn Storage>, root: &str) -> Fixture {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("Failed to build host runtime");
    let bridge = SyncBridge::new(
        runtime.handle().clone(),
        TIMEOUT_ATTEMPTS,
        Duration::from_millis(1),
    );
    Fixture {
        vfs: VfsFacade::new(storage, bridge, root),
        _runtime: runtime,
    }
}

fn memory_fixture() -> (Arc<MemoryStorage>, Fixture) {
    let storage = Arc::new(MemoryStorage::new());
    let fixture = fixture(storage.clone(), "/");
    (storage, fixture)
}

/* ===================== Read ===================== */

#[test]
fn test_read_existing_file() {
    let (storage, fx) = memory_fixture();
    storage.seed_file("/notes.txt", "remember").unwrap();

    assert_eq!(fx.vfs.read_file("/notes.txt").unwrap(), "remember");
}

#[test]
fn test_read_relative_path_is_anchored_at_root() {
    let (storage, fx) = memory_fixture();
    storage.seed_file("/notes.txt", "remember").unwrap();

    assert_eq!(fx.vfs.read_file("notes.txt").unwrap(), "remember");
}

#[test]
fn test_read_missing_file_is_not_found() {
    let (_storage, fx) = memory_fixture();
    let err = fx.vfs.read_file("missing.txt").unwrap_err();

    match &err {
        VfsError::NotFound { path, reason } => {
            assert_eq!(path, "/missing.txt");
            assert!(reason.contains("No such file or directory"));
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(err.to_string().contains("missing.txt"));
}

#[test]
fn test_read_rejection_is_not_found() {
    let fx = fixture(Arc::new(DenyingStorage), "/");
    let err = fx.vfs.read_file("secret.txt").unwrap_err();

    assert_eq!(
        err,
        VfsError::NotFound {
            path: "/secret.txt".to_string(),
            reason: "permission denied".to_string(),
        }
    );
}

#[test]
fn test_read_directory_path_is_not_found() {
    let (storage, fx) = memory_fixture();
    storage.create_dir("/docs").unwrap();

    let err = fx.vfs.read_file("docs").unwrap_err();
    assert!(matches!(err, VfsError::NotFound { ref reason, .. } if reason.contains("Is a directory")));
}

/* ===================== Write ===================== */

#[test]
fn test_write_creates_file() {
    let (storage, fx) = memory_fixture();

    assert!(fx.vfs.write_file("out.txt", "data").unwrap());
    assert_eq!(storage.content("/out.txt"), Some("data".to_string()));
}

#[test]
fn test_write_overwrites_file() {
    let (storage, fx) = memory_fixture();
    storage.seed_file("/out.txt", "old").unwrap();

    assert!(fx.vfs.write_file("/out.txt", "new").unwrap());
    assert_eq!(fx.vfs.read_file("out.txt").unwrap(), "new");
}

#[test]
fn test_write_rejection_is_io_error() {
    let fx = fixture(Arc::new(DenyingStorage), "/");
    let err = fx.vfs.write_file("out.txt", "data").unwrap_err();

    assert_eq!(
        err,
        VfsError::Io {
            action: VfsAction::Write,
            path: "/out.txt".to_string(),
            reason: "permission denied".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "Error writing file '/out.txt': permission denied"
    );
}

#[test]
fn test_write_into_missing_directory_is_io_error() {
    let (_storage, fx) = memory_fixture();
    let err = fx.vfs.write_file("/nowhere/out.txt", "data").unwrap_err();

    assert!(matches!(
        err,
        VfsError::Io {
            action: VfsAction::Write,
            ..
        }
    ));
}

/* ===================== List ===================== */

#[test]
fn test_list_returns_base_names_in_host_order() {
    let (storage, fx) = memory_fixture();
    storage.seed_file("/b.txt", "").unwrap();
    storage.create_dir("/docs").unwrap();
    storage.seed_file("/docs/inner.txt", "").unwrap();
    storage.seed_file("/a.txt", "").unwrap();

    assert_eq!(fx.vfs.list_files().unwrap(), vec!["b.txt", "docs", "a.txt"]);
}

#[test]
fn test_list_uses_normalized_root() {
    let storage = Arc::new(MemoryStorage::new());
    storage.create_dir("/docs").unwrap();
    storage.seed_file("/docs/inner.txt", "").unwrap();
    storage.seed_file("/top.txt", "").unwrap();
    let fx = fixture(storage, "docs/");

    assert_eq!(fx.vfs.root(), "/docs");
    assert_eq!(fx.vfs.list_files().unwrap(), vec!["inner.txt"]);
}

#[test]
fn test_list_rejection_is_io_error() {
    let fx = fixture(Arc::new(DenyingStorage), "/");
    let err = fx.vfs.list_files().unwrap_err();

    assert_eq!(
        err,
        VfsError::Io {
            action: VfsAction::List,
            path: "/".to_string(),
            reason: "permission denied".to_string(),
        }
    );
}

#[test]
fn test_list_missing_root_is_io_error() {
    let fx = fixture(Arc::new(MemoryStorage::new()), "/absent");
    let err = fx.vfs.list_files().unwrap_err();

    match err {
        VfsError::Io { action, path, .. } => {
            assert_eq!(action, VfsAction::List);
            assert_eq!(path, "/absent");
        }
        other => panic!("Expected Io, got {:?}", other),
    }
}

/* ===================== Timeouts ===================== */

#[test]
fn test_read_times_out() {
    let fx = fixture(Arc::new(StalledStorage), "/");
    assert_eq!(
        fx.vfs.read_file("slow.txt").unwrap_err(),
        VfsError::Timeout {
            action: VfsAction::Read,
            path: "/slow.txt".to_string(),
            attempts: TIMEOUT_ATTEMPTS,
        }
    );
}

#[test]
fn test_write_times_out() {
    let fx = fixture(Arc::new(StalledStorage), "/");
    let err = fx.vfs.write_file("slow.txt", "data").unwrap_err();

    assert_eq!(
        err,
        VfsError::Timeout {
            action: VfsAction::Write,
            path: "/slow.txt".to_string(),
            attempts: TIMEOUT_ATTEMPTS,
        }
    );
    assert_eq!(
        err.to_string(),
        "Timeout writing file '/slow.txt' after 5 attempts"
    );
}

#[test]
fn test_list_times_out() {
    let fx = fixture(Arc::new(StalledStorage), "/");
    assert!(matches!(
        fx.vfs.list_files().unwrap_err(),
        VfsError::Timeout {
            action: VfsAction::List,
            attempts: TIMEOUT_ATTEMPTS,
            ..
        }
    ));
}
