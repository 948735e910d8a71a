//! Host storage interface
//!
//! The host environment owns the virtual filesystem and exposes it only as
//! asynchronous operations. Everything in this crate reaches storage through
//! the [`Storage`] trait; the bridge turns its futures into blocking calls.

pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub use memory::MemoryStorage;

/* ===================== Futures & Errors ===================== */

/// Boxed future returned by every host storage operation
///
/// Futures must be `'static` because the bridge spawns them onto the host
/// runtime and may stop waiting before they settle.
pub type HostFuture<T> = Pin<Box<dyn Future<Output = Result<T, HostError>> + Send + 'static>>;

/// Failure reported by the host storage layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/* ===================== Directory Entries ===================== */

/// Kind of a stored node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry returned by `read_directory`
///
/// Only `path` is required by the facade; the rest is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Full path of the entry, e.g. `/notes/todo.txt`
    pub path: String,
    pub kind: EntryKind,
    pub modified: DateTime<Utc>,
}

impl DirEntry {
    /// Final path segment, ignoring trailing slashes
    pub fn base_name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/* ===================== Storage Trait ===================== */

/// Asynchronous storage operations consumed from the host
pub trait Storage: Send + Sync {
    /// Resolve to the file's content, or reject if it is missing
    fn read_file(&self, path: &str) -> HostFuture<String>;

    /// Create or replace a file
    fn write_file(&self, path: &str, content: &str) -> HostFuture<()>;

    /// List the direct children of a directory in host order
    fn read_directory(&self, path: &str) -> HostFuture<Vec<DirEntry>>;
}

/* ===================== Path Helpers ===================== */

/// Normalize a storage path
///
/// Relative paths are anchored at the root and a trailing slash is dropped
/// (except for the root itself).
pub fn normalize_path(path: &str) -> String {
    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }

    normalized
}

/// Parent directory of a normalized path (`/` for top-level entries)
pub fn parent_path(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() <= 1 {
        return "/".to_string();
    }

    format!("/{}", parts[..parts.len() - 1].join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative_path() {
        assert_eq!(normalize_path("notes.txt"), "/notes.txt");
        assert_eq!(normalize_path("/docs/"), "/docs");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("docs//"), "/docs");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/a.txt"), "/");
        assert_eq!(parent_path("/docs/a.txt"), "/docs");
        assert_eq!(parent_path("/docs/deep/a.txt"), "/docs/deep");
        assert_eq!(parent_path("/"), "/");
    }

    #[test]
    fn test_base_name_strips_prefix_and_trailing_slash() {
        let entry = DirEntry {
            path: "/docs/readme.md".to_string(),
            kind: EntryKind::File,
            modified: Utc::now(),
        };
        assert_eq!(entry.base_name(), "readme.md");

        let dir = DirEntry {
            path: "/docs/".to_string(),
            kind: EntryKind::Directory,
            modified: Utc::now(),
        };
        assert_eq!(dir.base_name(), "docs");
    }
}
