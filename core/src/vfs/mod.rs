//! # VFS Facade
//!
//! The three storage operations guest code may use. Each one is a single
//! blocking bridge call against the host [`Storage`]; there are no partial
//! reads, streams, or ranges.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tracing::debug;

use crate::bridge::{BridgeError, SyncBridge};
use crate::host::{normalize_path, Storage};

/* ===================== Errors ===================== */

/// Failures surfaced by the facade
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VfsError {
    /// The host rejected a read
    #[error("No such file or directory: '{path}' ({reason})")]
    NotFound { path: String, reason: String },

    /// The host rejected a write or a directory listing
    #[error("Error {action} '{path}': {reason}")]
    Io {
        action: VfsAction,
        path: String,
        reason: String,
    },

    /// The host did not settle before the bridge's budget ran out
    #[error("Timeout {action} '{path}' after {attempts} attempts")]
    Timeout {
        action: VfsAction,
        path: String,
        attempts: u32,
    },
}

/// Which facade operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfsAction {
    Read,
    Write,
    List,
}

impl std::fmt::Display for VfsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VfsAction::Read => write!(f, "reading file"),
            VfsAction::Write => write!(f, "writing file"),
            VfsAction::List => write!(f, "listing files in"),
        }
    }
}

impl VfsError {
    fn from_bridge(err: BridgeError, action: VfsAction, path: &str) -> Self {
        let path = path.to_string();
        match (err, action) {
            (BridgeError::Timeout { attempts, .. }, _) => VfsError::Timeout {
                action,
                path,
                attempts,
            },
            (BridgeError::Rejected { message, .. }, VfsAction::Read) => VfsError::NotFound {
                path,
                reason: message,
            },
            (BridgeError::Rejected { message, .. }, _) => VfsError::Io {
                action,
                path,
                reason: message,
            },
        }
    }
}

/* ===================== Facade ===================== */

/// Blocking file operations over the host storage
#[derive(Clone)]
pub struct VfsFacade {
    storage: Arc<dyn Storage>,
    bridge: SyncBridge,
    root: String,
}

impl std::fmt::Debug for VfsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VfsFacade")
            .field("bridge", &self.bridge)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl VfsFacade {
    pub fn new(storage: Arc<dyn Storage>, bridge: SyncBridge, root: &str) -> Self {
        Self {
            storage,
            bridge,
            root: normalize_path(root),
        }
    }

    /// Directory listed by [`VfsFacade::list_files`]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Read a whole file
    pub fn read_file(&self, path: &str) -> Result<String, VfsError> {
        let path = normalize_path(path);
        debug!(%path, "read_file");

        self.bridge
            .call_blocking("read_file", || self.storage.read_file(&path))
            .map_err(|err| VfsError::from_bridge(err, VfsAction::Read, &path))
    }

    /// Create or replace a whole file; `Ok(true)` once the host confirms
    pub fn write_file(&self, path: &str, content: &str) -> Result<bool, VfsError> {
        let path = normalize_path(path);
        debug!(%path, bytes = content.len(), "write_file");

        self.bridge
            .call_blocking("write_file", || self.storage.write_file(&path, content))
            .map(|()| true)
            .map_err(|err| VfsError::from_bridge(err, VfsAction::Write, &path))
    }

    /// Base names of the root directory's entries, in host order
    pub fn list_files(&self) -> Result<Vec<String>, VfsError> {
        debug!(root = %self.root, "list_files");

        let entries = self
            .bridge
            .call_blocking("read_directory", || self.storage.read_directory(&self.root))
            .map_err(|err| VfsError::from_bridge(err, VfsAction::List, &self.root))?;

        Ok(entries
            .iter()
            .map(|entry| entry.base_name().to_string())
            .collect())
    }
}
