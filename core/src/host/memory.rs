//! In-memory host storage
//!
//! A reference [`Storage`] implementation: an insertion-ordered map of nodes
//! keyed by normalized path, with the directory rules of the browser VFS it
//! stands in for. Operations can be delayed to exercise the bridge's polling.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{normalize_path, parent_path, DirEntry, EntryKind, HostError, HostFuture, Storage};

#[derive(Debug, Clone)]
struct Node {
    kind: EntryKind,
    parent: String,
    content: String,
    modified: DateTime<Utc>,
}

impl Node {
    fn directory(parent: String) -> Self {
        Self {
            kind: EntryKind::Directory,
            parent,
            content: String::new(),
            modified: Utc::now(),
        }
    }
}

type NodeMap = IndexMap<String, Node>;

/// Shared, cloneable in-memory filesystem
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    nodes: Arc<Mutex<NodeMap>>,
    latency: Option<Duration>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create an empty filesystem containing only the root directory
    pub fn new() -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert("/".to_string(), Node::directory(String::new()));
        Self {
            nodes: Arc::new(Mutex::new(nodes)),
            latency: None,
        }
    }

    /// Delay every operation by `latency` before it settles
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Synchronously create or replace a file (for seeding)
    pub fn seed_file(&self, path: &str, content: &str) -> Result<(), HostError> {
        put_file(&mut lock(&self.nodes), &normalize_path(path), content)
    }

    /// Synchronously create a directory; its parent must exist
    pub fn create_dir(&self, path: &str) -> Result<(), HostError> {
        let path = normalize_path(path);
        let mut nodes = lock(&self.nodes);

        if nodes.contains_key(&path) {
            return Err(HostError::new(format!(
                "cannot create directory '{}': File exists",
                path
            )));
        }

        let parent = parent_path(&path);
        require_directory(&nodes, &parent, &path)?;
        nodes.insert(path, Node::directory(parent));
        Ok(())
    }

    /// Snapshot of a file's content, bypassing the async interface
    pub fn content(&self, path: &str) -> Option<String> {
        let nodes = lock(&self.nodes);
        nodes
            .get(&normalize_path(path))
            .filter(|node| node.kind == EntryKind::File)
            .map(|node| node.content.clone())
    }

    fn delayed<T, F>(&self, op: F) -> HostFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut NodeMap) -> Result<T, HostError> + Send + 'static,
    {
        let nodes = Arc::clone(&self.nodes);
        let latency = self.latency;

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            let mut guard = lock(&nodes);
            op(&mut guard)
        })
    }
}

impl Storage for MemoryStorage {
    fn read_file(&self, path: &str) -> HostFuture<String> {
        let path = normalize_path(path);
        self.delayed(move |nodes| match nodes.get(&path) {
            None => Err(HostError::new(format!(
                "{}: No such file or directory",
                path
            ))),
            Some(node) if node.kind == EntryKind::Directory => {
                Err(HostError::new(format!("{}: Is a directory", path)))
            }
            Some(node) => Ok(node.content.clone()),
        })
    }

    fn write_file(&self, path: &str, content: &str) -> HostFuture<()> {
        let path = normalize_path(path);
        let content = content.to_string();
        self.delayed(move |nodes| put_file(nodes, &path, &content))
    }

    fn read_directory(&self, path: &str) -> HostFuture<Vec<DirEntry>> {
        let path = normalize_path(path);
        self.delayed(move |nodes| {
            match nodes.get(&path) {
                None => {
                    return Err(HostError::new(format!(
                        "cannot access '{}': No such file or directory",
                        path
                    )))
                }
                Some(node) if node.kind == EntryKind::File => {
                    return Err(HostError::new(format!(
                        "cannot access '{}': Not a directory",
                        path
                    )))
                }
                Some(_) => {}
            }

            let entries = nodes
                .iter()
                .filter(|(key, node)| node.parent == path && key.as_str() != "/")
                .map(|(key, node)| DirEntry {
                    path: key.clone(),
                    kind: node.kind,
                    modified: node.modified,
                })
                .collect();
            Ok(entries)
        })
    }
}

/* ===================== Helpers ===================== */

fn lock(nodes: &Mutex<NodeMap>) -> MutexGuard<'_, NodeMap> {
    nodes.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_directory(nodes: &NodeMap, dir: &str, target: &str) -> Result<(), HostError> {
    match nodes.get(dir) {
        Some(node) if node.kind == EntryKind::Directory => Ok(()),
        _ => Err(HostError::new(format!(
            "cannot create {}: No such file or directory",
            target
        ))),
    }
}

fn put_file(nodes: &mut NodeMap, path: &str, content: &str) -> Result<(), HostError> {
    if path == "/" {
        return Err(HostError::new("cannot write to '/': Is a directory"));
    }

    if let Some(existing) = nodes.get(path) {
        if existing.kind == EntryKind::Directory {
            return Err(HostError::new(format!("cannot write {}: Is a directory", path)));
        }
    }

    let parent = parent_path(path);
    require_directory(nodes, &parent, path)?;

    // IndexMap::insert keeps the original position when overwriting
    nodes.insert(
        path.to_string(),
        Node {
            kind: EntryKind::File,
            parent,
            content: content.to_string(),
            modified: Utc::now(),
        },
    );
    Ok(())
}
