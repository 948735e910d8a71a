//! Cadence: embedded snippet execution over an asynchronous virtual filesystem
//!
//! An [`Engine`] runs snippets of Cadence script against a persistent
//! namespace. Guest code reaches host storage through three blocking
//! builtins (`read_file`, `write_file`, `list_files`) that the
//! [`vfs::VfsFacade`] serves over the [`bridge::SyncBridge`].
//!
//! ```no_run
//! use cadence_core::Engine;
//!
//! let mut engine = Engine::new()?;
//! assert_eq!(engine.execute("x = 5"), "");
//! assert_eq!(engine.execute("x * 2"), "10");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bridge;
pub mod config;
pub mod engine;
pub mod host;
pub mod interpreter;
pub mod logging;
pub mod vfs;

pub use bridge::{BridgeError, SyncBridge};
pub use config::Config;
pub use engine::{Engine, EngineBuilder, ExecutionResult, Trace};
pub use host::{DirEntry, EntryKind, HostError, HostFuture, MemoryStorage, Storage};
pub use interpreter::{ErrorInfo, GuestError, TraceFrame, Val};
pub use vfs::{VfsError, VfsFacade};
