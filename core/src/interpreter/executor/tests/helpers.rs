//! Test helpers for executor and stdlib tests
//!
//! Common utilities for parsing programs and running them in a session

use std::sync::Arc;
use std::time::Duration;

use crate::bridge::SyncBridge;
use crate::host::Storage;
use crate::interpreter::ast::Stmt;
use crate::interpreter::errors::GuestError;
use crate::interpreter::executor::{HostContext, Interpreter, Namespace, Val};
use crate::interpreter::parser::{self, semantic_validator};
use crate::vfs::VfsFacade;

pub const TEST_CALL_DEPTH: usize = 64;

/// In-memory host that records everything guest code prints
#[derive(Default)]
pub struct BufferHost {
    pub stdout: String,
    pub stderr: String,
    pub vfs: Option<VfsFacade>,
}

impl HostContext for BufferHost {
    fn write_stdout(&mut self, text: &str) {
        self.stdout.push_str(text);
    }

    fn write_stderr(&mut self, text: &str) {
        self.stderr.push_str(text);
    }

    fn vfs(&self) -> Option<&VfsFacade> {
        self.vfs.as_ref()
    }
}

/// Parse, validate and round-trip a program through JSON
pub fn parse_program(source: &str) -> Vec<Stmt> {
    let stmts = parser::parse_program(source).expect("Parse program failed");
    semantic_validator::validate_program(&stmts).expect("Program validation failed");
    let json = serde_json::to_string(&stmts).expect("Program serialization failed");
    serde_json::from_str(&json).expect("Program deserialization failed")
}

/// A namespace plus host that persists across several snippets
pub struct Session {
    pub namespace: Namespace,
    pub host: BufferHost,
    // Keeps the host scheduler alive while the facade is in use
    _runtime: Option<tokio::runtime::Runtime>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            namespace: Namespace::seeded(),
            host: BufferHost::default(),
            _runtime: None,
        }
    }

    /// Session whose file builtins reach `storage` through a real bridge
    pub fn with_storage(storage: Arc<dyn Storage>, max_attempts: u32) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to build host runtime");
        let bridge = SyncBridge::new(
            runtime.handle().clone(),
            max_attempts,
            Duration::from_millis(1),
        );
        let vfs = VfsFacade::new(storage, bridge, "/");

        Self {
            namespace: Namespace::seeded(),
            host: BufferHost {
                vfs: Some(vfs),
                ..BufferHost::default()
            },
            _runtime: Some(runtime),
        }
    }

    pub fn exec(&mut self, source: &str) -> Result<(), GuestError> {
        let stmts = parse_program(source);
        Interpreter::new(&mut self.namespace, &mut self.host, TEST_CALL_DEPTH).exec(&stmts)
    }

    pub fn eval(&mut self, source: &str) -> Result<Val, GuestError> {
        let expr = parser::parse_expression(source).expect("Parse expression failed");
        Interpreter::new(&mut self.namespace, &mut self.host, TEST_CALL_DEPTH).eval(&expr)
    }

    pub fn get(&self, name: &str) -> Val {
        self.namespace
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("'{}' is not bound", name))
    }

    /// Take everything printed so far
    pub fn take_stdout(&mut self) -> String {
        std::mem::take(&mut self.host.stdout)
    }
}

/// Run a program in a fresh session and return what it printed
pub fn run_program(source: &str) -> String {
    let mut session = Session::new();
    session.exec(source).expect("Program raised an error");
    session.take_stdout()
}

/// Run a program in a fresh session and return the error it raised
pub fn run_program_err(source: &str) -> GuestError {
    let mut session = Session::new();
    session
        .exec(source)
        .expect_err("Program should have raised an error")
}
