//! # Execution Engine
//!
//! Runs snippets of Cadence script against a persistent namespace and hands
//! back the captured output or a rendered traceback.
//!
//! Each call first tries the input as a single expression (echoing a non-null
//! result), then as a statement list. Storage is reached through the VFS
//! facade, whose bridge drives host futures on a tokio runtime: either one
//! supplied by the embedder or a small one owned by the engine.

pub mod capture;
pub mod trace;


use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info};

use crate::bridge::SyncBridge;
use crate::config::Config;
use crate::host::{MemoryStorage, Storage};
use crate::interpreter::executor::{HostContext, Interpreter, Namespace, Val};
use crate::interpreter::parser::{self, semantic_validator};
use crate::vfs::VfsFacade;

pub use capture::OutputCapture;
pub use trace::{ExecutionResult, Trace};

/// Stack reserved for the thread that evaluates guest code
const EVAL_STACK_SIZE: usize = 128 * 1024 * 1024;

/* ===================== Engine ===================== */

pub struct Engine {
    namespace: Namespace,
    vfs: VfsFacade,
    config: Config,
    runtime: Option<Runtime>,
}

impl Drop for Engine {
    fn drop(&mut self) {
        // An owned runtime may be dropped from async code; don't block there
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Engine over in-memory storage with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Run a snippet and return its output or rendered traceback
    pub fn execute(&mut self, source: &str) -> String {
        self.run(source).render()
    }

    /// Run a snippet and return the structured result
    pub fn run(&mut self, source: &str) -> ExecutionResult {
        let mut capture = OutputCapture::acquire();
        let max_call_depth = self.config.engine.max_call_depth;
        debug!(bytes = source.len(), "executing snippet");

        let namespace = &mut self.namespace;
        let vfs = &self.vfs;
        let output = capture.buffer_mut();
        let outcome = run_isolated(move || {
            let mut host = CapturedHost { output, vfs };
            evaluate(source, namespace, &mut host, max_call_depth)
        });

        match outcome {
            Ok(()) => ExecutionResult::Output(capture.finish().trim().to_string()),
            Err(trace) => {
                debug!(kind = %trace.kind, "snippet failed");
                ExecutionResult::Failure(trace)
            }
        }
    }

    /// Read access to the persistent namespace
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Drop all user bindings, keeping the same namespace object
    pub fn reset(&mut self) {
        self.namespace.reset();
        debug!("namespace reset");
    }

    pub fn vfs(&self) -> &VfsFacade {
        &self.vfs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/* ===================== Builder ===================== */

/// Builder for constructing an [`Engine`]
#[derive(Default)]
pub struct EngineBuilder {
    storage: Option<Arc<dyn Storage>>,
    config: Option<Config>,
    runtime_handle: Option<Handle>,
}

impl EngineBuilder {
    /// Host storage backing the file operations (defaults to an empty [`MemoryStorage`])
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Settings (defaults to [`Config::default`])
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Runtime that runs host futures; it must not be driven by the thread calling `execute`
    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.runtime_handle = Some(handle);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let config = self.config.unwrap_or_default();
        config.validate().context("Invalid engine configuration")?;

        let (handle, runtime) = match self.runtime_handle {
            Some(handle) => (handle, None),
            None => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(config.engine.runtime_threads)
                    .thread_name("cadence-host")
                    .enable_all()
                    .build()
                    .context("Failed to build host runtime")?;
                (runtime.handle().clone(), Some(runtime))
            }
        };

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let bridge = SyncBridge::from_settings(handle, &config.bridge);
        let vfs = VfsFacade::new(storage, bridge, &config.vfs.root);

        info!(
            root = %vfs.root(),
            owned_runtime = runtime.is_some(),
            max_attempts = config.bridge.max_attempts,
            "engine ready"
        );

        Ok(Engine {
            namespace: Namespace::seeded(),
            vfs,
            config,
            runtime,
        })
    }
}

/* ===================== Evaluation ===================== */

/// Host context for one execution: writes land in the capture buffer
struct CapturedHost<'a> {
    output: &'a mut String,
    vfs: &'a VfsFacade,
}

impl HostContext for CapturedHost<'_> {
    fn write_stdout(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_stderr(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn vfs(&self) -> Option<&VfsFacade> {
        Some(self.vfs)
    }
}

/// Expression first, then statements
fn evaluate(
    source: &str,
    namespace: &mut Namespace,
    host: &mut dyn HostContext,
    max_call_depth: usize,
) -> Result<(), Trace> {
    if let Ok(expr) = parser::parse_expression(source) {
        let value = Interpreter::new(namespace, host, max_call_depth).eval(&expr)?;
        if value != Val::Null {
            host.write_stdout(&format!("{}\n", value));
        }
        return Ok(());
    }

    let stmts = parser::parse_program(source)?;
    semantic_validator::validate_program(&stmts)?;
    Interpreter::new(namespace, host, max_call_depth).exec(&stmts)?;
    Ok(())
}

/// Run guest evaluation on a dedicated thread with a large stack; a panic becomes a trace
fn run_isolated<F>(work: F) -> Result<(), Trace>
where
    F: FnOnce() -> Result<(), Trace> + Send,
{
    std::thread::scope(|scope| {
        let spawned = std::thread::Builder::new()
            .name("cadence-eval".to_string())
            .stack_size(EVAL_STACK_SIZE)
            .spawn_scoped(scope, work);

        match spawned {
            Ok(handle) => handle
                .join()
                .unwrap_or_else(|payload| Err(Trace::internal(panic_message(payload.as_ref())))),
            Err(err) => Err(Trace::internal(format!(
                "failed to start evaluation thread: {}",
                err
            ))),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("evaluation panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("evaluation panicked: {}", message)
    } else {
        "evaluation panicked".to_string()
    }
}
