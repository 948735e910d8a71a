//! # Sync Bridge
//!
//! Adapts an asynchronous host operation into a blocking call with exactly
//! three outcomes: a value, a host rejection, or a timeout.
//!
//! The interpreter has no suspension point inside an expression, so a storage
//! call cannot `.await`. Instead the bridge spawns the host future onto the
//! host runtime, which settles a [`PendingOperation`] through one of two
//! callbacks, and the calling thread waits on that operation for a bounded
//! number of attempts.
//!
//! The calling thread must not be a worker of the same runtime: it blocks
//! while the runtime drives the future.

pub mod pending;


use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::BridgeSettings;
use crate::host::HostFuture;

pub use pending::{Completer, PendingOperation, Settlement};

/* ===================== Errors ===================== */

/// Failure outcomes of a bridged call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The host settled the operation with an error
    #[error("{operation} failed: {message}")]
    Rejected { operation: String, message: String },

    /// The polling budget ran out before the host settled the operation
    #[error("{operation} timed out after {attempts} attempts")]
    Timeout { operation: String, attempts: u32 },
}

/* ===================== Bridge ===================== */

/// Blocking adapter over a host runtime
#[derive(Debug, Clone)]
pub struct SyncBridge {
    handle: Handle,
    max_attempts: u32,
    poll_interval: Duration,
}

impl SyncBridge {
    pub fn new(handle: Handle, max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            handle,
            max_attempts,
            poll_interval,
        }
    }

    pub fn from_settings(handle: Handle, settings: &BridgeSettings) -> Self {
        Self::new(
            handle,
            settings.max_attempts,
            Duration::from_millis(settings.poll_interval_ms),
        )
    }

    /// Longest time a call can wait before timing out
    pub fn budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }

    /// Issue one host operation and block until it settles or times out
    ///
    /// `factory` is called exactly once, inside the host runtime's context.
    pub fn call_blocking<T, F>(&self, operation: &str, factory: F) -> Result<T, BridgeError>
    where
        T: Send + 'static,
        F: FnOnce() -> HostFuture<T>,
    {
        if Handle::try_current().is_ok() {
            warn!(operation, "blocking bridge call issued from inside an async runtime");
        }

        let pending = PendingOperation::new();
        let (on_success, on_error) = pending.callbacks();

        let future = {
            let _entered = self.handle.enter();
            factory()
        };

        debug!(operation, "host operation issued");
        self.handle.spawn(async move {
            match future.await {
                Ok(value) => {
                    on_success.resolve(value);
                }
                Err(err) => {
                    on_error.reject(err.message);
                }
            }
        });

        match pending.wait(self.max_attempts, self.poll_interval) {
            Settlement::Resolved(value) => {
                debug!(operation, attempts = pending.attempts(), "host operation resolved");
                Ok(value)
            }
            Settlement::Rejected(message) => {
                debug!(operation, %message, "host operation rejected");
                Err(BridgeError::Rejected {
                    operation: operation.to_string(),
                    message,
                })
            }
            Settlement::Pending => {
                let attempts = pending.attempts();
                warn!(operation, attempts, "host operation timed out");
                Err(BridgeError::Timeout {
                    operation: operation.to_string(),
                    attempts,
                })
            }
        }
    }
}
