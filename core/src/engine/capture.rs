//! Scoped output capture
//!
//! Guest output is collected into a buffer owned by the current execution.
//! Only one execution in the process may hold the capture at a time; the
//! guard releases it on every exit path, including unwinding.

use std::sync::{Mutex, MutexGuard, PoisonError};

static REDIRECTION: Mutex<()> = Mutex::new(());

/// Exclusive capture for the duration of one execution
pub struct OutputCapture {
    _guard: MutexGuard<'static, ()>,
    buffer: String,
}

impl OutputCapture {
    /// Block until no other execution holds the capture, then start with an empty buffer
    pub fn acquire() -> Self {
        // A panic while capturing leaves nothing to repair; the buffer dies with its guard
        let guard = REDIRECTION.lock().unwrap_or_else(PoisonError::into_inner);
        Self {
            _guard: guard,
            buffer: String::new(),
        }
    }

    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.buffer
    }

    /// Release the capture and return what was written
    pub fn finish(self) -> String {
        self.buffer
    }
}
