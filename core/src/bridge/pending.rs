//! Pending operation state shared between the bridge and the host task
//!
//! The host side holds two [`Completer`]s (success and error). The first one
//! to fire settles the operation; anything after that is ignored. The bridge
//! side waits on a condition variable with a bounded number of attempts.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Settlement state of an in-flight operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T> {
    Pending,
    Resolved(T),
    Rejected(String),
}

impl<T> Settlement<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Settlement::Pending)
    }
}

#[derive(Debug)]
struct State<T> {
    settlement: Settlement<T>,
    settled: bool,
    attempts: u32,
}

#[derive(Debug)]
struct Shared<T> {
    state: Mutex<State<T>>,
    signal: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, settlement: Settlement<T>) -> bool {
        let mut state = self.lock();
        if state.settled {
            return false;
        }
        state.settled = true;
        state.settlement = settlement;
        self.signal.notify_all();
        true
    }
}

/* ===================== Pending Operation ===================== */

/// One in-flight host call, owned by the waiting side
#[derive(Debug)]
pub struct PendingOperation<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Default for PendingOperation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingOperation<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    settlement: Settlement::Pending,
                    settled: false,
                    attempts: 0,
                }),
                signal: Condvar::new(),
            }),
        }
    }

    /// Success and error callbacks handed to the host task
    pub fn callbacks(&self) -> (Completer<T>, Completer<T>) {
        (
            Completer {
                shared: Arc::clone(&self.shared),
            },
            Completer {
                shared: Arc::clone(&self.shared),
            },
        )
    }

    /// Number of poll attempts made so far
    pub fn attempts(&self) -> u32 {
        self.shared.lock().attempts
    }

    /// Wait for settlement, at most `max_attempts` waits of `interval` each
    ///
    /// Returns the settlement (taking it out of the operation), or
    /// `Settlement::Pending` if the budget ran out first.
    pub fn wait(&self, max_attempts: u32, interval: Duration) -> Settlement<T> {
        let mut state = self.shared.lock();

        while state.settlement.is_pending() && state.attempts < max_attempts {
            state.attempts += 1;
            let (guard, _timeout) = self
                .shared
                .signal
                .wait_timeout(state, interval)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }

        // Closed from here on: a late settlement must not be observed
        state.settled = true;
        std::mem::replace(&mut state.settlement, Settlement::Pending)
    }
}

/* ===================== Completer ===================== */

/// Host-side handle that settles a pending operation
#[derive(Debug)]
pub struct Completer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Completer<T> {
    /// Settle with a value; returns false if already settled
    pub fn resolve(self, value: T) -> bool {
        self.shared.settle(Settlement::Resolved(value))
    }

    /// Settle with an error message; returns false if already settled
    pub fn reject(self, message: impl Into<String>) -> bool {
        self.shared.settle(Settlement::Rejected(message.into()))
    }
}
