//! Host logging sink interception
//!
//! The engine can wrap every method of a [`HostConsole`] so that calls made
//! outside its own API are captured as entries too. [`Interceptor`] holds the
//! state that keeps this safe:
//!
//! - a re-entrancy flag, so a wrapped call that ends up calling the sink
//!   again goes straight to the original function
//! - a [`CircuitBreaker`] that turns interception off during call storms
//! - the [`RestoreHandle`] used to put the original functions back
//!
//! The re-entrancy flag is shared by all threads. While one thread is inside
//! a wrapped call, calls from other threads pass through uncaptured.

pub mod capture;
pub mod circuit_breaker;
pub mod host_console;
pub mod source;

pub use capture::{entry_from_call, INTERCEPT_CATEGORY, INTERCEPT_TAG};
pub use circuit_breaker::{
    BreakerDecision, CircuitBreaker, DEFAULT_DECAY_INTERVAL, DEFAULT_DECAY_THRESHOLD,
    DEFAULT_TRIP_THRESHOLD,
};
pub use host_console::{render_args, ConsoleMethod, HostConsole, RestoreHandle, SinkFn, SinkInstaller};
pub use source::{capture_source, parse_source};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Interception state owned by the engine
pub struct Interceptor {
    in_call: AtomicBool,
    breaker: Mutex<CircuitBreaker>,
    installed: Mutex<Option<RestoreHandle>>,
    /// Console used by the last install, kept for config-driven re-enabling
    console: Mutex<Option<HostConsole>>,
}

impl Interceptor {
    pub fn new() -> Self {
        Self::with_breaker(CircuitBreaker::new())
    }

    pub fn with_breaker(breaker: CircuitBreaker) -> Self {
        Self {
            in_call: AtomicBool::new(false),
            breaker: Mutex::new(breaker),
            installed: Mutex::new(None),
            console: Mutex::new(None),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.lock().is_some()
    }

    /// Install wrappers unless already installed; returns whether it did
    pub fn install<W>(&self, console: &HostConsole, wrap: W) -> bool
    where
        W: FnMut(ConsoleMethod, SinkFn) -> SinkFn,
    {
        let mut installed = self.installed.lock();
        if installed.is_some() {
            return false;
        }

        self.breaker.lock().reset();
        *installed = Some(SinkInstaller::install(console, wrap));
        *self.console.lock() = Some(console.clone());
        true
    }

    /// Restore the original functions; returns whether anything was installed
    pub fn uninstall(&self) -> bool {
        let handle = self.installed.lock().take();
        match handle {
            Some(mut handle) => {
                handle.restore();
                true
            }
            None => false,
        }
    }

    /// Console from the most recent install
    pub fn last_console(&self) -> Option<HostConsole> {
        self.console.lock().clone()
    }

    /// Original function for `method` while installed
    pub fn original(&self, method: ConsoleMethod) -> Option<SinkFn> {
        self.installed
            .lock()
            .as_ref()
            .and_then(|handle| handle.original(method))
    }

    /// Mark the start of a wrapped call; `None` if one is already running
    pub fn enter(&self) -> Option<ReentrancyGuard<'_>> {
        self.in_call
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReentrancyGuard {
                flag: &self.in_call,
            })
    }

    pub fn in_call(&self) -> bool {
        self.in_call.load(Ordering::Acquire)
    }

    /// Feed one call into the circuit breaker
    pub fn record_call(&self, now: Instant) -> BreakerDecision {
        self.breaker.lock().record(now)
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the re-entrancy flag when dropped, including during unwinding
pub struct ReentrancyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
