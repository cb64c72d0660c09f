//! Background flush and metrics timers
//!
//! One worker thread waits on two `crossbeam_channel::tick` timers and a
//! shutdown channel. The worker only holds a [`Weak`] reference to its
//! target, so it never keeps the engine alive on its own.

use super::error::{panic_message, LoggerError, Result};
use crossbeam_channel::{bounded, select, tick, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Weak;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

/// Work performed on each timer
pub trait ScheduledTask: Send + Sync + 'static {
    fn on_flush(&self);
    fn on_metrics_tick(&self);
}

pub struct Scheduler {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    worker: ThreadId,
    flush_interval: Duration,
}

impl Scheduler {
    /// Spawn the worker thread
    pub fn spawn<T: ScheduledTask>(
        target: Weak<T>,
        flush_interval: Duration,
        metrics_interval: Duration,
    ) -> Result<Self> {
        if flush_interval.is_zero() || metrics_interval.is_zero() {
            return Err(LoggerError::scheduler("timer intervals must be non-zero"));
        }

        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("log-inspector-scheduler".to_string())
            .spawn(move || {
                let flush_ticker = tick(flush_interval);
                let metrics_ticker = tick(metrics_interval);

                loop {
                    select! {
                        recv(flush_ticker) -> _ => {
                            if !run_task(&target, "flush", |t| t.on_flush()) {
                                break;
                            }
                        }
                        recv(metrics_ticker) -> _ => {
                            if !run_task(&target, "metrics", |t| t.on_metrics_tick()) {
                                break;
                            }
                        }
                        recv(shutdown_rx) -> _ => break,
                    }
                }
            })
            .map_err(|e| LoggerError::scheduler(format!("failed to spawn worker: {}", e)))?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            worker: handle.thread().id(),
            handle: Some(handle),
            flush_interval,
        })
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the worker and wait for it to exit
    ///
    /// Returns `false` if the worker panicked. Called from the worker thread
    /// itself, the thread is detached instead of joined.
    pub fn stop(&mut self) -> bool {
        drop(self.shutdown.take());

        let Some(handle) = self.handle.take() else {
            return true;
        };

        if thread::current().id() == self.worker {
            return true;
        }

        match handle.join() {
            Ok(()) => true,
            Err(e) => {
                eprintln!("[LOGGER ERROR] Scheduler thread panicked during shutdown: {:?}", e);
                false
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one task; `false` once the target is gone
fn run_task<T, F>(target: &Weak<T>, name: &str, task: F) -> bool
where
    F: FnOnce(&T),
{
    let Some(target) = target.upgrade() else {
        return false;
    };

    if let Err(panic_info) = catch_unwind(AssertUnwindSafe(|| task(&target))) {
        eprintln!(
            "[LOGGER ERROR] Scheduled {} task panicked: {}. The scheduler keeps running.",
            name,
            panic_message(&*panic_info)
        );
    }

    true
}
