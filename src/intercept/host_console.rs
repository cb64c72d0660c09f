//! Model of the host's global logging sink
//!
//! A [`HostConsole`] owns one replaceable function per [`ConsoleMethod`].
//! Clones share the same slots, so code holding a clone always dispatches to
//! whatever is currently installed.

use crate::core::{HostValue, LogLevel};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A sink function as installed on the host console
pub type SinkFn = Arc<dyn Fn(&[HostValue]) + Send + Sync>;

/// The leveled entry points of the host console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleMethod {
    Log,
    Info,
    Warn,
    Error,
    Debug,
    Trace,
}

impl ConsoleMethod {
    pub const ALL: [ConsoleMethod; 6] = [
        ConsoleMethod::Log,
        ConsoleMethod::Info,
        ConsoleMethod::Warn,
        ConsoleMethod::Error,
        ConsoleMethod::Debug,
        ConsoleMethod::Trace,
    ];

    /// Level recorded for entries captured from this method
    pub fn level(&self) -> LogLevel {
        match self {
            ConsoleMethod::Log | ConsoleMethod::Info => LogLevel::Info,
            ConsoleMethod::Warn => LogLevel::Warn,
            ConsoleMethod::Error => LogLevel::Error,
            ConsoleMethod::Debug => LogLevel::Debug,
            ConsoleMethod::Trace => LogLevel::Trace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleMethod::Log => "log",
            ConsoleMethod::Info => "info",
            ConsoleMethod::Warn => "warn",
            ConsoleMethod::Error => "error",
            ConsoleMethod::Debug => "debug",
            ConsoleMethod::Trace => "trace",
        }
    }

    fn index(&self) -> usize {
        match self {
            ConsoleMethod::Log => 0,
            ConsoleMethod::Info => 1,
            ConsoleMethod::Warn => 2,
            ConsoleMethod::Error => 3,
            ConsoleMethod::Debug => 4,
            ConsoleMethod::Trace => 5,
        }
    }
}

impl fmt::Display for ConsoleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Join arguments the way a console prints them
pub fn render_args(args: &[HostValue]) -> String {
    args.iter()
        .map(HostValue::display_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared, replaceable set of sink functions
#[derive(Clone)]
pub struct HostConsole {
    slots: Arc<RwLock<[SinkFn; 6]>>,
}

impl HostConsole {
    /// Console whose every method calls `sink`
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(ConsoleMethod, &[HostValue]) + Send + Sync + 'static,
    {
        let sink = Arc::new(sink);
        let slots = ConsoleMethod::ALL.map(|method| {
            let sink = Arc::clone(&sink);
            Arc::new(move |args: &[HostValue]| sink(method, args)) as SinkFn
        });
        Self {
            slots: Arc::new(RwLock::new(slots)),
        }
    }

    /// Console printing to stdout, with warn and error going to stderr
    pub fn stdio() -> Self {
        Self::with_sink(|method, args| match method {
            ConsoleMethod::Warn | ConsoleMethod::Error => eprintln!("{}", render_args(args)),
            _ => println!("{}", render_args(args)),
        })
    }

    /// Console that discards everything
    pub fn silent() -> Self {
        Self::with_sink(|_, _| {})
    }

    /// Currently installed function for `method`
    pub fn get(&self, method: ConsoleMethod) -> SinkFn {
        Arc::clone(&self.slots.read()[method.index()])
    }

    /// Install `sink` for `method`, returning the function it replaced
    pub fn replace(&self, method: ConsoleMethod, sink: SinkFn) -> SinkFn {
        std::mem::replace(&mut self.slots.write()[method.index()], sink)
    }

    /// Dispatch a call; no lock is held while the sink runs
    pub fn call(&self, method: ConsoleMethod, args: &[HostValue]) {
        let sink = self.get(method);
        sink(args);
    }

    pub fn log(&self, args: &[HostValue]) {
        self.call(ConsoleMethod::Log, args);
    }

    pub fn info(&self, args: &[HostValue]) {
        self.call(ConsoleMethod::Info, args);
    }

    pub fn warn(&self, args: &[HostValue]) {
        self.call(ConsoleMethod::Warn, args);
    }

    pub fn error(&self, args: &[HostValue]) {
        self.call(ConsoleMethod::Error, args);
    }

    pub fn debug(&self, args: &[HostValue]) {
        self.call(ConsoleMethod::Debug, args);
    }

    pub fn trace(&self, args: &[HostValue]) {
        self.call(ConsoleMethod::Trace, args);
    }

    /// Whether two handles share the same slots
    pub fn same_console(&self, other: &HostConsole) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}

impl fmt::Debug for HostConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConsole").finish_non_exhaustive()
    }
}

/// Swaps wrapper functions into a console
pub struct SinkInstaller;

impl SinkInstaller {
    /// Replace every method with `wrap(method, original)`
    ///
    /// The originals are kept in the returned handle and put back, unchanged,
    /// by [`RestoreHandle::restore`].
    pub fn install<W>(console: &HostConsole, mut wrap: W) -> RestoreHandle
    where
        W: FnMut(ConsoleMethod, SinkFn) -> SinkFn,
    {
        let originals = ConsoleMethod::ALL
            .iter()
            .map(|&method| {
                let original = console.get(method);
                let wrapper = wrap(method, Arc::clone(&original));
                console.replace(method, wrapper);
                (method, original)
            })
            .collect();

        RestoreHandle {
            console: console.clone(),
            originals,
            restored: false,
        }
    }
}

/// Holds the functions replaced by [`SinkInstaller::install`]
///
/// Dropping the handle restores the originals as well.
pub struct RestoreHandle {
    console: HostConsole,
    originals: Vec<(ConsoleMethod, SinkFn)>,
    restored: bool,
}

impl RestoreHandle {
    /// Put the original functions back
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        for (method, original) in &self.originals {
            self.console.replace(*method, Arc::clone(original));
        }
        self.restored = true;
    }

    /// The function that was installed before interception
    pub fn original(&self, method: ConsoleMethod) -> Option<SinkFn> {
        self.originals
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, f)| Arc::clone(f))
    }

    pub fn console(&self) -> &HostConsole {
        &self.console
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }
}

impl Drop for RestoreHandle {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_console() -> (HostConsole, Arc<Mutex<Vec<(ConsoleMethod, String)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink_calls = Arc::clone(&calls);
        let console = HostConsole::with_sink(move |method, args| {
            sink_calls.lock().push((method, render_args(args)));
        });
        (console, calls)
    }

    #[test]
    fn test_dispatch_per_method() {
        let (console, calls) = recording_console();
        console.warn(&["disk".into(), HostValue::Number(90.0)]);
        console.log(&["hello".into()]);

        let calls = calls.lock();
        assert_eq!(calls[0], (ConsoleMethod::Warn, "disk 90".to_string()));
        assert_eq!(calls[1], (ConsoleMethod::Log, "hello".to_string()));
    }

    #[test]
    fn test_method_levels() {
        assert_eq!(ConsoleMethod::Log.level(), LogLevel::Info);
        assert_eq!(ConsoleMethod::Info.level(), LogLevel::Info);
        assert_eq!(ConsoleMethod::Warn.level(), LogLevel::Warn);
        assert_eq!(ConsoleMethod::Error.level(), LogLevel::Error);
        assert_eq!(ConsoleMethod::Debug.level(), LogLevel::Debug);
        assert_eq!(ConsoleMethod::Trace.level(), LogLevel::Trace);
    }

    #[test]
    fn test_install_and_restore_identity() {
        let (console, calls) = recording_console();
        let before: Vec<SinkFn> = ConsoleMethod::ALL.iter().map(|&m| console.get(m)).collect();

        let mut handle = SinkInstaller::install(&console, |_, original| {
            Arc::new(move |args: &[HostValue]| {
                let mut wrapped = vec![HostValue::from("[wrapped]")];
                wrapped.extend_from_slice(args);
                original(&wrapped);
            })
        });

        console.info(&["x".into()]);
        assert_eq!(calls.lock()[0].1, "[wrapped] x");
        assert!(!Arc::ptr_eq(&console.get(ConsoleMethod::Info), &before[1]));

        handle.restore();
        for (method, original) in ConsoleMethod::ALL.iter().zip(&before) {
            assert!(Arc::ptr_eq(&console.get(*method), original));
        }

        console.info(&["y".into()]);
        assert_eq!(calls.lock()[1].1, "y");
    }

    #[test]
    fn test_drop_restores() {
        let (console, _calls) = recording_console();
        let original = console.get(ConsoleMethod::Error);
        {
            let handle = SinkInstaller::install(&console, |_, _| Arc::new(|_: &[HostValue]| {}));
            assert!(Arc::ptr_eq(&handle.original(ConsoleMethod::Error).unwrap(), &original));
        }
        assert!(Arc::ptr_eq(&console.get(ConsoleMethod::Error), &original));
    }

    #[test]
    fn test_clones_share_slots() {
        let (console, calls) = recording_console();
        let other = console.clone();
        assert!(console.same_console(&other));

        console.replace(ConsoleMethod::Log, Arc::new(|_: &[HostValue]| {}));
        other.log(&["dropped".into()]);
        assert!(calls.lock().is_empty());
    }
}
