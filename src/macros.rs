//! `format!`-style shorthands over [`Logger::log`](crate::Logger::log).
//!
//! Every macro expands to a single engine call, so level and category
//! filtering happen before anything is staged for the inspector.
//!
//! # Examples
//!
//! ```
//! use rust_log_inspector::prelude::*;
//! use rust_log_inspector::info;
//!
//! let logger = Logger::new();
//!
//! info!(logger, "inspector attached");
//!
//! let panel = "network";
//! let rows = 12;
//! info!(logger, "{} panel rendered {} rows", panel, rows);
//! ```

/// Format and log at an explicit level, optionally under a category.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_inspector::log;
/// log!(logger, LogLevel::Info, "bridge ready");
/// log!(logger, LogLevel::Error, "request failed with {}", 500);
/// log!(logger, LogLevel::Warn, category: "Db", "pool at {}%", 90);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, category: $category:expr, $($arg:tt)+) => {
        $logger.log_with(
            $level,
            format!($($arg)+),
            $crate::LogOptions::new().category($category),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Shorthand for `log!` at `Trace`.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// # logger.set_level(LogLevel::Trace);
/// use rust_log_inspector::trace;
/// trace!(logger, "flush tick");
/// trace!(logger, "staged {} entries", 3);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Shorthand for `log!` at `Debug`.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_inspector::debug;
/// debug!(logger, "cache warmed");
/// debug!(logger, "{} listeners attached", 2);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Shorthand for `log!` at `Info`.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_inspector::info;
/// info!(logger, "session opened");
/// info!(logger, "loaded {} routes", 14);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Shorthand for `log!` at `Warn`.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_inspector::warn;
/// warn!(logger, "slow frame");
/// warn!(logger, "reconnect {} of {}", 2, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Shorthand for `log!` at `Error`.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_inspector::error;
/// error!(logger, "websocket closed");
/// error!(logger, "{} {} returned {}", "GET", "/api/user", 502);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Shorthand for `log!` at `Fatal`.
///
/// # Examples
///
/// ```
/// # use rust_log_inspector::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_inspector::fatal;
/// fatal!(logger, "render loop crashed");
/// fatal!(logger, "store corrupted: {}", "missing root");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
