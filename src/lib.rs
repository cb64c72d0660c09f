//! # Rust Log Inspector
//!
//! Structured log capture engine behind a developer-tools logging inspector.
//!
//! ## Features
//!
//! - **Level Policy**: global threshold plus per-category overrides
//! - **Structured Fields**: global, runtime and call-site fields merged per entry
//! - **Console Interception**: captures host console calls, guarded by a circuit breaker
//! - **Buffering**: bounded staging buffer flushed in batches to a transport
//! - **Live Metrics**: totals, per-level counts and rolling rates
//! - **Export**: JSON, CSV and plain text
//!
//! ## Example
//!
//! ```
//! use rust_log_inspector::prelude::*;
//!
//! let logger = Logger::builder()
//!     .level(LogLevel::Debug)
//!     .console_output(false)
//!     .build()
//!     .unwrap();
//!
//! let api = logger.child("Api").with_field("route", "/orders");
//! api.info("request accepted");
//!
//! let json = logger.export(ExportFormat::Json).unwrap();
//! assert!(json.contains("request accepted"));
//! ```

pub mod appenders;
pub mod core;
pub mod intercept;
pub mod macros;
pub mod transport;

pub mod prelude {
    pub use crate::appenders::ConsoleAppender;
    pub use crate::core::{
        Appender, CategoryConfig, ChildLogger, ConfigUpdate, ContextGuard, ExportFormat,
        FieldValue, HostValue, LogEntry, LogFields, LogLevel, LogOptions, LogPayload, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, Metrics, Result, StructuredLogBuilder,
    };
    pub use crate::intercept::{ConsoleMethod, HostConsole};
    pub use crate::transport::{ChannelBus, Message, Transport};
}

pub use appenders::ConsoleAppender;
pub use core::{
    Appender, CategoryConfig, ChildLogger, ConfigUpdate, ContextGuard, ExportFormat, FieldValue,
    HostValue, LogEntry, LogFields, LogLevel, LogOptions, LogPayload, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, Metrics, Result, StructuredLogBuilder,
};
pub use intercept::{ConsoleMethod, HostConsole};
pub use transport::{ChannelBus, Message, Transport};
