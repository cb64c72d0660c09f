//! Core capture engine types and traits

pub mod appender;
pub mod capture_buffer;
pub mod child_logger;
pub mod config;
pub mod error;
pub mod export;
pub mod field_resolver;
pub mod level_policy;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod payload;
pub mod scheduler;
pub mod structured_builder;
pub mod trace_context;

pub use appender::Appender;
pub use capture_buffer::{CaptureBuffer, DEFAULT_HISTORY_CAPACITY};
pub use child_logger::ChildLogger;
pub use config::{
    CategoryConfig, ConfigUpdate, InterceptConfig, InterceptUpdate, LoggerConfig, OutputConfig,
    OutputUpdate, StructuredConfig, StructuredUpdate, DEFAULT_BATCH_SIZE,
    DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_MAX_LOGS,
};
pub use error::{LoggerError, Result};
pub use export::{import_json, ExportFormat};
pub use field_resolver::FieldSources;
pub use level_policy::should_log;
pub use log_context::{ContextGuard, FieldValue, GlobalFields, LogFields};
pub use log_entry::{LogEntry, SourceLocation};
pub use log_level::LogLevel;
pub use logger::{LogOptions, Logger, LoggerBuilder};
pub use metrics::{Metrics, MetricsAggregator, METRICS_WINDOW};
pub use payload::{HostValue, LogPayload};
pub use scheduler::{ScheduledTask, Scheduler};
pub use structured_builder::StructuredLogBuilder;
pub use trace_context::{TraceContext, TraceScope};
